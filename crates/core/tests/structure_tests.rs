//! Cross-variant invariants of the structural layer.

use hiseg_core::structure::lca::{LcaSparseTable, LcaSparseTableBlock};
use hiseg_core::structure::tree::Tree;

#[test]
fn lca_reference_pairs() {
    let tree = Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap();
    let oracle = LcaSparseTable::new(&tree);
    for (u, v, expected) in [(0, 1, 5), (2, 4, 6), (0, 2, 7), (3, 3, 3)] {
        assert_eq!(oracle.lca(u, v).unwrap(), expected);
        assert_eq!(oracle.lca(v, u).unwrap(), expected);
    }
}

#[test]
fn lca_variants_agree_with_naive() {
    // a skewed tree exercising deep ancestor chains:
    // 10 leaves chained pairwise
    let parents = vec![10, 10, 11, 12, 13, 14, 15, 16, 17, 18, 11, 12, 13, 14, 15, 16, 17, 18, 18];
    let tree = Tree::new(parents).unwrap();
    let full = LcaSparseTable::new(&tree);
    let blocks = [1, 2, 3, 7, 64];
    let block_oracles: Vec<LcaSparseTableBlock> = blocks
        .iter()
        .map(|&b| LcaSparseTableBlock::with_block_size(&tree, b))
        .collect();

    for u in 0..tree.num_nodes() {
        for v in 0..tree.num_nodes() {
            let expected = tree.lowest_common_ancestor(u, v);
            assert_eq!(full.lca(u, v).unwrap(), expected, "full {} {}", u, v);
            assert_eq!(full.lca(v, u).unwrap(), expected);
            for (b, oracle) in blocks.iter().zip(&block_oracles) {
                assert_eq!(
                    oracle.lca(u, v).unwrap(),
                    expected,
                    "block size {} for ({}, {})",
                    b,
                    u,
                    v
                );
            }
        }
    }
}

#[test]
fn lca_state_survives_serialization() {
    let tree = Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap();
    let oracle = LcaSparseTableBlock::with_block_size(&tree, 4);
    let json = serde_json::to_string(&oracle.state()).unwrap();
    let state = serde_json::from_str(&json).unwrap();
    let rebuilt = LcaSparseTableBlock::from_state(state).unwrap();
    for u in 0..tree.num_nodes() {
        for v in 0..tree.num_nodes() {
            assert_eq!(
                rebuilt.lca(u, v).unwrap(),
                tree.lowest_common_ancestor(u, v)
            );
        }
    }
}
