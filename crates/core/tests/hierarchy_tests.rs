//! Invariants of the hierarchy constructors on randomized inputs.

use hiseg_core::algo::tree_fns::test_tree_isomorphism;
use hiseg_core::hierarchy::core::{bpt_canonical, quasi_flat_zones_hierarchy, saliency_map};
use hiseg_core::hierarchy::watershed::watershed_hierarchy_by_area_unit;
use hiseg_core::image::graph_image::get_4_adjacency_graph;

/// Deterministic pseudo-random integer weights.
fn pseudo_random_weights(n: usize, modulus: u64, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % modulus) as f64
        })
        .collect()
}

#[test]
fn bpt_altitudes_are_monotone() {
    let g = get_4_adjacency_graph((8, 9));
    let weights = pseudo_random_weights(g.num_edges(), 16, 7);
    let res = bpt_canonical(&g, &weights).unwrap();
    for i in 0..res.tree.num_nodes() - 1 {
        assert!(res.altitudes[i] <= res.altitudes[res.tree.parent(i)]);
    }
}

#[test]
fn bpt_size_on_connected_graph() {
    let g = get_4_adjacency_graph((8, 9));
    let n = g.num_vertices();
    let weights = pseudo_random_weights(g.num_edges(), 16, 11);
    let res = bpt_canonical(&g, &weights).unwrap();
    assert_eq!(res.tree.num_nodes(), 2 * n - 1);
    assert_eq!(res.tree.num_leaves(), n);
    assert_eq!(res.mst.num_edges(), n - 1);
    assert_eq!(res.mst_edge_map.len(), n - 1);
}

#[test]
fn bpt_mst_round_trip() {
    let g = get_4_adjacency_graph((6, 7));
    let weights = pseudo_random_weights(g.num_edges(), 12, 23);
    let res = bpt_canonical(&g, &weights).unwrap();

    // re-running the construction on the MST with the internal-node
    // altitudes as edge weights rebuilds an isomorphic tree
    let num_leaves = res.tree.num_leaves();
    let mst_weights: Vec<f64> = res.altitudes[num_leaves..].to_vec();
    let res2 = bpt_canonical(&res.mst, &mst_weights).unwrap();
    assert!(test_tree_isomorphism(&res.tree, &res2.tree));
    assert_eq!(res.altitudes, res2.altitudes);
}

#[test]
fn bpt_and_qfz_saliency_maps_agree() {
    let g = get_4_adjacency_graph((9, 9));
    let weights = pseudo_random_weights(g.num_edges(), 8, 5);

    let bpt = bpt_canonical(&g, &weights).unwrap();
    let qfz = quasi_flat_zones_hierarchy(&g, &weights).unwrap();

    let sm_bpt = saliency_map(&g, &bpt.tree, &bpt.altitudes).unwrap();
    let sm_qfz = saliency_map(&g, &qfz.tree, &qfz.altitudes).unwrap();
    assert_eq!(sm_bpt, sm_qfz);
}

#[test]
fn qfz_altitudes_strictly_increase() {
    let g = get_4_adjacency_graph((7, 7));
    let weights = pseudo_random_weights(g.num_edges(), 6, 31);
    let qfz = quasi_flat_zones_hierarchy(&g, &weights).unwrap();
    for i in qfz.tree.leaves_to_root(false, false) {
        assert!(qfz.altitudes[i] < qfz.altitudes[qfz.tree.parent(i)]);
    }
}

#[test]
fn watershed_by_area_is_a_partition_hierarchy() {
    let g = get_4_adjacency_graph((7, 8));
    let weights = pseudo_random_weights(g.num_edges(), 5, 13);
    let res = watershed_hierarchy_by_area_unit(&g, &weights).unwrap();
    assert_eq!(res.tree.num_leaves(), g.num_vertices());
    for i in 0..res.tree.num_nodes() - 1 {
        assert!(res.altitudes[i] <= res.altitudes[res.tree.parent(i)]);
    }
}
