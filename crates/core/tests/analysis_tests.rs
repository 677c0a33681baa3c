//! Invariants of the analysis operators: cuts, energies, accumulators.

use hiseg_core::accumulator::tree::accumulate_sequential;
use hiseg_core::algo::energy::labelisation_optimal_cut_from_energy;
use hiseg_core::algo::horizontal_cuts::HorizontalCutExplorer;
use hiseg_core::algo::tree_fns::labelisation_horizontal_cut_from_threshold;
use hiseg_core::hierarchy::core::bpt_canonical;
use hiseg_core::image::graph_image::get_4_adjacency_graph;
use hiseg_core::{Accumulator, DataArray, Tree};

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
fn horizontal_cuts_match_threshold_labelisation() {
    let g = get_4_adjacency_graph((6, 6));
    let weights = pseudo_random_weights(g.num_edges(), 7, 3);
    let bpt = bpt_canonical(&g, &weights).unwrap();

    let explorer = HorizontalCutExplorer::new(&bpt.tree, &bpt.altitudes).unwrap();
    for i in 0..explorer.num_cuts() {
        let cut = explorer.cut_from_index(i).unwrap();
        let labels = cut.labelisation_leaves(&bpt.tree).unwrap();
        let reference = labelisation_horizontal_cut_from_threshold(
            &bpt.tree,
            &bpt.altitudes,
            cut.altitude,
        )
        .unwrap();
        assert_eq!(labels, reference, "cut {}", i);
        assert_eq!(cut.nodes.len(), explorer.num_regions_cuts()[i]);
    }
}

#[test]
fn horizontal_cut_nodes_partition_the_leaves() {
    let g = get_4_adjacency_graph((5, 7));
    let weights = pseudo_random_weights(g.num_edges(), 9, 17);
    let bpt = bpt_canonical(&g, &weights).unwrap();
    bpt.tree.compute_children();

    let explorer = HorizontalCutExplorer::new(&bpt.tree, &bpt.altitudes).unwrap();
    let leaf_count = accumulate_sequential(
        &bpt.tree,
        &DataArray::from_scalars(vec![1.0; bpt.tree.num_leaves()]),
        Accumulator::Sum,
    )
    .unwrap();
    for i in 0..explorer.num_cuts() {
        let cut = explorer.cut_from_index(i).unwrap();
        let total: f64 = cut.nodes.iter().map(|&n| leaf_count.scalars()[n]).sum();
        assert_eq!(total as usize, bpt.tree.num_leaves(), "cut {}", i);
    }
}

/// Enumerate every cut of a small tree and check the DP optimum against
/// exhaustive search.
#[test]
fn optimal_cut_beats_every_other_cut() {
    let tree = Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap();
    tree.compute_children();
    let energy = [3.0, 1.0, 4.0, 1.0, 5.0, 3.5, 11.0, 13.0];

    let labels =
        labelisation_optimal_cut_from_energy(&tree, &energy, Accumulator::Sum).unwrap();

    // energy of the cut selected by the DP
    let mut selected_nodes: Vec<usize> = Vec::new();
    for label in 0..=*labels.iter().max().unwrap() {
        let members: Vec<usize> = (0..5).filter(|&l| labels[l] == label).collect();
        let node = (0..tree.num_nodes())
            .find(|&n| leaves_under(&tree, n) == members)
            .expect("every region is a tree node");
        selected_nodes.push(node);
    }
    let optimal: f64 = selected_nodes.iter().map(|&n| energy[n]).sum();

    for cut in enumerate_cuts(&tree) {
        let cost: f64 = cut.iter().map(|&n| energy[n]).sum();
        assert!(
            optimal <= cost,
            "cut {:?} with cost {} beats the DP optimum {}",
            cut,
            cost,
            optimal
        );
    }
}

fn leaves_under(tree: &Tree, node: usize) -> Vec<usize> {
    let mut result = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if tree.is_leaf(n) {
            result.push(n);
        } else {
            stack.extend(tree.children(n).unwrap().iter().copied());
        }
    }
    result.sort_unstable();
    result
}

/// All cuts of the tree, as node sets.
fn enumerate_cuts(tree: &Tree) -> Vec<Vec<usize>> {
    fn expand(tree: &Tree, node: usize) -> Vec<Vec<usize>> {
        let mut cuts = vec![vec![node]];
        if !tree.is_leaf(node) {
            let children = tree.children(node).unwrap();
            // cartesian product of the children's cuts
            let mut product: Vec<Vec<usize>> = vec![Vec::new()];
            for &c in children {
                let child_cuts = expand(tree, c);
                let mut next = Vec::new();
                for partial in &product {
                    for cc in &child_cuts {
                        let mut merged = partial.clone();
                        merged.extend(cc.iter().copied());
                        next.push(merged);
                    }
                }
                product = next;
            }
            cuts.extend(product);
        }
        cuts
    }
    expand(tree, tree.root())
}
