//! End-to-end properties of the image layer.

use hiseg_core::algo::tree_fns::test_tree_isomorphism;
use hiseg_core::hierarchy::core::{bpt_canonical, saliency_map};
use hiseg_core::image::graph_image::{
    get_4_adjacency_graph, graph_4_adjacency_2_khalimsky, khalimsky_2_graph_4_adjacency,
};
use hiseg_core::image::tree_of_shapes::{tree_of_shapes_2d, TosPadding};

fn pseudo_random_image(h: usize, w: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..h * w)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64
        })
        .collect()
}

#[test]
fn tree_of_shapes_is_self_dual() {
    for seed in [1, 42, 1234] {
        let (h, w) = (9, 12);
        let image = pseudo_random_image(h, w, seed);
        let negated: Vec<f64> = image.iter().map(|&v| -v).collect();
        let t1 =
            tree_of_shapes_2d(&image, (h, w), TosPadding::Mean, false, 0).unwrap();
        let t2 =
            tree_of_shapes_2d(&negated, (h, w), TosPadding::Mean, false, 0).unwrap();
        assert!(
            test_tree_isomorphism(&t1.tree, &t2.tree),
            "self-duality violated for seed {}",
            seed
        );
    }
}

#[test]
fn tree_of_shapes_original_space_keeps_pixel_altitudes() {
    let (h, w) = (7, 5);
    let image = pseudo_random_image(h, w, 99);
    let res = tree_of_shapes_2d(&image, (h, w), TosPadding::Zero, true, 0).unwrap();
    assert_eq!(res.tree.num_leaves(), h * w);
    assert_eq!(&res.altitudes[..h * w], &image[..]);
}

#[test]
fn saliency_map_round_trips_through_khalimsky() {
    let (h, w) = (5, 6);
    let g = get_4_adjacency_graph((h, w));
    let weights: Vec<f64> = (0..g.num_edges()).map(|i| (i % 7) as f64).collect();
    let bpt = bpt_canonical(&g, &weights).unwrap();
    let sm = saliency_map(&g, &bpt.tree, &bpt.altitudes).unwrap();

    let grid = graph_4_adjacency_2_khalimsky(&g, (h, w), &sm, false).unwrap();
    let (_, shape, recovered) = khalimsky_2_graph_4_adjacency(&grid, false).unwrap();
    assert_eq!(shape, (h, w));
    assert_eq!(recovered, sm);
}
