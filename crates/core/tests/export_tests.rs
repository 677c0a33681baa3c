//! PNG export round-trip (requires the `png_export` feature).

use hiseg_core::export::image::save_khalimsky_png;
use hiseg_core::hierarchy::core::{bpt_canonical, saliency_map};
use hiseg_core::image::graph_image::{get_4_adjacency_graph, graph_4_adjacency_2_khalimsky};

#[test]
fn saliency_png_is_written() {
    let g = get_4_adjacency_graph((4, 4));
    let weights: Vec<f64> = (0..g.num_edges()).map(|i| (i % 5) as f64).collect();
    let bpt = bpt_canonical(&g, &weights).unwrap();
    let sm = saliency_map(&g, &bpt.tree, &bpt.altitudes).unwrap();
    let grid = graph_4_adjacency_2_khalimsky(&g, (4, 4), &sm, false).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saliency.png");
    save_khalimsky_png(&grid, &path).unwrap();

    let img = image::open(&path).unwrap().to_luma8();
    assert_eq!(img.width(), grid.width as u32);
    assert_eq!(img.height(), grid.height as u32);
}
