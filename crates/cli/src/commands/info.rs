//! `hiseg info` — print structural information about a graph file.

use crate::args::InfoArgs;
use crate::docs::GraphDoc;
use hiseg_core::algo::graph_core::num_connected_components;
use hiseg_core::Result;

pub fn run(args: InfoArgs) -> Result<()> {
    let doc = GraphDoc::load(&args.input)?;
    let (graph, weights) = doc.build()?;

    let degrees: Vec<usize> = (0..graph.num_vertices()).map(|v| graph.degree(v)).collect();
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let mean_degree = if graph.num_vertices() > 0 {
        degrees.iter().sum::<usize>() as f64 / graph.num_vertices() as f64
    } else {
        0.0
    };
    let (min_w, max_w) = weights.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &w| {
        (lo.min(w), hi.max(w))
    });

    println!("vertices:   {}", graph.num_vertices());
    println!("edges:      {}", graph.num_live_edges());
    println!("components: {}", num_connected_components(&graph));
    println!("degree:     max {} / mean {:.2}", max_degree, mean_degree);
    if !weights.is_empty() {
        println!("weights:    [{}, {}]", min_w, max_w);
    }
    if let Some((h, w)) = doc.shape {
        println!("grid shape: {}x{}", h, w);
    }
    Ok(())
}
