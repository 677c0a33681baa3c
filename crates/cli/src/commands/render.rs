//! `hiseg render` — saliency map of the canonical BPT as a PNG contour
//! image.

use crate::args::RenderArgs;
use crate::docs::GraphDoc;
use hiseg_core::export::image::save_khalimsky_png;
use hiseg_core::image::graph_image::graph_4_adjacency_2_khalimsky;
use hiseg_core::{bpt_canonical, saliency_map, HisegError, Result};

pub fn run(args: RenderArgs, quiet: bool) -> Result<()> {
    let doc = GraphDoc::load(&args.input)?;
    let shape = doc.shape.ok_or_else(|| {
        HisegError::PreconditionFailed(
            "rendering requires a grid graph with a `shape` field".into(),
        )
    })?;
    let (graph, weights) = doc.build()?;

    let bpt = bpt_canonical(&graph, &weights)?;
    let sm = saliency_map(&graph, &bpt.tree, &bpt.altitudes)?;
    let grid = graph_4_adjacency_2_khalimsky(&graph, shape, &sm, args.extra_border)?;
    save_khalimsky_png(&grid, &args.output)?;

    if !quiet {
        eprintln!(
            "rendered {}x{} contour image to {}",
            grid.height,
            grid.width,
            args.output.display()
        );
    }
    Ok(())
}
