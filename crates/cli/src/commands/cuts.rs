//! `hiseg cuts` — horizontal cut labelling of a hierarchy file.

use crate::args::CutsArgs;
use crate::docs::{write_json, HierarchyDoc};
use hiseg_core::algo::horizontal_cuts::HorizontalCutExplorer;
use hiseg_core::{HisegError, Result};
use serde::Serialize;

#[derive(Serialize)]
struct CutDoc {
    altitude: f64,
    num_regions: usize,
    nodes: Vec<usize>,
    leaf_labels: Vec<usize>,
}

pub fn run(args: CutsArgs) -> Result<()> {
    let doc = HierarchyDoc::load(&args.input)?;
    let (tree, altitudes) = doc.build()?;
    let explorer = HorizontalCutExplorer::new(&tree, &altitudes)?;

    let cut = match (args.threshold, args.regions) {
        (Some(threshold), None) => explorer.cut_from_altitude(threshold)?,
        (None, Some(regions)) => explorer.cut_from_num_regions(regions, !args.at_most)?,
        _ => {
            return Err(HisegError::PreconditionFailed(
                "pass exactly one of --threshold and --regions".into(),
            ))
        }
    };

    let out = CutDoc {
        altitude: cut.altitude,
        num_regions: cut.nodes.len(),
        leaf_labels: cut.labelisation_leaves(&tree)?,
        nodes: cut.nodes,
    };
    write_json(&out, args.output.as_deref())
}
