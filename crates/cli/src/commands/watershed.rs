//! `hiseg watershed` — watershed hierarchy of a graph file.

use crate::args::{WatershedArgs, WatershedAttribute};
use crate::docs::{write_json, GraphDoc, HierarchyDoc};
use hiseg_core::hierarchy::watershed::{
    watershed_hierarchy_by_area_unit, watershed_hierarchy_by_dynamics,
    watershed_hierarchy_by_volume,
};
use hiseg_core::Result;
use indicatif::ProgressBar;
use std::time::Duration;

pub fn run(args: WatershedArgs, quiet: bool) -> Result<()> {
    let doc = GraphDoc::load(&args.input)?;
    let (graph, weights) = doc.build()?;

    let spinner = if quiet {
        None
    } else {
        let s = ProgressBar::new_spinner().with_message("building watershed hierarchy");
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    };
    let res = match args.by {
        WatershedAttribute::Area => watershed_hierarchy_by_area_unit(&graph, &weights),
        WatershedAttribute::Volume => {
            let areas = vec![1.0; graph.num_vertices()];
            watershed_hierarchy_by_volume(&graph, &weights, &areas)
        }
        WatershedAttribute::Dynamics => watershed_hierarchy_by_dynamics(&graph, &weights),
    }?;
    if let Some(s) = spinner {
        s.finish_and_clear();
        eprintln!(
            "watershed: {} nodes, root altitude {}",
            res.tree.num_nodes(),
            res.altitudes[res.tree.root()]
        );
    }

    let out = HierarchyDoc::from_hierarchy(&res.tree, &res.altitudes);
    write_json(&out, args.output.as_deref())
}
