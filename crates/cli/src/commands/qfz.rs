//! `hiseg qfz` — quasi-flat-zones hierarchy of a graph file.

use crate::args::QfzArgs;
use crate::docs::{write_json, GraphDoc, HierarchyDoc};
use hiseg_core::quasi_flat_zones_hierarchy;
use hiseg_core::Result;

pub fn run(args: QfzArgs, quiet: bool) -> Result<()> {
    let doc = GraphDoc::load(&args.input)?;
    let (graph, weights) = doc.build()?;
    let res = quasi_flat_zones_hierarchy(&graph, &weights)?;

    if !quiet {
        eprintln!(
            "qfz: {} leaves, {} nodes",
            res.tree.num_leaves(),
            res.tree.num_nodes()
        );
    }
    let out = HierarchyDoc::from_hierarchy(&res.tree, &res.altitudes);
    write_json(&out, args.output.as_deref())
}
