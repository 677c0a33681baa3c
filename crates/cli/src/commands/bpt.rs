//! `hiseg bpt` — canonical binary partition tree of a graph file.

use crate::args::BptArgs;
use crate::docs::{write_json, GraphDoc, HierarchyDoc};
use hiseg_core::bpt_canonical;
use hiseg_core::Result;
use serde::Serialize;

#[derive(Serialize)]
struct BptDoc {
    #[serde(flatten)]
    hierarchy: HierarchyDoc,
    mst_edge_map: Vec<usize>,
}

pub fn run(args: BptArgs, quiet: bool) -> Result<()> {
    let doc = GraphDoc::load(&args.input)?;
    let (graph, weights) = doc.build()?;
    let res = bpt_canonical(&graph, &weights)?;

    if !quiet {
        eprintln!(
            "bpt: {} leaves, {} nodes, root altitude {}",
            res.tree.num_leaves(),
            res.tree.num_nodes(),
            res.altitudes[res.tree.root()]
        );
    }
    let out = BptDoc {
        hierarchy: HierarchyDoc::from_hierarchy(&res.tree, &res.altitudes),
        mst_edge_map: res.mst_edge_map,
    };
    write_json(&out, args.output.as_deref())
}
