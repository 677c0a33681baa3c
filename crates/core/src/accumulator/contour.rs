//! Accumulation along the tree contour of each graph edge.

use super::{Accumulator, AccumulatorKernel};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::graph::UndirectedGraph;
use crate::structure::tree::Tree;

/// For each edge `{u, v}` of `graph`, walk from `u` and `v` towards
/// their lowest common ancestor in `tree` (always advancing the deeper
/// endpoint, both on equal depth) and reduce `values` over every node
/// visited on the way. The result is indexed by edge.
///
/// `depth` must hold the depth of every tree node (see
/// [`crate::algo::tree_fns::attribute_depth`]).
pub fn accumulate_on_contours(
    graph: &UndirectedGraph,
    tree: &Tree,
    values: &DataArray,
    depth: &[usize],
    acc: Accumulator,
) -> Result<DataArray> {
    if values.num_items() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "values do not match the number of tree nodes".into(),
        ));
    }
    if depth.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "depth does not match the number of tree nodes".into(),
        ));
    }
    let width = values.item_size();
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(graph.num_edges(), acc.output_item_size(width));

    for (ei, u, v) in graph.edge_iter() {
        kernel.reset();
        let (mut n1, mut n2) = (u, v);
        while n1 != n2 {
            let (d1, d2) = (depth[n1], depth[n2]);
            let (mut next1, mut next2) = (n1, n2);
            if d1 >= d2 {
                kernel.accumulate(values.row(n1));
                next1 = tree.parent(n1);
            }
            if d2 >= d1 {
                kernel.accumulate(values.row(n2));
                next2 = tree.parent(n2);
            }
            n1 = next1;
            n2 = next2;
        }
        out.set_row(ei, kernel.finalize());
    }
    Ok(out)
}
