//! Reductions and propagations over the nodes of a tree.
//!
//! Sequential variants visit internal nodes in increasing id order,
//! which is topological for the trees of this crate; parallel variants
//! are pure per-node reductions and may be evaluated in any order.

use super::{Accumulator, AccumulatorKernel};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::tree::Tree;

/// Combination operator of [`accumulate_and_combine_sequential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    Add,
    Mul,
    Max,
    Min,
}

impl CombineOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            CombineOp::Add => a + b,
            CombineOp::Mul => a * b,
            CombineOp::Max => a.max(b),
            CombineOp::Min => a.min(b),
        }
    }
}

fn check_node_data(tree: &Tree, data: &DataArray) -> Result<()> {
    if data.num_items() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(format!(
            "node data has {} items for a tree with {} nodes",
            data.num_items(),
            tree.num_nodes()
        )));
    }
    Ok(())
}

/// `out[i] = acc(values[children(i)])` for every internal node; leaves
/// are left at the accumulator's identity.
pub fn accumulate_parallel(
    tree: &Tree,
    values: &DataArray,
    acc: Accumulator,
) -> Result<DataArray> {
    check_node_data(tree, values)?;
    tree.compute_children();
    let width = values.item_size();
    let out_width = acc.output_item_size(width);
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(tree.num_nodes(), out_width);

    for i in tree.leaves_to_root(true, true) {
        kernel.reset();
        for &c in tree.children(i)? {
            kernel.accumulate(values.row(c));
        }
        out.set_row(i, kernel.finalize());
    }
    Ok(out)
}

/// Leaves-to-root accumulation seeded by per-leaf data.
///
/// `out[leaf] = leaf_data[leaf]`; for each internal node `i` in
/// increasing order, `out[i] = acc(out[children(i)])`.
pub fn accumulate_sequential(
    tree: &Tree,
    leaf_data: &DataArray,
    acc: Accumulator,
) -> Result<DataArray> {
    if leaf_data.num_items() != tree.num_leaves() {
        return Err(HisegError::InvalidShape(format!(
            "leaf data has {} items for a tree with {} leaves",
            leaf_data.num_items(),
            tree.num_leaves()
        )));
    }
    tree.compute_children();
    let width = leaf_data.item_size();
    let out_width = acc.output_item_size(width);
    if out_width != width {
        return Err(HisegError::Unsupported(format!(
            "{:?} accumulator cannot be chained leaves-to-root",
            acc
        )));
    }
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(tree.num_nodes(), width);

    for leaf in tree.leaves() {
        out.set_row(leaf, leaf_data.row(leaf));
    }
    for i in tree.leaves_to_root(false, true) {
        kernel.reset();
        for &c in tree.children(i)? {
            kernel.accumulate(out.row(c));
        }
        let row = kernel.finalize().to_vec();
        out.set_row(i, &row);
    }
    Ok(out)
}

/// Leaves-to-root accumulation combined with a per-node input.
///
/// `out[leaf] = leaf_data[leaf]`; for each internal node `i`,
/// `out[i] = input[i] ⊕ acc(out[children(i)])`.
pub fn accumulate_and_combine_sequential(
    tree: &Tree,
    input: &DataArray,
    leaf_data: &DataArray,
    acc: Accumulator,
    combine: CombineOp,
) -> Result<DataArray> {
    check_node_data(tree, input)?;
    if leaf_data.num_items() != tree.num_leaves() {
        return Err(HisegError::InvalidShape(
            "leaf data does not match the number of leaves".into(),
        ));
    }
    if input.item_size() != leaf_data.item_size() {
        return Err(HisegError::InvalidShape(
            "input and leaf data must have the same item size".into(),
        ));
    }
    tree.compute_children();
    let width = input.item_size();
    if acc.output_item_size(width) != width {
        return Err(HisegError::Unsupported(format!(
            "{:?} accumulator cannot be chained leaves-to-root",
            acc
        )));
    }
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(tree.num_nodes(), width);

    for leaf in tree.leaves() {
        out.set_row(leaf, leaf_data.row(leaf));
    }
    for i in tree.leaves_to_root(false, true) {
        kernel.reset();
        for &c in tree.children(i)? {
            kernel.accumulate(out.row(c));
        }
        let acc_row = kernel.finalize().to_vec();
        let in_row = input.row(i);
        let combined: Vec<f64> = in_row
            .iter()
            .zip(&acc_row)
            .map(|(&a, &b)| combine.apply(a, b))
            .collect();
        out.set_row(i, &combined);
    }
    Ok(out)
}

/// `out[i] = input[parent(i)]` where `condition[i]` holds, else
/// `input[i]`. A pure per-node operation (the parent value read is the
/// input one, not the propagated one).
pub fn propagate_parallel(
    tree: &Tree,
    input: &DataArray,
    condition: &[bool],
) -> Result<DataArray> {
    check_node_data(tree, input)?;
    if condition.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "condition does not match the number of nodes".into(),
        ));
    }
    let mut out = DataArray::zeros(tree.num_nodes(), input.item_size());
    for i in 0..tree.num_nodes() {
        let src = if condition[i] { tree.parent(i) } else { i };
        out.set_row(i, input.row(src));
    }
    Ok(out)
}

/// Root-to-leaves conditional propagation: values cascade down chains of
/// nodes whose condition holds.
///
/// `out[i] = out[parent(i)]` where `condition[i]` holds, else `input[i]`.
pub fn propagate_sequential(
    tree: &Tree,
    input: &DataArray,
    condition: &[bool],
) -> Result<DataArray> {
    check_node_data(tree, input)?;
    if condition.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "condition does not match the number of nodes".into(),
        ));
    }
    let mut out = DataArray::zeros(tree.num_nodes(), input.item_size());
    for i in tree.root_to_leaves(true, true) {
        if condition[i] && i != tree.root() {
            out.copy_row(i, tree.parent(i));
        } else {
            out.set_row(i, input.row(i));
        }
    }
    Ok(out)
}

/// Root-to-leaves accumulation along every root-ward path.
///
/// `out[root] = input[root]`; for every other node,
/// `out[i] = acc(input[i], out[parent(i)])`.
pub fn propagate_sequential_and_accumulate(
    tree: &Tree,
    input: &DataArray,
    acc: Accumulator,
) -> Result<DataArray> {
    check_node_data(tree, input)?;
    let width = input.item_size();
    if acc.output_item_size(width) != width {
        return Err(HisegError::Unsupported(format!(
            "{:?} accumulator cannot be chained root-to-leaves",
            acc
        )));
    }
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(tree.num_nodes(), width);
    out.set_row(tree.root(), input.row(tree.root()));
    for i in tree.root_to_leaves(true, false) {
        kernel.reset();
        kernel.accumulate(input.row(i));
        let parent_row = out.row(tree.parent(i)).to_vec();
        kernel.accumulate(&parent_row);
        let row = kernel.finalize().to_vec();
        out.set_row(i, &row);
    }
    Ok(out)
}
