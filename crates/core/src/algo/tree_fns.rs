//! Operations on valued hierarchies: labelisations, reconstruction,
//! reordering, and structural comparison.

use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::hierarchy::core::{supervertices_hierarchy, SimplifiedTree};
use crate::sorting::stable_arg_sort_by;
use crate::structure::tree::Tree;

fn check_altitudes(tree: &Tree, altitudes: &[f64]) -> Result<()> {
    if altitudes.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "altitudes do not match the number of nodes".into(),
        ));
    }
    Ok(())
}

/// Test whether two trees sharing their leaves are isomorphic.
///
/// `t1` and `t2` are isomorphic when a bijection `f` over nodes exists
/// with `f(leaf) = leaf` and `f(t1.parent(n)) = t2.parent(f(n))` for
/// every node `n`.
pub fn test_tree_isomorphism(t1: &Tree, t2: &Tree) -> bool {
    if t1.num_nodes() != t2.num_nodes() || t1.num_leaves() != t2.num_leaves() {
        return false;
    }
    let undefined = t1.num_nodes();
    let mut f = vec![undefined; t1.num_nodes()];
    for i in t1.leaves_to_root(true, true) {
        if t1.is_leaf(i) {
            f[i] = i;
        }
        if f[i] == undefined {
            // an internal node not reached from below cannot be mapped
            return false;
        }
        let p1 = t1.parent(i);
        let p2 = t2.parent(f[i]);
        if f[p1] == undefined {
            f[p1] = p2;
        } else if f[p1] != p2 {
            return false;
        }
    }
    true
}

/// Depth of every node (root at 0).
pub fn attribute_depth(tree: &Tree) -> Vec<usize> {
    let mut depth = vec![0; tree.num_nodes()];
    for i in tree.root_to_leaves(true, false) {
        depth[i] = depth[tree.parent(i)] + 1;
    }
    depth
}

/// Propagate node values down to the leaves through deleted nodes.
///
/// A node flagged in `deleted` takes the (already reconstructed) value
/// of its parent; the returned array holds the leaf rows only.
pub fn reconstruct_leaf_data(
    tree: &Tree,
    values: &DataArray,
    deleted: &[bool],
) -> Result<DataArray> {
    let reconstructed =
        crate::accumulator::tree::propagate_sequential(tree, values, deleted)?;
    let width = reconstructed.item_size();
    let mut out = DataArray::zeros(tree.num_leaves(), width);
    for leaf in tree.leaves() {
        out.set_row(leaf, reconstructed.row(leaf));
    }
    Ok(out)
}

/// Label the leaves according to the horizontal cut of the hierarchy at
/// the given threshold.
///
/// Each leaf is labelled by the cut node containing it, i.e. its highest
/// ancestor whose altitude is `<= threshold` below a parent of altitude
/// `> threshold`. Two leaves share a label exactly when the altitude of
/// their lowest common ancestor is `<= threshold`.
pub fn labelisation_horizontal_cut_from_threshold(
    tree: &Tree,
    altitudes: &[f64],
    threshold: f64,
) -> Result<Vec<usize>> {
    check_altitudes(tree, altitudes)?;
    let root = tree.root();
    let mut labels = vec![0usize; tree.num_nodes()];
    labels[root] = root;
    for i in tree.root_to_leaves(true, false) {
        let p = tree.parent(i);
        labels[i] = if altitudes[p] <= threshold { labels[p] } else { i };
    }
    labels.truncate(tree.num_leaves());
    Ok(labels)
}

/// Label the leaves into supervertices: two leaves share a label when
/// they have a common ancestor of altitude zero. Labels are normalized
/// to `[0, num_supervertices)`.
pub fn labelisation_hierarchy_supervertices(
    tree: &Tree,
    altitudes: &[f64],
) -> Result<Vec<usize>> {
    Ok(supervertices_hierarchy(tree, altitudes)?.supervertex_labelisation)
}

/// Reorder the internal nodes of a hierarchy by non-decreasing altitude.
///
/// The sort is stable, leaves keep their indices, and the returned
/// `node_map` sends new node indices to original ones. Altitudes must be
/// non-decreasing on every root-ward path for the result to be a valid
/// tree.
pub fn sort_hierarchy_with_altitudes(
    tree: &Tree,
    altitudes: &[f64],
) -> Result<SimplifiedTree> {
    check_altitudes(tree, altitudes)?;
    let n = tree.num_nodes();
    let num_leaves = tree.num_leaves();
    let num_internal = n - num_leaves;

    let internal_order =
        stable_arg_sort_by(num_internal, |i| altitudes[num_leaves + i]);
    let mut node_map: Vec<usize> = (0..num_leaves).collect();
    node_map.extend(internal_order.iter().map(|&i| num_leaves + i));

    let mut new_id = vec![0usize; n];
    for (new, &orig) in node_map.iter().enumerate() {
        new_id[orig] = new;
    }
    let parents: Vec<usize> = node_map
        .iter()
        .map(|&orig| new_id[tree.parent(orig)])
        .collect();
    Ok(SimplifiedTree {
        tree: Tree::with_category(parents, tree.category())?,
        node_map,
    })
}

/// Select the union of the regions intersecting the object marker and
/// disjoint from the background marker; returns one flag per leaf.
pub fn binary_labelisation_from_markers(
    tree: &Tree,
    object_marker: &[bool],
    background_marker: &[bool],
) -> Result<Vec<bool>> {
    let num_leaves = tree.num_leaves();
    if object_marker.len() != num_leaves || background_marker.len() != num_leaves {
        return Err(HisegError::InvalidShape(
            "markers do not match the number of leaves".into(),
        ));
    }
    let n = tree.num_nodes();
    let mut touches_object = vec![false; n];
    let mut touches_background = vec![false; n];
    for leaf in tree.leaves() {
        touches_object[leaf] = object_marker[leaf];
        touches_background[leaf] = background_marker[leaf];
    }
    for i in tree.leaves_to_root(true, false) {
        let p = tree.parent(i);
        touches_object[p] |= touches_object[i];
        touches_background[p] |= touches_background[i];
    }

    let mut selected = vec![false; n];
    for i in tree.root_to_leaves(true, true) {
        let own = touches_object[i] && !touches_background[i];
        selected[i] = own || (i != tree.root() && selected[tree.parent(i)]);
    }
    selected.truncate(num_leaves);
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap()
    }

    #[test]
    fn test_isomorphism_positive() {
        let t1 = sample();
        // same shape, internal nodes 5 and 6 swapped
        let t2 = Tree::new(vec![6, 6, 5, 5, 5, 7, 7, 7]).unwrap();
        assert!(test_tree_isomorphism(&t1, &t2));
        assert!(test_tree_isomorphism(&t2, &t1));
    }

    #[test]
    fn test_isomorphism_negative() {
        let t1 = sample();
        let t2 = Tree::new(vec![5, 6, 5, 6, 6, 7, 7, 7]).unwrap();
        assert!(!test_tree_isomorphism(&t1, &t2));
    }

    #[test]
    fn test_attribute_depth() {
        let t = sample();
        assert_eq!(attribute_depth(&t), vec![2, 2, 2, 2, 2, 1, 1, 0]);
    }

    #[test]
    fn test_labelisation_horizontal_cut() {
        let t = sample();
        let altitudes = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let labels =
            labelisation_horizontal_cut_from_threshold(&t, &altitudes, 1.0).unwrap();
        // node 5 (altitude 1) is in the cut, node 6 (altitude 2) is not
        assert_eq!(labels, vec![5, 5, 2, 3, 4]);
        let labels =
            labelisation_horizontal_cut_from_threshold(&t, &altitudes, 2.5).unwrap();
        assert_eq!(labels, vec![5, 5, 6, 6, 6]);
    }

    #[test]
    fn test_reconstruct_leaf_data() {
        let t = sample();
        let values = DataArray::from_scalars(vec![
            10.0, 11.0, 12.0, 13.0, 14.0, 50.0, 60.0, 70.0,
        ]);
        let deleted = [true, false, false, true, true, false, false, false];
        let out = reconstruct_leaf_data(&t, &values, &deleted).unwrap();
        assert_eq!(out.scalars(), &[50.0, 11.0, 12.0, 60.0, 60.0]);
    }

    #[test]
    fn test_sort_hierarchy_with_altitudes() {
        // internal altitudes out of order: node 5 above node 6
        let t = Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap();
        let altitudes = [0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 1.0, 3.0];
        let res = sort_hierarchy_with_altitudes(&t, &altitudes).unwrap();
        assert_eq!(res.node_map, vec![0, 1, 2, 3, 4, 6, 5, 7]);
        // old 5 -> new 6, old 6 -> new 5
        assert_eq!(res.tree.parents(), &[6, 6, 5, 5, 5, 7, 7, 7]);
    }

    #[test]
    fn test_binary_labelisation_from_markers() {
        let t = sample();
        // object marks leaf 0; background marks leaf 4
        let object = [true, false, false, false, false];
        let background = [false, false, false, false, true];
        let labels = binary_labelisation_from_markers(&t, &object, &background).unwrap();
        // region {0, 1} (node 5) intersects the object and avoids the
        // background; node 6 and the root touch the background
        assert_eq!(labels, vec![true, true, false, false, false]);
    }
}
