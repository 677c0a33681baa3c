//! Per-node attributes of valued hierarchies.

use crate::accumulator::tree::accumulate_sequential;
use crate::accumulator::Accumulator;
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::tree::Tree;

/// Area of every node: the sum of the vertex areas of its leaves.
pub fn attribute_area(tree: &Tree, vertex_area: &[f64]) -> Result<Vec<f64>> {
    let leaf_data = DataArray::from_scalars(vertex_area.to_vec());
    let out = accumulate_sequential(tree, &leaf_data, Accumulator::Sum)?;
    Ok(out.into_vec())
}

/// Area with unit vertex areas: the number of leaves below each node.
pub fn attribute_area_unit(tree: &Tree) -> Result<Vec<f64>> {
    attribute_area(tree, &vec![1.0; tree.num_leaves()])
}

/// Volume of every node: `area * altitude`.
pub fn attribute_volume(
    tree: &Tree,
    altitudes: &[f64],
    vertex_area: &[f64],
) -> Result<Vec<f64>> {
    if altitudes.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "altitudes do not match the number of nodes".into(),
        ));
    }
    let area = attribute_area(tree, vertex_area)?;
    Ok(area
        .iter()
        .zip(altitudes)
        .map(|(&a, &alt)| a * alt)
        .collect())
}

/// Dynamics of every node of a valued partition hierarchy.
///
/// The pass depth of a node is the minimum altitude among the internal
/// nodes of its subtree. A node that carries its parent's deepest pass
/// inherits the parent's dynamics; any other node dies when it merges,
/// so its dynamics is `altitude(parent) - depth(node)`. Leaves get 0.
pub fn attribute_dynamics(tree: &Tree, altitudes: &[f64]) -> Result<Vec<f64>> {
    if altitudes.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "altitudes do not match the number of nodes".into(),
        ));
    }
    let n = tree.num_nodes();
    let root = tree.root();
    let num_leaves = tree.num_leaves();

    // minimum altitude of internal nodes in each subtree
    let mut depth = vec![f64::INFINITY; n];
    for i in tree.leaves_to_root(false, true) {
        depth[i] = altitudes[i];
    }
    for i in tree.leaves_to_root(false, true) {
        let p = tree.parent(i);
        if i != root && depth[i] < depth[p] {
            depth[p] = depth[i];
        }
    }

    let mut dynamics = vec![0.0; n];
    dynamics[root] = altitudes[root] - depth[root];
    for i in tree.root_to_leaves(false, false) {
        let p = tree.parent(i);
        if depth[i] == depth[p] {
            dynamics[i] = dynamics[p];
        } else {
            dynamics[i] = altitudes[p] - depth[i];
        }
    }
    for d in dynamics.iter_mut().take(num_leaves) {
        *d = 0.0;
    }
    Ok(dynamics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap()
    }

    #[test]
    fn test_area() {
        let t = sample();
        let area = attribute_area_unit(&t).unwrap();
        assert_eq!(area, vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_volume() {
        let t = sample();
        let altitudes = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let volume =
            attribute_volume(&t, &altitudes, &[1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(volume, vec![0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 6.0, 15.0]);
    }

    #[test]
    fn test_dynamics() {
        // two minima: node 5 (altitude 1) and node 6 (altitude 2),
        // merged at the root (altitude 5)
        let t = sample();
        let altitudes = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 5.0];
        let dynamics = attribute_dynamics(&t, &altitudes).unwrap();
        // node 5 carries the deepest pass: inherits the root's dynamics
        assert_eq!(dynamics[5], 4.0);
        assert_eq!(dynamics[7], 4.0);
        // node 6 dies at the root: 5 - 2
        assert_eq!(dynamics[6], 3.0);
        assert_eq!(&dynamics[..5], &[0.0; 5]);
    }
}
