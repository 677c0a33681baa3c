//! Watershed hierarchies by attribute ordering.
//!
//! The construction follows the corrected-attribute scheme: build the
//! canonical BPT, make the chosen attribute monotone on altitude
//! plateaus, turn it into a per-node persistence by a parallel min
//! accumulation, re-run the canonical BPT on the minimum spanning tree
//! re-weighted by the persistence of its merge nodes, and collapse the
//! resulting plateaus.

use crate::accumulator::tree::accumulate_parallel;
use crate::accumulator::Accumulator;
use crate::array::DataArray;
use crate::attributes::{attribute_area, attribute_dynamics, attribute_volume};
use crate::error::{HisegError, Result};
use crate::hierarchy::core::{bpt_canonical, quasi_flat_zones_hierarchy, NodeWeightedTree};
use crate::structure::graph::UndirectedGraph;
use crate::structure::tree::Tree;

/// Replace the attribute of a node lying inside an altitude plateau by
/// the maximum of its children's corrected attributes (a leaf's
/// corrected attribute is its own); the root keeps its value. In the
/// returned array the leaves are zeroed, ready for the persistence
/// accumulation.
fn correct_attribute_bpt(
    tree: &Tree,
    altitudes: &[f64],
    attribute: &[f64],
) -> Result<Vec<f64>> {
    tree.compute_children();
    let mut result = attribute.to_vec();
    for i in tree.leaves_to_root(false, false) {
        if altitudes[i] != altitudes[tree.parent(i)] {
            result[i] = attribute[i];
        } else {
            let mut maxc = f64::NEG_INFINITY;
            for &c in tree.children(i)? {
                maxc = maxc.max(result[c]);
            }
            result[i] = maxc;
        }
    }
    let root = tree.root();
    result[root] = attribute[root];
    for i in tree.leaves() {
        result[i] = 0.0;
    }
    Ok(result)
}

/// Watershed hierarchy driven by a user attribute.
///
/// The functor receives the canonical BPT and its altitudes and returns
/// one attribute value per node.
pub fn watershed_hierarchy_by_attribute<F>(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
    attribute_functor: F,
) -> Result<NodeWeightedTree>
where
    F: FnOnce(&Tree, &[f64]) -> Result<Vec<f64>>,
{
    if edge_weights.iter().any(|&w| w < 0.0) {
        return Err(HisegError::PreconditionFailed(
            "edge weights must be non-negative".into(),
        ));
    }
    let bpt = bpt_canonical(graph, edge_weights)?;
    let attribute = attribute_functor(&bpt.tree, &bpt.altitudes)?;
    if attribute.len() != bpt.tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "attribute does not match the number of BPT nodes".into(),
        ));
    }
    let corrected = correct_attribute_bpt(&bpt.tree, &bpt.altitudes, &attribute)?;

    // per-node persistence: smallest corrected attribute among children
    let persistence = accumulate_parallel(
        &bpt.tree,
        &DataArray::from_scalars(corrected),
        Accumulator::Min,
    )?;
    let num_leaves = bpt.tree.num_leaves();
    let mst_edge_weights: Vec<f64> =
        persistence.scalars()[num_leaves..].to_vec();

    quasi_flat_zones_hierarchy(&bpt.mst, &mst_edge_weights)
}

/// Watershed hierarchy by area, with explicit vertex areas.
pub fn watershed_hierarchy_by_area(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
    vertex_area: &[f64],
) -> Result<NodeWeightedTree> {
    if vertex_area.len() != graph.num_vertices() {
        return Err(HisegError::InvalidShape(
            "vertex areas do not match the number of vertices".into(),
        ));
    }
    watershed_hierarchy_by_attribute(graph, edge_weights, |tree, _| {
        attribute_area(tree, vertex_area)
    })
}

/// Watershed hierarchy by area with unit vertex areas.
pub fn watershed_hierarchy_by_area_unit(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    watershed_hierarchy_by_area(graph, edge_weights, &vec![1.0; graph.num_vertices()])
}

/// Watershed hierarchy by volume (`area * altitude`).
pub fn watershed_hierarchy_by_volume(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
    vertex_area: &[f64],
) -> Result<NodeWeightedTree> {
    if vertex_area.len() != graph.num_vertices() {
        return Err(HisegError::InvalidShape(
            "vertex areas do not match the number of vertices".into(),
        ));
    }
    watershed_hierarchy_by_attribute(graph, edge_weights, |tree, altitudes| {
        attribute_volume(tree, altitudes, vertex_area)
    })
}

/// Watershed hierarchy by dynamics.
pub fn watershed_hierarchy_by_dynamics(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    watershed_hierarchy_by_attribute(graph, edge_weights, attribute_dynamics)
}

/// Watershed hierarchy driven by an explicit ranking of the regional
/// minima: each node's attribute is the largest vertex rank below it.
pub fn watershed_hierarchy_by_minima_ordering(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
    vertex_minima_ranks: &[f64],
) -> Result<NodeWeightedTree> {
    if vertex_minima_ranks.len() != graph.num_vertices() {
        return Err(HisegError::InvalidShape(
            "minima ranks do not match the number of vertices".into(),
        ));
    }
    watershed_hierarchy_by_attribute(graph, edge_weights, |tree, _| {
        let leaf_data = DataArray::from_scalars(vertex_minima_ranks.to_vec());
        let out = crate::accumulator::tree::accumulate_sequential(
            tree,
            &leaf_data,
            Accumulator::Max,
        )?;
        Ok(out.into_vec())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::horizontal_cuts::HorizontalCutExplorer;
    use crate::image::graph_image::get_4_adjacency_graph;

    #[test]
    fn test_watershed_by_area_path() {
        let g = get_4_adjacency_graph((1, 19));
        let weights = [
            0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0,
            0.0, 2.0, 0.0, 0.0,
        ];
        let res = watershed_hierarchy_by_area_unit(&g, &weights).unwrap();
        let root = res.tree.root();
        assert_eq!(res.altitudes[root], 5.0);

        // the non-trivial cut levels of the hierarchy are 2, 3 and 5
        let explorer =
            HorizontalCutExplorer::new(&res.tree, &res.altitudes).unwrap();
        let mut nonzero: Vec<f64> = explorer
            .altitude_cuts()
            .iter()
            .copied()
            .filter(|&a| a > 0.0)
            .collect();
        nonzero.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(nonzero, vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_watershed_altitudes_monotone() {
        let g = get_4_adjacency_graph((2, 3));
        let weights = [1.0, 0.0, 2.0, 1.0, 1.0, 1.0, 2.0];
        let res = watershed_hierarchy_by_area_unit(&g, &weights).unwrap();
        for i in 0..res.tree.num_nodes() - 1 {
            assert!(res.altitudes[i] <= res.altitudes[res.tree.parent(i)]);
        }
    }

    #[test]
    fn test_negative_weights_rejected() {
        let g = get_4_adjacency_graph((1, 2));
        assert!(matches!(
            watershed_hierarchy_by_area_unit(&g, &[-1.0]),
            Err(HisegError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_watershed_by_volume_and_dynamics_run() {
        let g = get_4_adjacency_graph((2, 3));
        let weights = [1.0, 0.0, 2.0, 1.0, 1.0, 1.0, 2.0];
        let areas = vec![1.0; 6];
        let by_volume = watershed_hierarchy_by_volume(&g, &weights, &areas).unwrap();
        let by_dynamics = watershed_hierarchy_by_dynamics(&g, &weights).unwrap();
        assert!(by_volume.tree.num_leaves() == 6);
        assert!(by_dynamics.tree.num_leaves() == 6);
    }
}
