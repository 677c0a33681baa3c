//! Graph cuts and vertex labellings.

use crate::algo::graph_weights::{weight_graph, WeightFunction};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::graph::UndirectedGraph;
use crate::INVALID_INDEX;

/// Label the vertices of a graph according to a graph cut.
///
/// Every edge with a non-zero weight belongs to the cut; the labels are
/// the connected components of the remaining edges, numbered in
/// first-visit order starting at 0.
pub fn graph_cut_2_labelisation(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<Vec<usize>> {
    if edge_weights.len() != graph.num_edges() {
        return Err(HisegError::InvalidShape(
            "edge weights do not match the number of edges".into(),
        ));
    }
    let mut labels = vec![INVALID_INDEX; graph.num_vertices()];
    let mut stack = Vec::new();
    let mut current_label = 0;
    for v in 0..graph.num_vertices() {
        if labels[v] != INVALID_INDEX {
            continue;
        }
        labels[v] = current_label;
        stack.push(v);
        while let Some(cv) = stack.pop() {
            for &ei in graph.out_edges(cv) {
                if edge_weights[ei] == 0.0 {
                    let n = graph.other_vertex(ei, cv);
                    if labels[n] == INVALID_INDEX {
                        labels[n] = current_label;
                        stack.push(n);
                    }
                }
            }
        }
        current_label += 1;
    }
    Ok(labels)
}

/// The graph cut matching a vertex labelling: edges joining two
/// different labels get weight 1, all others 0.
pub fn labelisation_2_graph_cut(
    graph: &UndirectedGraph,
    vertex_labels: &[usize],
) -> Result<Vec<f64>> {
    if vertex_labels.len() != graph.num_vertices() {
        return Err(HisegError::InvalidShape(
            "vertex labels do not match the number of vertices".into(),
        ));
    }
    let data = DataArray::from_scalars(vertex_labels.iter().map(|&l| l as f64).collect());
    weight_graph(graph, &data, WeightFunction::L0)
}

/// Number of connected components of the graph.
pub fn num_connected_components(graph: &UndirectedGraph) -> usize {
    let zeros = vec![0.0; graph.num_edges()];
    match graph_cut_2_labelisation(graph, &zeros) {
        Ok(labels) => labels.iter().max().map_or(0, |&m| m + 1),
        Err(_) => 0,
    }
}
