//! Per-vertex reductions over a graph's incident edges or neighbours.

use super::{Accumulator, AccumulatorKernel};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::graph::UndirectedGraph;

/// `out[v] = acc(edge_weights[incident edges of v])`.
pub fn accumulate_graph_edges(
    graph: &UndirectedGraph,
    edge_weights: &DataArray,
    acc: Accumulator,
) -> Result<DataArray> {
    if edge_weights.num_items() != graph.num_edges() {
        return Err(HisegError::InvalidShape(
            "edge weights do not match the number of edges".into(),
        ));
    }
    let width = edge_weights.item_size();
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(graph.num_vertices(), acc.output_item_size(width));
    for v in 0..graph.num_vertices() {
        kernel.reset();
        for &ei in graph.out_edges(v) {
            kernel.accumulate(edge_weights.row(ei));
        }
        out.set_row(v, kernel.finalize());
    }
    Ok(out)
}

/// `out[v] = acc(vertex_weights[neighbours of v])`.
pub fn accumulate_graph_vertices(
    graph: &UndirectedGraph,
    vertex_weights: &DataArray,
    acc: Accumulator,
) -> Result<DataArray> {
    if vertex_weights.num_items() != graph.num_vertices() {
        return Err(HisegError::InvalidShape(
            "vertex weights do not match the number of vertices".into(),
        ));
    }
    let width = vertex_weights.item_size();
    let mut kernel = AccumulatorKernel::new(acc, width)?;
    let mut out = DataArray::zeros(graph.num_vertices(), acc.output_item_size(width));
    for v in 0..graph.num_vertices() {
        kernel.reset();
        for n in graph.adjacent_vertices(v) {
            kernel.accumulate(vertex_weights.row(n));
        }
        out.set_row(v, kernel.finalize());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> UndirectedGraph {
        let mut g = UndirectedGraph::new(3);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 2).unwrap();
        g
    }

    #[test]
    fn test_edge_accumulation() {
        let g = path3();
        let w = DataArray::from_scalars(vec![1.0, 5.0]);
        let out = accumulate_graph_edges(&g, &w, Accumulator::Max).unwrap();
        assert_eq!(out.scalars(), &[1.0, 5.0, 5.0]);
    }

    #[test]
    fn test_vertex_accumulation() {
        let g = path3();
        let w = DataArray::from_scalars(vec![10.0, 20.0, 30.0]);
        let out = accumulate_graph_vertices(&g, &w, Accumulator::Sum).unwrap();
        assert_eq!(out.scalars(), &[20.0, 40.0, 20.0]);
    }
}
