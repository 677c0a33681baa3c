//! Region adjacency graphs: the quotient of a graph by a vertex
//! labelling.

use crate::accumulator::at::accumulate_at;
use crate::accumulator::Accumulator;
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::graph::UndirectedGraph;
use crate::INVALID_INDEX;

/// A region adjacency graph with its projection maps.
///
/// - `vertex_map[v]` is the RAG vertex containing graph vertex `v`.
/// - `edge_map[e]` is the RAG edge index for graph edges crossing
///   region boundaries, [`INVALID_INDEX`] for inner edges.
///
/// For each pair of adjacent regions exactly one RAG edge exists, and
/// the first boundary edge encountered during the traversal is its
/// canonical pre-image.
#[derive(Debug, Clone)]
pub struct RegionAdjacencyGraph {
    pub rag: UndirectedGraph,
    pub vertex_map: Vec<usize>,
    pub edge_map: Vec<usize>,
}

impl RegionAdjacencyGraph {
    /// Build the RAG of a vertex-labelled graph.
    ///
    /// Regions are connected components of same-label vertices; a label
    /// reused by several components yields several regions.
    pub fn from_labelisation(
        graph: &UndirectedGraph,
        vertex_labels: &[usize],
    ) -> Result<Self> {
        if vertex_labels.len() != graph.num_vertices() {
            return Err(HisegError::InvalidShape(
                "vertex labels do not match the number of vertices".into(),
            ));
        }
        let mut rag = UndirectedGraph::new(0);
        let mut vertex_map = vec![INVALID_INDEX; graph.num_vertices()];
        let mut edge_map = vec![INVALID_INDEX; graph.num_edges()];

        let mut num_regions = 0usize;
        let mut num_rag_edges = 0usize;
        // per already-built region, the most recent RAG edge towards it
        let mut canonical_edge: Vec<usize> = Vec::new();
        let mut stack = Vec::new();

        for start in 0..graph.num_vertices() {
            if vertex_map[start] != INVALID_INDEX {
                continue;
            }
            let label = vertex_labels[start];
            vertex_map[start] = num_regions;
            rag.add_vertex();
            canonical_edge.push(INVALID_INDEX);
            // edges created before this region was opened cannot be
            // canonical for it
            let lowest_edge = num_rag_edges;
            stack.push(start);
            while let Some(v) = stack.pop() {
                for &ei in graph.out_edges(v) {
                    let adj = graph.other_vertex(ei, v);
                    if vertex_labels[adj] == label {
                        if vertex_map[adj] == INVALID_INDEX {
                            vertex_map[adj] = num_regions;
                            stack.push(adj);
                        }
                    } else if vertex_map[adj] != INVALID_INDEX {
                        let adj_region = vertex_map[adj];
                        if canonical_edge[adj_region] == INVALID_INDEX
                            || canonical_edge[adj_region] < lowest_edge
                        {
                            rag.add_edge(adj_region, num_regions)?;
                            edge_map[ei] = num_rag_edges;
                            canonical_edge[adj_region] = num_rag_edges;
                            num_rag_edges += 1;
                        } else {
                            edge_map[ei] = canonical_edge[adj_region];
                        }
                    }
                }
            }
            num_regions += 1;
        }

        Ok(Self {
            rag,
            vertex_map,
            edge_map,
        })
    }

    /// Build the RAG of a graph cut: every edge with a non-zero weight
    /// crosses the cut.
    pub fn from_graph_cut(graph: &UndirectedGraph, edge_weights: &[f64]) -> Result<Self> {
        let labels = crate::algo::graph_core::graph_cut_2_labelisation(graph, edge_weights)?;
        Self::from_labelisation(graph, &labels)
    }

    /// Number of regions.
    pub fn num_regions(&self) -> usize {
        self.rag.num_vertices()
    }

    /// Copy RAG values back onto the original index space through a map.
    ///
    /// `out[i] = rag_values[map[i]]`; entries mapped to
    /// [`INVALID_INDEX`] stay zero.
    pub fn back_project_weights(map: &[usize], rag_values: &DataArray) -> DataArray {
        let mut out = DataArray::zeros(map.len(), rag_values.item_size());
        for (i, &m) in map.iter().enumerate() {
            if m != INVALID_INDEX {
                out.set_row(i, rag_values.row(m));
            }
        }
        out
    }

    /// Reduce original-space values onto the RAG index space through a
    /// map (vertex map or edge map).
    pub fn accumulate(
        map: &[usize],
        values: &DataArray,
        acc: Accumulator,
    ) -> Result<DataArray> {
        accumulate_at(map, values, acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x3 grid, canonical edge order, labels splitting left / right:
    /// 0 0 1
    /// 0 1 1
    fn sample() -> (UndirectedGraph, Vec<usize>) {
        let mut g = UndirectedGraph::new(6);
        for (u, v) in [(0, 1), (0, 3), (1, 2), (1, 4), (2, 5), (3, 4), (4, 5)] {
            g.add_edge(u, v).unwrap();
        }
        (g, vec![0, 0, 1, 0, 1, 1])
    }

    #[test]
    fn test_from_labelisation() {
        let (g, labels) = sample();
        let rag = RegionAdjacencyGraph::from_labelisation(&g, &labels).unwrap();
        assert_eq!(rag.num_regions(), 2);
        assert_eq!(rag.rag.num_edges(), 1);
        assert_eq!(rag.vertex_map, vec![0, 0, 1, 0, 1, 1]);
        // crossing edges: (1,2)=2, (1,4)=3, (3,4)=5 all map to RAG edge 0
        assert_eq!(
            rag.edge_map,
            vec![
                INVALID_INDEX,
                INVALID_INDEX,
                0,
                0,
                INVALID_INDEX,
                0,
                INVALID_INDEX
            ]
        );
    }

    #[test]
    fn test_edge_map_vertex_map_consistency() {
        let (g, labels) = sample();
        let rag = RegionAdjacencyGraph::from_labelisation(&g, &labels).unwrap();
        for (ei, u, v) in g.edge_iter() {
            let crossing = rag.vertex_map[u] != rag.vertex_map[v];
            assert_eq!(rag.edge_map[ei] != INVALID_INDEX, crossing);
        }
    }

    #[test]
    fn test_same_label_two_components() {
        // 0 - 1 - 2 with labels 5, 9, 5: vertex 0 and 2 are distinct regions
        let mut g = UndirectedGraph::new(3);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 2).unwrap();
        let rag = RegionAdjacencyGraph::from_labelisation(&g, &[5, 9, 5]).unwrap();
        assert_eq!(rag.num_regions(), 3);
        assert_eq!(rag.rag.num_edges(), 2);
    }

    #[test]
    fn test_from_graph_cut() {
        let (g, _) = sample();
        // cut on edges (1,2), (1,4), (3,4)
        let weights = vec![0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0];
        let rag = RegionAdjacencyGraph::from_graph_cut(&g, &weights).unwrap();
        assert_eq!(rag.num_regions(), 2);
        assert_eq!(rag.rag.num_edges(), 1);
    }

    #[test]
    fn test_back_project_and_accumulate() {
        let (g, labels) = sample();
        let rag = RegionAdjacencyGraph::from_labelisation(&g, &labels).unwrap();
        let region_values = DataArray::from_scalars(vec![10.0, 20.0]);
        let back =
            RegionAdjacencyGraph::back_project_weights(&rag.vertex_map, &region_values);
        assert_eq!(back.scalars(), &[10.0, 10.0, 20.0, 10.0, 20.0, 20.0]);

        let vertex_values =
            DataArray::from_scalars(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let acc = RegionAdjacencyGraph::accumulate(
            &rag.vertex_map,
            &vertex_values,
            Accumulator::Sum,
        )
        .unwrap();
        assert_eq!(acc.scalars(), &[7.0, 14.0]);
    }
}
