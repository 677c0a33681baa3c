//! Pixel adjacency graphs and the Khalimsky contour representation.

use crate::error::{HisegError, Result};
use crate::structure::embedding::EmbeddingGrid;
use crate::structure::graph::UndirectedGraph;
use crate::structure::regular_graph::RegularGraph;

/// Explicit 4-adjacency graph of a 2-d grid, edges in canonical order.
pub fn get_4_adjacency_graph(shape: (usize, usize)) -> UndirectedGraph {
    materialize(&RegularGraph::adjacency_4(shape))
}

/// Explicit 8-adjacency graph of a 2-d grid, edges in canonical order.
pub fn get_8_adjacency_graph(shape: (usize, usize)) -> UndirectedGraph {
    materialize(&RegularGraph::adjacency_8(shape))
}

/// Implicit 4-adjacency view (edges enumerated on demand).
pub fn get_4_adjacency_implicit_graph(shape: (usize, usize)) -> RegularGraph {
    RegularGraph::adjacency_4(shape)
}

/// Implicit 8-adjacency view (edges enumerated on demand).
pub fn get_8_adjacency_implicit_graph(shape: (usize, usize)) -> RegularGraph {
    RegularGraph::adjacency_8(shape)
}

fn materialize(regular: &RegularGraph) -> UndirectedGraph {
    let mut g = UndirectedGraph::new(regular.num_vertices());
    for (u, v) in regular.edge_iter() {
        g.add_edge(u, v).expect("regular graph edges are in bounds");
    }
    g
}

/// A scalar 2-d contour image in Khalimsky coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct KhalimskyGrid {
    pub data: Vec<f64>,
    pub height: usize,
    pub width: usize,
}

impl KhalimskyGrid {
    fn get(&self, y: usize, x: usize) -> f64 {
        self.data[y * self.width + x]
    }

    fn set(&mut self, y: usize, x: usize, v: f64) {
        self.data[y * self.width + x] = v;
    }
}

/// Draw the edge weights of a 4-adjacency graph on the Khalimsky grid.
///
/// Without the extra border the result has shape `(2h-1, 2w-1)`; with it
/// `(2h+1, 2w+1)` and the drawing is shifted inward by one. Inter-pixel
/// slots carry the edge weights, each odd/odd slot carries the maximum
/// of its incident inter-pixel slots, and the remaining slots are 0.
pub fn graph_4_adjacency_2_khalimsky(
    graph: &UndirectedGraph,
    shape: (usize, usize),
    edge_weights: &[f64],
    add_extra_border: bool,
) -> Result<KhalimskyGrid> {
    let (h, w) = shape;
    if graph.num_vertices() != h * w {
        return Err(HisegError::InvalidShape(
            "graph does not match the grid shape".into(),
        ));
    }
    if edge_weights.len() != graph.num_edges() {
        return Err(HisegError::InvalidShape(
            "edge weights do not match the number of edges".into(),
        ));
    }
    let border = usize::from(add_extra_border);
    let kh = 2 * h - 1 + 2 * border;
    let kw = 2 * w - 1 + 2 * border;
    let mut grid = KhalimskyGrid {
        data: vec![0.0; kh * kw],
        height: kh,
        width: kw,
    };

    let embedding = EmbeddingGrid::new(vec![h, w]);
    for (ei, u, v) in graph.edge_iter() {
        let cu = embedding.lin_to_grid(u);
        let cv = embedding.lin_to_grid(v);
        // the slot of a 4-adjacency edge is the coordinate sum of its
        // endpoints
        let y = cu[0] + cv[0] + border;
        let x = cu[1] + cv[1] + border;
        grid.set(y, x, edge_weights[ei]);
    }

    // 2-faces sit at the parity opposite to the pixels: odd/odd without
    // the extra border, even/even with it
    let face_start = 1 - border;
    for y in (face_start..kh).step_by(2) {
        for x in (face_start..kw).step_by(2) {
            let mut m = f64::NEG_INFINITY;
            if x > 0 {
                m = m.max(grid.get(y, x - 1));
            }
            if x + 1 < kw {
                m = m.max(grid.get(y, x + 1));
            }
            if y > 0 {
                m = m.max(grid.get(y - 1, x));
            }
            if y + 1 < kh {
                m = m.max(grid.get(y + 1, x));
            }
            grid.set(y, x, m);
        }
    }
    Ok(grid)
}

/// Rebuild the 4-adjacency graph, its shape, and its edge weights from
/// a Khalimsky contour grid.
pub fn khalimsky_2_graph_4_adjacency(
    grid: &KhalimskyGrid,
    extra_border: bool,
) -> Result<(UndirectedGraph, (usize, usize), Vec<f64>)> {
    let border = usize::from(extra_border);
    if grid.height < 1 + 2 * border
        || grid.width < 1 + 2 * border
        || (grid.height - 2 * border) % 2 != 1
        || (grid.width - 2 * border) % 2 != 1
    {
        return Err(HisegError::InvalidShape(
            "not a Khalimsky grid shape".into(),
        ));
    }
    let h = (grid.height - 2 * border + 1) / 2;
    let w = (grid.width - 2 * border + 1) / 2;
    let graph = get_4_adjacency_graph((h, w));
    let embedding = EmbeddingGrid::new(vec![h, w]);
    let mut weights = vec![0.0; graph.num_edges()];
    for (ei, u, v) in graph.edge_iter() {
        let cu = embedding.lin_to_grid(u);
        let cv = embedding.lin_to_grid(v);
        weights[ei] = grid.get(cu[0] + cv[0] + border, cu[1] + cv[1] + border);
    }
    Ok((graph, (h, w), weights))
}
