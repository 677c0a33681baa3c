//! Implicit regular graphs over a grid embedding.
//!
//! A regular graph is the pair (embedding, neighbour offsets): its edges
//! are never stored, they are enumerated on demand in a canonical order
//! (vertex scan × offset scan, skipping out-of-bounds targets). The
//! materialized 4/8-adjacency builders in [`crate::image::graph_image`]
//! follow the same order, so edge indices agree between the implicit and
//! explicit views.

use super::embedding::EmbeddingGrid;

/// An implicit graph defined by a grid embedding and neighbour offsets.
#[derive(Debug, Clone)]
pub struct RegularGraph {
    embedding: EmbeddingGrid,
    offsets: Vec<Vec<i64>>,
}

impl RegularGraph {
    /// Create a regular graph from an embedding and offset list.
    pub fn new(embedding: EmbeddingGrid, offsets: Vec<Vec<i64>>) -> Self {
        assert!(
            offsets.iter().all(|o| o.len() == embedding.dimension()),
            "offsets must match the embedding dimension"
        );
        Self { embedding, offsets }
    }

    /// 2-d 4-adjacency (up, left, right, down).
    pub fn adjacency_4(shape: (usize, usize)) -> Self {
        Self::new(
            EmbeddingGrid::new(vec![shape.0, shape.1]),
            vec![vec![-1, 0], vec![0, -1], vec![0, 1], vec![1, 0]],
        )
    }

    /// 2-d 8-adjacency.
    pub fn adjacency_8(shape: (usize, usize)) -> Self {
        Self::new(
            EmbeddingGrid::new(vec![shape.0, shape.1]),
            vec![
                vec![-1, -1],
                vec![-1, 0],
                vec![-1, 1],
                vec![0, -1],
                vec![0, 1],
                vec![1, -1],
                vec![1, 0],
                vec![1, 1],
            ],
        )
    }

    /// The grid embedding.
    pub fn embedding(&self) -> &EmbeddingGrid {
        &self.embedding
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.embedding.size()
    }

    /// Neighbours of `v`, in offset-scan order.
    pub fn neighbours(&self, v: usize) -> Vec<usize> {
        let coords = self.embedding.lin_to_grid(v);
        let mut result = Vec::with_capacity(self.offsets.len());
        let mut target = vec![0i64; coords.len()];
        for offset in &self.offsets {
            for (t, (&c, &o)) in target.iter_mut().zip(coords.iter().zip(offset)) {
                *t = c as i64 + o;
            }
            if self.embedding.contains(&target) {
                let t: Vec<usize> = target.iter().map(|&c| c as usize).collect();
                result.push(self.embedding.grid_to_lin(&t));
            }
        }
        result
    }

    /// Canonical edge enumeration: for each vertex in scan order, each
    /// in-bounds neighbour with a larger linear index.
    pub fn edge_iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_vertices()).flat_map(move |v| {
            self.neighbours(v)
                .into_iter()
                .filter(move |&t| t > v)
                .map(move |t| (v, t))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_4_adjacency_neighbours() {
        let g = RegularGraph::adjacency_4((2, 3));
        assert_eq!(g.neighbours(0), vec![1, 3]);
        assert_eq!(g.neighbours(4), vec![1, 3, 5]);
        assert_eq!(g.neighbours(5), vec![2, 4]);
    }

    #[test]
    fn test_8_adjacency_neighbours() {
        let g = RegularGraph::adjacency_8((2, 3));
        assert_eq!(g.neighbours(0), vec![1, 3, 4]);
        assert_eq!(g.neighbours(4), vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_canonical_edge_order() {
        let g = RegularGraph::adjacency_4((2, 3));
        let edges: Vec<(usize, usize)> = g.edge_iter().collect();
        assert_eq!(
            edges,
            vec![(0, 1), (0, 3), (1, 2), (1, 4), (2, 5), (3, 4), (4, 5)]
        );
    }
}
