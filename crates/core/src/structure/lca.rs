//! Constant-time lowest-common-ancestor oracles.
//!
//! Both oracles reduce LCA to a range-minimum query over the depth
//! sequence of an Euler tour of the tree:
//!
//! - [`LcaSparseTable`] stores a full sparse table: O(n log n)
//!   preprocessing, O(1) queries.
//! - [`LcaSparseTableBlock`] splits the tour into blocks of a chosen
//!   size, keeps per-block prefix/suffix minima plus a sparse table over
//!   the block minima: O(n) preprocessing, O(block size) queries.
//!
//! The preprocessed arrays can be exported as plain arrays and imported
//! again without re-touring the tree, so a host can cache them
//! out of process.

use crate::error::{HisegError, Result};
use crate::structure::tree::Tree;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Euler tour
// ---------------------------------------------------------------------------

/// Euler tour of a tree: visited node per step, depth per step, and the
/// first visit position of every node.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EulerTour {
    tour: Vec<usize>,
    depth: Vec<usize>,
    first_visit: Vec<usize>,
}

fn euler_tour(tree: &Tree) -> EulerTour {
    tree.compute_children();
    let n = tree.num_nodes();
    let tour_len = 2 * n - 1;
    let mut tour = Vec::with_capacity(tour_len);
    let mut depth = Vec::with_capacity(tour_len);
    let mut first_visit = vec![usize::MAX; n];

    // iterative DFS recording each node on entry and on return from a child
    let mut stack: Vec<(usize, usize, usize)> = vec![(tree.root(), 0, 0)];
    while let Some((node, d, child_pos)) = stack.pop() {
        if child_pos == 0 {
            first_visit[node] = tour.len();
        }
        tour.push(node);
        depth.push(d);
        let children = tree.children(node).expect("children computed above");
        if child_pos < children.len() {
            stack.push((node, d, child_pos + 1));
            stack.push((children[child_pos], d + 1, 0));
        }
    }
    EulerTour {
        tour,
        depth,
        first_visit,
    }
}

// ---------------------------------------------------------------------------
// Range-minimum queries over the tour depth
// ---------------------------------------------------------------------------

/// Sparse table of argmin positions over a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RmqSparseTable {
    /// `table[k][i]` is the argmin of `values[i..i + 2^(k+1)]`.
    table: Vec<Vec<usize>>,
}

impl RmqSparseTable {
    fn build(values: &[usize]) -> Self {
        let n = values.len();
        let mut table: Vec<Vec<usize>> = Vec::new();
        if n >= 2 {
            let mut prev: Vec<usize> = (0..n - 1)
                .map(|i| if values[i] <= values[i + 1] { i } else { i + 1 })
                .collect();
            let mut width = 2;
            loop {
                table.push(prev.clone());
                if 2 * width > n {
                    break;
                }
                let next: Vec<usize> = (0..n - 2 * width + 1)
                    .map(|i| {
                        let a = prev[i];
                        let b = prev[i + width];
                        if values[a] <= values[b] {
                            a
                        } else {
                            b
                        }
                    })
                    .collect();
                prev = next;
                width *= 2;
            }
        }
        Self { table }
    }

    /// Argmin of `values[lo..=hi]`.
    fn query(&self, values: &[usize], lo: usize, hi: usize) -> usize {
        if lo == hi {
            return lo;
        }
        let span = hi - lo + 1;
        // largest k with 2^k <= span; rows start at window width 2
        let k = usize::BITS as usize - 1 - span.leading_zeros() as usize;
        let row = &self.table[k - 1];
        let half = 1usize << k;
        let a = row[lo];
        let b = row[hi + 1 - half];
        if values[a] <= values[b] {
            a
        } else {
            b
        }
    }
}

// ---------------------------------------------------------------------------
// Full sparse-table oracle
// ---------------------------------------------------------------------------

/// Exportable state of [`LcaSparseTable`]: plain arrays only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcaSparseTableState {
    pub tour: Vec<usize>,
    pub depth: Vec<usize>,
    pub first_visit: Vec<usize>,
    pub sparse_table: Vec<Vec<usize>>,
}

/// O(1) LCA oracle backed by a full sparse table.
#[derive(Debug, Clone)]
pub struct LcaSparseTable {
    tour: EulerTour,
    rmq: RmqSparseTable,
}

impl LcaSparseTable {
    /// Preprocess a tree. The tree only needs to outlive this call.
    pub fn new(tree: &Tree) -> Self {
        let tour = euler_tour(tree);
        let rmq = RmqSparseTable::build(&tour.depth);
        Self { tour, rmq }
    }

    /// Number of tree nodes the oracle was built for.
    pub fn num_elements(&self) -> usize {
        self.tour.first_visit.len()
    }

    /// Lowest common ancestor of `u` and `v`.
    pub fn lca(&self, u: usize, v: usize) -> Result<usize> {
        let n = self.num_elements();
        for x in [u, v] {
            if x >= n {
                return Err(HisegError::OutOfRange { index: x, bound: n });
            }
        }
        let (mut lo, mut hi) = (self.tour.first_visit[u], self.tour.first_visit[v]);
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let pos = self.rmq.query(&self.tour.depth, lo, hi);
        Ok(self.tour.tour[pos])
    }

    /// Elementwise LCA of two equally long vertex sequences.
    pub fn lca_pairs(&self, us: &[usize], vs: &[usize]) -> Result<Vec<usize>> {
        if us.len() != vs.len() {
            return Err(HisegError::InvalidShape(
                "vertex sequences must have the same length".into(),
            ));
        }
        us.iter().zip(vs).map(|(&u, &v)| self.lca(u, v)).collect()
    }

    /// LCA of each `(source, target)` pair of an edge iterator.
    pub fn lca_edges<I>(&self, edges: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        edges.into_iter().map(|(u, v)| self.lca(u, v)).collect()
    }

    /// Export the preprocessed arrays.
    pub fn state(&self) -> LcaSparseTableState {
        LcaSparseTableState {
            tour: self.tour.tour.clone(),
            depth: self.tour.depth.clone(),
            first_visit: self.tour.first_visit.clone(),
            sparse_table: self.rmq.table.clone(),
        }
    }

    /// Rebuild an oracle from exported state, without re-touring a tree.
    pub fn from_state(state: LcaSparseTableState) -> Result<Self> {
        if state.tour.len() != state.depth.len()
            || state.tour.len() + 1 != 2 * state.first_visit.len()
        {
            return Err(HisegError::InvalidShape(
                "inconsistent LCA state arrays".into(),
            ));
        }
        Ok(Self {
            tour: EulerTour {
                tour: state.tour,
                depth: state.depth,
                first_visit: state.first_visit,
            },
            rmq: RmqSparseTable {
                table: state.sparse_table,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Block-decomposed oracle
// ---------------------------------------------------------------------------

/// Exportable state of [`LcaSparseTableBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcaSparseTableBlockState {
    pub tour: Vec<usize>,
    pub depth: Vec<usize>,
    pub first_visit: Vec<usize>,
    pub block_size: usize,
    pub block_min_position: Vec<usize>,
    pub block_prefix_min: Vec<usize>,
    pub block_suffix_min: Vec<usize>,
    pub sparse_table: Vec<Vec<usize>>,
}

/// O(block size) LCA oracle with linear preprocessing.
#[derive(Debug, Clone)]
pub struct LcaSparseTableBlock {
    tour: EulerTour,
    block_size: usize,
    /// Tour position of the minimum of each block.
    block_min_position: Vec<usize>,
    /// Tour position of the minimum of `block[.. i + 1]`.
    block_prefix_min: Vec<usize>,
    /// Tour position of the minimum of `block[i ..]`.
    block_suffix_min: Vec<usize>,
    /// Sparse table over the block minima.
    rmq: RmqSparseTable,
    /// Depth of each block minimum, the sequence the sparse table indexes.
    block_min_depth: Vec<usize>,
}

/// Default block size of [`LcaSparseTableBlock::new`].
pub const DEFAULT_LCA_BLOCK_SIZE: usize = 1024;

impl LcaSparseTableBlock {
    /// Preprocess with the default block size.
    pub fn new(tree: &Tree) -> Self {
        Self::with_block_size(tree, DEFAULT_LCA_BLOCK_SIZE)
    }

    /// Preprocess with an explicit block size.
    ///
    /// # Panics
    /// Panics if `block_size` is zero.
    pub fn with_block_size(tree: &Tree, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        let tour = euler_tour(tree);
        Self::from_tour(tour, block_size)
    }

    fn from_tour(tour: EulerTour, block_size: usize) -> Self {
        let depth = &tour.depth;
        let m = depth.len();
        let num_blocks = m.div_ceil(block_size);

        let mut block_min_position = Vec::with_capacity(num_blocks);
        let mut block_prefix_min = vec![0; m];
        let mut block_suffix_min = vec![0; m];

        for b in 0..num_blocks {
            let lo = b * block_size;
            let hi = (lo + block_size).min(m);
            let mut best = lo;
            for i in lo..hi {
                if depth[i] < depth[best] {
                    best = i;
                }
                block_prefix_min[i] = best;
            }
            block_min_position.push(best);
            let mut best = hi - 1;
            for i in (lo..hi).rev() {
                if depth[i] <= depth[best] {
                    best = i;
                }
                block_suffix_min[i] = best;
            }
        }

        let block_min_depth: Vec<usize> =
            block_min_position.iter().map(|&p| depth[p]).collect();
        let rmq = RmqSparseTable::build(&block_min_depth);

        Self {
            tour,
            block_size,
            block_min_position,
            block_prefix_min,
            block_suffix_min,
            rmq,
            block_min_depth,
        }
    }

    /// Number of tree nodes the oracle was built for.
    pub fn num_elements(&self) -> usize {
        self.tour.first_visit.len()
    }

    /// Lowest common ancestor of `u` and `v`.
    pub fn lca(&self, u: usize, v: usize) -> Result<usize> {
        let n = self.num_elements();
        for x in [u, v] {
            if x >= n {
                return Err(HisegError::OutOfRange { index: x, bound: n });
            }
        }
        let depth = &self.tour.depth;
        let (mut lo, mut hi) = (self.tour.first_visit[u], self.tour.first_visit[v]);
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let block_lo = lo / self.block_size;
        let block_hi = hi / self.block_size;

        let pos = if block_lo == block_hi {
            // block-internal query: linear scan
            let mut best = lo;
            for i in lo..=hi {
                if depth[i] < depth[best] {
                    best = i;
                }
            }
            best
        } else {
            let mut best = self.block_suffix_min[lo];
            let tail = self.block_prefix_min[hi];
            if depth[tail] < depth[best] {
                best = tail;
            }
            if block_lo + 1 <= block_hi - 1 {
                let mid = self
                    .rmq
                    .query(&self.block_min_depth, block_lo + 1, block_hi - 1);
                let mid_pos = self.block_min_position[mid];
                if depth[mid_pos] < depth[best] {
                    best = mid_pos;
                }
            }
            best
        };
        Ok(self.tour.tour[pos])
    }

    /// Elementwise LCA of two equally long vertex sequences.
    pub fn lca_pairs(&self, us: &[usize], vs: &[usize]) -> Result<Vec<usize>> {
        if us.len() != vs.len() {
            return Err(HisegError::InvalidShape(
                "vertex sequences must have the same length".into(),
            ));
        }
        us.iter().zip(vs).map(|(&u, &v)| self.lca(u, v)).collect()
    }

    /// LCA of each `(source, target)` pair of an edge iterator.
    pub fn lca_edges<I>(&self, edges: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        edges.into_iter().map(|(u, v)| self.lca(u, v)).collect()
    }

    /// Export the preprocessed arrays.
    pub fn state(&self) -> LcaSparseTableBlockState {
        LcaSparseTableBlockState {
            tour: self.tour.tour.clone(),
            depth: self.tour.depth.clone(),
            first_visit: self.tour.first_visit.clone(),
            block_size: self.block_size,
            block_min_position: self.block_min_position.clone(),
            block_prefix_min: self.block_prefix_min.clone(),
            block_suffix_min: self.block_suffix_min.clone(),
            sparse_table: self.rmq.table.clone(),
        }
    }

    /// Rebuild an oracle from exported state.
    pub fn from_state(state: LcaSparseTableBlockState) -> Result<Self> {
        if state.tour.len() != state.depth.len()
            || state.tour.len() + 1 != 2 * state.first_visit.len()
            || state.block_size == 0
        {
            return Err(HisegError::InvalidShape(
                "inconsistent LCA state arrays".into(),
            ));
        }
        let block_min_depth: Vec<usize> = state
            .block_min_position
            .iter()
            .map(|&p| state.depth[p])
            .collect();
        Ok(Self {
            tour: EulerTour {
                tour: state.tour,
                depth: state.depth,
                first_visit: state.first_visit,
            },
            block_size: state.block_size,
            block_min_position: state.block_min_position,
            block_prefix_min: state.block_prefix_min,
            block_suffix_min: state.block_suffix_min,
            rmq: RmqSparseTable {
                table: state.sparse_table,
            },
            block_min_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap()
    }

    #[test]
    fn test_sparse_table_pairs() {
        let t = sample();
        let lca = LcaSparseTable::new(&t);
        assert_eq!(lca.lca(0, 1).unwrap(), 5);
        assert_eq!(lca.lca(2, 4).unwrap(), 6);
        assert_eq!(lca.lca(0, 2).unwrap(), 7);
        assert_eq!(lca.lca(3, 3).unwrap(), 3);
        assert_eq!(lca.lca(1, 0).unwrap(), 5);
    }

    #[test]
    fn test_block_variants_match_naive() {
        let t = sample();
        let full = LcaSparseTable::new(&t);
        for block_size in [1, 2, 3, 5, 1024] {
            let block = LcaSparseTableBlock::with_block_size(&t, block_size);
            for u in 0..t.num_nodes() {
                for v in 0..t.num_nodes() {
                    let expected = t.lowest_common_ancestor(u, v);
                    assert_eq!(full.lca(u, v).unwrap(), expected);
                    assert_eq!(block.lca(u, v).unwrap(), expected, "block size {}", block_size);
                }
            }
        }
    }

    #[test]
    fn test_vectorized_queries() {
        let t = sample();
        let lca = LcaSparseTable::new(&t);
        let res = lca.lca_pairs(&[0, 2, 0], &[1, 4, 2]).unwrap();
        assert_eq!(res, vec![5, 6, 7]);
        let res = lca.lca_edges(vec![(0, 1), (3, 4)]).unwrap();
        assert_eq!(res, vec![5, 6]);
    }

    #[test]
    fn test_out_of_range() {
        let t = sample();
        let lca = LcaSparseTable::new(&t);
        assert!(matches!(
            lca.lca(0, 42),
            Err(HisegError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_state_round_trip() {
        let t = sample();
        let lca = LcaSparseTable::new(&t);
        let rebuilt = LcaSparseTable::from_state(lca.state()).unwrap();
        assert_eq!(rebuilt.lca(0, 2).unwrap(), 7);

        let block = LcaSparseTableBlock::with_block_size(&t, 3);
        let rebuilt = LcaSparseTableBlock::from_state(block.state()).unwrap();
        for u in 0..t.num_nodes() {
            for v in 0..t.num_nodes() {
                assert_eq!(
                    rebuilt.lca(u, v).unwrap(),
                    t.lowest_common_ancestor(u, v)
                );
            }
        }
    }
}
