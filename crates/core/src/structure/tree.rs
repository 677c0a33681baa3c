//! Static tree stored as a parents array.
//!
//! Nodes are numbered so that leaves form the prefix `[0, num_leaves)`
//! and every non-root node comes before its parent (`parent(i) > i`);
//! the root is the last node and is its own parent. This topological
//! numbering is what lets the hierarchy algorithms run leaves-to-root or
//! root-to-leaves with plain index loops.
//!
//! Children lists are not kept up front: call [`Tree::compute_children`]
//! once before using [`Tree::num_children`] / [`Tree::child`] /
//! [`Tree::children`]. The computation is idempotent and the index can be
//! dropped again with [`Tree::clear_children`] to reclaim memory.

use crate::error::{HisegError, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// What the nodes of a tree represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeCategory {
    /// Leaves are base vertices, internal nodes are merges.
    PartitionTree,
    /// Any node may correspond to a region (tree of shapes, max-tree...).
    ComponentTree,
}

/// CSR-style children index: `children_flat[first_child[i]..first_child[i + 1]]`
/// are the children of node `i`, in increasing order.
#[derive(Debug, Clone)]
struct ChildrenIndex {
    first_child: Vec<usize>,
    children_flat: Vec<usize>,
}

/// A static, topologically sorted tree.
#[derive(Debug, Clone)]
pub struct Tree {
    parents: Vec<usize>,
    num_leaves: usize,
    category: TreeCategory,
    children: OnceLock<ChildrenIndex>,
}

impl Tree {
    /// Build a partition tree from a parents array, validating it.
    pub fn new(parents: Vec<usize>) -> Result<Self> {
        Self::with_category(parents, TreeCategory::PartitionTree)
    }

    /// Build a tree of the given category from a parents array.
    ///
    /// Fails with [`HisegError::MalformedTree`] when the array is not
    /// topologically sorted, has no or several roots, or when the leaves
    /// do not form a prefix of the numbering.
    pub fn with_category(parents: Vec<usize>, category: TreeCategory) -> Result<Self> {
        let n = parents.len();
        if n == 0 {
            return Err(HisegError::MalformedTree("empty parents array".into()));
        }
        let root = n - 1;
        if parents[root] != root {
            return Err(HisegError::MalformedTree(
                "last node must be its own parent".into(),
            ));
        }
        let mut has_child = vec![false; n];
        for (i, &p) in parents.iter().enumerate() {
            if p >= n {
                return Err(HisegError::MalformedTree(format!(
                    "parent {} of node {} out of bounds",
                    p, i
                )));
            }
            if i != root {
                if p <= i {
                    return Err(HisegError::MalformedTree(format!(
                        "node {} has parent {} <= itself",
                        i, p
                    )));
                }
                has_child[p] = true;
            }
        }
        // leaves must be exactly the prefix of childless nodes
        let num_leaves = has_child.iter().take_while(|&&c| !c).count();
        if has_child[num_leaves..].iter().any(|&c| !c) {
            return Err(HisegError::MalformedTree(
                "leaves must form a contiguous prefix".into(),
            ));
        }
        if num_leaves == 0 {
            return Err(HisegError::MalformedTree("tree has no leaf".into()));
        }
        Ok(Self {
            parents,
            num_leaves,
            category,
            children: OnceLock::new(),
        })
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.parents.len()
    }

    /// Number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Number of tree edges (`num_nodes - 1`); edge `i` joins `i` to
    /// `parent(i)` for every non-root `i`.
    pub fn num_edges(&self) -> usize {
        self.parents.len() - 1
    }

    /// The root node (`num_nodes - 1`).
    pub fn root(&self) -> usize {
        self.parents.len() - 1
    }

    /// Parent of `i` (the root is its own parent).
    pub fn parent(&self, i: usize) -> usize {
        self.parents[i]
    }

    /// Whether `i` is a leaf.
    pub fn is_leaf(&self, i: usize) -> bool {
        i < self.num_leaves
    }

    /// The tree category.
    pub fn category(&self) -> TreeCategory {
        self.category
    }

    /// The underlying parents array.
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    /// Build the CSR children index. Idempotent.
    ///
    /// Two passes over the parents array: child counting, then bucket
    /// fill in increasing node order.
    pub fn compute_children(&self) {
        self.children.get_or_init(|| {
            let n = self.parents.len();
            let root = self.root();
            let mut first_child = vec![0usize; n + 1];
            for (i, &p) in self.parents.iter().enumerate() {
                if i != root {
                    first_child[p + 1] += 1;
                }
            }
            for i in 0..n {
                first_child[i + 1] += first_child[i];
            }
            let mut cursor = first_child.clone();
            let mut children_flat = vec![0usize; n - 1];
            for (i, &p) in self.parents.iter().enumerate() {
                if i != root {
                    children_flat[cursor[p]] = i;
                    cursor[p] += 1;
                }
            }
            ChildrenIndex {
                first_child,
                children_flat,
            }
        });
    }

    /// Drop the children index to reclaim memory.
    pub fn clear_children(&mut self) {
        self.children = OnceLock::new();
    }

    fn children_index(&self) -> Result<&ChildrenIndex> {
        self.children.get().ok_or_else(|| {
            HisegError::PreconditionFailed(
                "children queried before compute_children".into(),
            )
        })
    }

    /// Number of children of `i`. Requires [`Tree::compute_children`].
    pub fn num_children(&self, i: usize) -> Result<usize> {
        let idx = self.children_index()?;
        Ok(idx.first_child[i + 1] - idx.first_child[i])
    }

    /// `k`-th child of `i`. Requires [`Tree::compute_children`].
    pub fn child(&self, k: usize, i: usize) -> Result<usize> {
        let idx = self.children_index()?;
        let lo = idx.first_child[i];
        let hi = idx.first_child[i + 1];
        if lo + k >= hi {
            return Err(HisegError::OutOfRange {
                index: k,
                bound: hi - lo,
            });
        }
        Ok(idx.children_flat[lo + k])
    }

    /// Children of `i`, in increasing order. Requires
    /// [`Tree::compute_children`].
    pub fn children(&self, i: usize) -> Result<&[usize]> {
        let idx = self.children_index()?;
        Ok(&idx.children_flat[idx.first_child[i]..idx.first_child[i + 1]])
    }

    /// Node indices from the leaves to the root.
    pub fn leaves_to_root(
        &self,
        include_leaves: bool,
        include_root: bool,
    ) -> impl DoubleEndedIterator<Item = usize> {
        let start = if include_leaves { 0 } else { self.num_leaves };
        let end = if include_root {
            self.num_nodes()
        } else {
            self.num_nodes() - 1
        };
        start..end
    }

    /// Node indices from the root down to the leaves.
    pub fn root_to_leaves(
        &self,
        include_leaves: bool,
        include_root: bool,
    ) -> impl DoubleEndedIterator<Item = usize> {
        self.leaves_to_root(include_leaves, include_root).rev()
    }

    /// Leaf indices.
    pub fn leaves(&self) -> impl Iterator<Item = usize> {
        0..self.num_leaves
    }

    /// `i`, `parent(i)`, ..., root.
    pub fn ancestors(&self, i: usize) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: Some(i),
        }
    }

    /// Lowest common ancestor by walking both ancestor chains.
    ///
    /// O(height); use [`crate::structure::lca`] for repeated queries.
    pub fn lowest_common_ancestor(&self, u: usize, v: usize) -> usize {
        let (mut a, mut b) = (u, v);
        // the smaller index is always the deeper one or a sibling branch
        while a != b {
            if a < b {
                a = self.parents[a];
            } else {
                b = self.parents[b];
            }
        }
        a
    }
}

/// Iterator over a node's ancestor chain, the node itself included.
pub struct AncestorIter<'a> {
    tree: &'a Tree,
    current: Option<usize>,
}

impl Iterator for AncestorIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let i = self.current?;
        let p = self.tree.parent(i);
        self.current = if p == i { None } else { Some(p) };
        Some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        // three leaves pairs under 5/6, root 7
        Tree::new(vec![5, 5, 6, 6, 6, 7, 7, 7]).unwrap()
    }

    #[test]
    fn test_basic_queries() {
        let t = sample();
        assert_eq!(t.num_nodes(), 8);
        assert_eq!(t.num_leaves(), 5);
        assert_eq!(t.root(), 7);
        assert!(t.is_leaf(4));
        assert!(!t.is_leaf(5));
        assert_eq!(t.parent(2), 6);
        assert_eq!(t.parent(t.root()), t.root());
    }

    #[test]
    fn test_children_index() {
        let t = sample();
        t.compute_children();
        assert_eq!(t.num_children(5).unwrap(), 2);
        assert_eq!(t.num_children(6).unwrap(), 3);
        assert_eq!(t.children(6).unwrap(), &[2, 3, 4]);
        assert_eq!(t.child(1, 5).unwrap(), 1);
        assert_eq!(t.num_children(0).unwrap(), 0);
    }

    #[test]
    fn test_children_requires_compute() {
        let t = sample();
        assert!(matches!(
            t.num_children(5),
            Err(HisegError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_iterators() {
        let t = sample();
        let all: Vec<usize> = t.leaves_to_root(true, true).collect();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let inner: Vec<usize> = t.leaves_to_root(false, false).collect();
        assert_eq!(inner, vec![5, 6]);
        let down: Vec<usize> = t.root_to_leaves(false, true).collect();
        assert_eq!(down, vec![7, 6, 5]);
    }

    #[test]
    fn test_ancestors() {
        let t = sample();
        let chain: Vec<usize> = t.ancestors(0).collect();
        assert_eq!(chain, vec![0, 5, 7]);
        let root_chain: Vec<usize> = t.ancestors(7).collect();
        assert_eq!(root_chain, vec![7]);
    }

    #[test]
    fn test_naive_lca() {
        let t = sample();
        assert_eq!(t.lowest_common_ancestor(0, 1), 5);
        assert_eq!(t.lowest_common_ancestor(2, 4), 6);
        assert_eq!(t.lowest_common_ancestor(0, 2), 7);
        assert_eq!(t.lowest_common_ancestor(3, 3), 3);
    }

    #[test]
    fn test_malformed_trees() {
        // not topologically sorted
        assert!(matches!(
            Tree::new(vec![1, 0, 2]),
            Err(HisegError::MalformedTree(_))
        ));
        // two roots
        assert!(matches!(
            Tree::new(vec![2, 2, 2, 3]),
            Err(HisegError::MalformedTree(_))
        ));
        // leaves not a prefix is impossible with sorted parents, but a
        // childless internal node between parents is
        assert!(matches!(
            Tree::new(vec![2, 2, 4, 4, 4]),
            Err(HisegError::MalformedTree(_))
        ));
    }
}
