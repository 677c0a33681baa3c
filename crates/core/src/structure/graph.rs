//! Undirected graph with stable edge indices.
//!
//! Vertices are `0..num_vertices()`. Each edge is stored at the index of
//! its insertion and that index never changes: removing an edge leaves a
//! tombstone (both endpoints set to [`INVALID_INDEX`]) and the slot is
//! never reused. Every vertex keeps the ordered list of its incident
//! edge indices, so enumeration orders are reproducible.

use crate::error::{HisegError, Result};
use crate::INVALID_INDEX;

/// An undirected, edge-indexed graph.
#[derive(Debug, Clone, Default)]
pub struct UndirectedGraph {
    /// Edge endpoints; a removed edge holds `(INVALID_INDEX, INVALID_INDEX)`.
    edges: Vec<(usize, usize)>,
    /// Incident edge indices per vertex, in insertion order.
    incidence: Vec<Vec<usize>>,
    /// Number of live (non-tombstone) edges.
    num_live_edges: usize,
}

impl UndirectedGraph {
    /// Create a graph with `n` vertices and no edges.
    pub fn new(n: usize) -> Self {
        Self {
            edges: Vec::new(),
            incidence: vec![Vec::new(); n],
            num_live_edges: 0,
        }
    }

    /// Create a graph with pre-allocated edge capacity.
    pub fn with_capacity(n: usize, edge_capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(edge_capacity),
            incidence: vec![Vec::new(); n],
            num_live_edges: 0,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.incidence.len()
    }

    /// Number of edge slots, tombstones included.
    ///
    /// Edge indices range over `0..num_edges()`; use [`edge`] to tell a
    /// live edge from a tombstone.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of live edges.
    pub fn num_live_edges(&self) -> usize {
        self.num_live_edges
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self) -> usize {
        self.incidence.push(Vec::new());
        self.incidence.len() - 1
    }

    /// Insert the edge `{u, v}` and return its index.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<usize> {
        let n = self.num_vertices();
        if u >= n {
            return Err(HisegError::OutOfRange { index: u, bound: n });
        }
        if v >= n {
            return Err(HisegError::OutOfRange { index: v, bound: n });
        }
        let ei = self.edges.len();
        self.edges.push((u, v));
        self.incidence[u].push(ei);
        if v != u {
            self.incidence[v].push(ei);
        }
        self.num_live_edges += 1;
        Ok(ei)
    }

    /// Endpoints of edge `ei`, or `None` for a tombstone.
    pub fn edge(&self, ei: usize) -> Option<(usize, usize)> {
        match self.edges.get(ei) {
            Some(&(u, v)) if u != INVALID_INDEX => Some((u, v)),
            _ => None,
        }
    }

    /// Source endpoint of edge `ei` (`INVALID_INDEX` for a tombstone).
    pub fn source(&self, ei: usize) -> usize {
        self.edges[ei].0
    }

    /// Target endpoint of edge `ei` (`INVALID_INDEX` for a tombstone).
    pub fn target(&self, ei: usize) -> usize {
        self.edges[ei].1
    }

    /// The endpoint of edge `ei` that is not `v`.
    pub fn other_vertex(&self, ei: usize, v: usize) -> usize {
        let (s, t) = self.edges[ei];
        if s == v {
            t
        } else {
            s
        }
    }

    /// Remove edge `ei`, leaving a tombstone at its index.
    pub fn remove_edge(&mut self, ei: usize) {
        let (u, v) = self.edges[ei];
        if u == INVALID_INDEX {
            return;
        }
        self.incidence[u].retain(|&e| e != ei);
        if v != u {
            self.incidence[v].retain(|&e| e != ei);
        }
        self.edges[ei] = (INVALID_INDEX, INVALID_INDEX);
        self.num_live_edges -= 1;
    }

    /// Degree of `v` (undirected: in-, out-, and total degree coincide).
    pub fn degree(&self, v: usize) -> usize {
        self.incidence[v].len()
    }

    /// Ordered incident edge indices of `v`.
    pub fn out_edges(&self, v: usize) -> &[usize] {
        &self.incidence[v]
    }

    /// Iterator over the neighbours of `v`, in incidence order.
    pub fn adjacent_vertices<'a>(&'a self, v: usize) -> impl Iterator<Item = usize> + 'a {
        self.incidence[v].iter().map(move |&ei| self.other_vertex(ei, v))
    }

    /// Iterator over live edges as `(index, source, target)`.
    pub fn edge_iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, &(u, _))| u != INVALID_INDEX)
            .map(|(i, &(u, v))| (i, u, v))
    }
}
