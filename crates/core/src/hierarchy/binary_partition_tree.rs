//! Generic binary partition tree: a heap-driven merge loop with a
//! pluggable linkage.
//!
//! The builder repeatedly pops the cheapest active edge, merges its two
//! regions into a new node, and asks the [`LinkageStrategy`] to weight
//! the edges from the merged region to each of its neighbours. The
//! neighbour records passed to the callback are a borrowed view into a
//! buffer owned by the builder; implementations must not retain them
//! across calls.
//!
//! Heap keys are popped in non-decreasing order; the pop order of equal
//! keys is implementation defined, so trees built from graphs with
//! equal-weight edges may differ across implementations.

use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::hierarchy::core::NodeWeightedTree;
use crate::structure::fibonacci_heap::FibonacciHeap;
use crate::structure::graph::UndirectedGraph;
use crate::structure::tree::{Tree, TreeCategory};
use crate::INVALID_INDEX;
use indexmap::IndexMap;

// ---------------------------------------------------------------------------
// Heap element
// ---------------------------------------------------------------------------

/// An edge candidate ordered by weight.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapElement {
    weight: f64,
    edge_index: usize,
}

impl PartialOrd for HeapElement {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.weight.partial_cmp(&other.weight)
    }
}

// ---------------------------------------------------------------------------
// Linkage interface
// ---------------------------------------------------------------------------

/// A neighbour of a freshly merged region.
///
/// Describes the one or two former edges joining the merged nodes to
/// the neighbour, and the new edge replacing them. The linkage writes
/// the weight of the new edge through [`NewNeighbour::set_new_edge_weight`].
#[derive(Debug, Clone)]
pub struct NewNeighbour {
    num_edges: usize,
    first_edge_index: usize,
    second_edge_index: usize,
    neighbour_vertex: usize,
    new_edge_index: usize,
    new_edge_weight: f64,
}

impl NewNeighbour {
    /// Number of former edges towards this neighbour (1 or 2).
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Edge joining the first merged node to the neighbour.
    pub fn first_edge_index(&self) -> usize {
        self.first_edge_index
    }

    /// Edge joining the second merged node to the neighbour
    /// ([`INVALID_INDEX`] when `num_edges() < 2`).
    pub fn second_edge_index(&self) -> usize {
        self.second_edge_index
    }

    /// The neighbour region.
    pub fn neighbour_vertex(&self) -> usize {
        self.neighbour_vertex
    }

    /// Index of the edge joining the merged region to the neighbour.
    pub fn new_edge_index(&self) -> usize {
        self.new_edge_index
    }

    /// Weight assigned to the new edge so far.
    pub fn new_edge_weight(&self) -> f64 {
        self.new_edge_weight
    }

    /// Assign the weight of the new edge.
    pub fn set_new_edge_weight(&mut self, weight: f64) {
        self.new_edge_weight = weight;
    }
}

/// Everything a linkage sees about one merge step.
#[derive(Debug)]
pub struct MergeContext<'a> {
    /// The working graph, with the merged region already added.
    pub graph: &'a UndirectedGraph,
    /// The popped edge that triggered the merge.
    pub fusion_edge_index: usize,
    /// Node id of the merged region.
    pub new_region: usize,
    /// First merged node.
    pub merged_region1: usize,
    /// Second merged node.
    pub merged_region2: usize,
}

/// Distance update rule of the generic binary partition tree.
pub trait LinkageStrategy {
    /// Weight the edges from the merged region to its neighbours by
    /// writing `new_edge_weight` on every record.
    fn on_merge(&mut self, ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]);
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build a binary partition tree with the given linkage.
///
/// `edge_weights` are the initial heap keys; the altitude of each
/// internal node is the weight of the popped fusion edge.
pub fn binary_partition_tree<L: LinkageStrategy>(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
    linkage: &mut L,
) -> Result<NodeWeightedTree> {
    if edge_weights.len() != graph.num_edges() {
        return Err(HisegError::InvalidShape(
            "edge weights do not match the number of edges".into(),
        ));
    }
    let n = graph.num_vertices();
    if n == 0 {
        return Err(HisegError::InvalidShape("empty graph".into()));
    }
    let num_nodes_final = 2 * n - 1;

    let mut g = graph.clone();
    let mut weights = edge_weights.to_vec();
    let mut active = vec![false; g.num_edges()];
    let mut parents: Vec<usize> = (0..num_nodes_final).collect();
    let mut altitudes = vec![0.0; num_nodes_final];
    let mut heap: FibonacciHeap<HeapElement> = FibonacciHeap::new();

    // seed the heap with the cheapest outgoing edge of every vertex
    for v in 0..n {
        let mut best = INVALID_INDEX;
        for &ei in g.out_edges(v) {
            if best == INVALID_INDEX || weights[ei] < weights[best] {
                best = ei;
            }
        }
        if best != INVALID_INDEX && !active[best] {
            active[best] = true;
            heap.push(HeapElement {
                weight: weights[best],
                edge_index: best,
            });
        }
    }

    let mut num_nodes = n;
    let mut records: Vec<NewNeighbour> = Vec::new();

    while num_nodes < num_nodes_final {
        let element = match heap.pop() {
            Some(e) => e,
            None => return Err(HisegError::Disconnected),
        };
        if !active[element.edge_index] {
            continue;
        }
        let fusion_edge = element.edge_index;
        let (region1, region2) = g
            .edge(fusion_edge)
            .expect("active edges are present in the working graph");

        let new_region = g.add_vertex();
        parents[region1] = new_region;
        parents[region2] = new_region;
        altitudes[new_region] = element.weight;
        num_nodes += 1;

        active[fusion_edge] = false;
        g.remove_edge(fusion_edge);

        // collect the distinct neighbours of the merged pair, keeping
        // the encounter order deterministic
        let mut neighbours: IndexMap<usize, (usize, usize)> = IndexMap::new();
        for region in [region1, region2] {
            for &ei in g.out_edges(region) {
                let nv = g.other_vertex(ei, region);
                if nv == region1 || nv == region2 {
                    continue;
                }
                let entry = neighbours.entry(nv).or_insert((ei, INVALID_INDEX));
                if entry.0 != ei {
                    entry.1 = ei;
                }
            }
        }

        records.clear();
        for (&nv, &(first, second)) in &neighbours {
            active[first] = false;
            g.remove_edge(first);
            if second != INVALID_INDEX {
                active[second] = false;
                g.remove_edge(second);
            }
            let new_edge_index = g.add_edge(new_region, nv)?;
            weights.push(0.0);
            active.push(false);
            records.push(NewNeighbour {
                num_edges: if second == INVALID_INDEX { 1 } else { 2 },
                first_edge_index: first,
                second_edge_index: second,
                neighbour_vertex: nv,
                new_edge_index,
                new_edge_weight: 0.0,
            });
        }
        // stray parallel edges between the merged pair are consumed too
        let inner: Vec<usize> = g.out_edges(region1).to_vec();
        for ei in inner {
            active[ei] = false;
            g.remove_edge(ei);
        }

        let ctx = MergeContext {
            graph: &g,
            fusion_edge_index: fusion_edge,
            new_region,
            merged_region1: region1,
            merged_region2: region2,
        };
        linkage.on_merge(&ctx, &mut records);

        // commit weights and push the cheapest edge of the new region
        let mut best = INVALID_INDEX;
        for record in &records {
            weights[record.new_edge_index] = record.new_edge_weight;
            if best == INVALID_INDEX
                || record.new_edge_weight < weights[best]
            {
                best = record.new_edge_index;
            }
        }
        if best != INVALID_INDEX {
            active[best] = true;
            heap.push(HeapElement {
                weight: weights[best],
                edge_index: best,
            });
        }
    }

    Ok(NodeWeightedTree {
        tree: Tree::with_category(parents, TreeCategory::PartitionTree)?,
        altitudes,
    })
}

// ---------------------------------------------------------------------------
// Built-in linkages
// ---------------------------------------------------------------------------

/// Single linkage: the new edge weight is the minimum of the consumed
/// parallel edges. Equivalent to the canonical BPT ordering.
#[derive(Debug, Default)]
pub struct MinLinkage {
    weights: Vec<f64>,
}

impl MinLinkage {
    pub fn new(edge_weights: &[f64]) -> Self {
        Self {
            weights: edge_weights.to_vec(),
        }
    }
}

impl LinkageStrategy for MinLinkage {
    fn on_merge(&mut self, _ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]) {
        for record in new_neighbours {
            let mut w = self.weights[record.first_edge_index()];
            if record.num_edges() == 2 {
                w = w.min(self.weights[record.second_edge_index()]);
            }
            record.set_new_edge_weight(w);
            grow_set(&mut self.weights, record.new_edge_index(), w);
        }
    }
}

/// Complete linkage: the new edge weight is the maximum of the consumed
/// parallel edges.
#[derive(Debug, Default)]
pub struct MaxLinkage {
    weights: Vec<f64>,
}

impl MaxLinkage {
    pub fn new(edge_weights: &[f64]) -> Self {
        Self {
            weights: edge_weights.to_vec(),
        }
    }
}

impl LinkageStrategy for MaxLinkage {
    fn on_merge(&mut self, _ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]) {
        for record in new_neighbours {
            let mut w = self.weights[record.first_edge_index()];
            if record.num_edges() == 2 {
                w = w.max(self.weights[record.second_edge_index()]);
            }
            record.set_new_edge_weight(w);
            grow_set(&mut self.weights, record.new_edge_index(), w);
        }
    }
}

/// Average linkage: each edge carries a value and a weight (count); two
/// parallel edges combine into their weighted mean.
#[derive(Debug, Default)]
pub struct AverageLinkage {
    values: Vec<f64>,
    counts: Vec<f64>,
}

impl AverageLinkage {
    pub fn new(edge_values: &[f64], edge_weights: &[f64]) -> Self {
        Self {
            values: edge_values.to_vec(),
            counts: edge_weights.to_vec(),
        }
    }
}

impl LinkageStrategy for AverageLinkage {
    fn on_merge(&mut self, _ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]) {
        for record in new_neighbours {
            let (value, count) = if record.num_edges() == 2 {
                let (v1, c1) = (
                    self.values[record.first_edge_index()],
                    self.counts[record.first_edge_index()],
                );
                let (v2, c2) = (
                    self.values[record.second_edge_index()],
                    self.counts[record.second_edge_index()],
                );
                ((v1 * c1 + v2 * c2) / (c1 + c2), c1 + c2)
            } else {
                (
                    self.values[record.first_edge_index()],
                    self.counts[record.first_edge_index()],
                )
            };
            record.set_new_edge_weight(value);
            grow_set(&mut self.values, record.new_edge_index(), value);
            grow_set(&mut self.counts, record.new_edge_index(), count);
        }
    }
}

/// Exponential linkage: the average-linkage rule with each edge's count
/// damped by `exp(-alpha * value)`.
#[derive(Debug)]
pub struct ExponentialLinkage {
    alpha: f64,
    values: Vec<f64>,
    counts: Vec<f64>,
}

impl ExponentialLinkage {
    pub fn new(edge_values: &[f64], alpha: f64, edge_weights: &[f64]) -> Self {
        Self {
            alpha,
            values: edge_values.to_vec(),
            counts: edge_weights.to_vec(),
        }
    }
}

impl LinkageStrategy for ExponentialLinkage {
    fn on_merge(&mut self, _ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]) {
        for record in new_neighbours {
            let (value, count) = if record.num_edges() == 2 {
                let (v1, c1) = (
                    self.values[record.first_edge_index()],
                    self.counts[record.first_edge_index()],
                );
                let (v2, c2) = (
                    self.values[record.second_edge_index()],
                    self.counts[record.second_edge_index()],
                );
                let w1 = c1 * (-self.alpha * v1).exp();
                let w2 = c2 * (-self.alpha * v2).exp();
                ((v1 * w1 + v2 * w2) / (w1 + w2), c1 + c2)
            } else {
                (
                    self.values[record.first_edge_index()],
                    self.counts[record.first_edge_index()],
                )
            };
            record.set_new_edge_weight(value);
            grow_set(&mut self.values, record.new_edge_index(), value);
            grow_set(&mut self.counts, record.new_edge_index(), count);
        }
    }
}

/// What to do with an altitude smaller than one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeCorrection {
    /// Replace the offending altitude by the maximum of its children.
    Max,
    /// Leave altitudes as produced by the merge order.
    None,
}

/// Ward linkage over vertex centroids: the distance between two regions
/// is the increase of within-cluster variance caused by merging them.
#[derive(Debug)]
pub struct WardLinkage {
    centroids: DataArray,
    sizes: Vec<f64>,
}

impl WardLinkage {
    /// One centroid row and one size per graph vertex; storage grows as
    /// regions merge.
    pub fn new(vertex_centroids: &DataArray, vertex_sizes: &[f64]) -> Self {
        Self {
            centroids: vertex_centroids.clone(),
            sizes: vertex_sizes.to_vec(),
        }
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        let (si, sj) = (self.sizes[i], self.sizes[j]);
        let d2: f64 = self
            .centroids
            .row(i)
            .iter()
            .zip(self.centroids.row(j))
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        si * sj / (si + sj) * d2
    }

    /// Ward distances of the initial graph edges.
    pub fn initial_weights(&self, graph: &UndirectedGraph) -> Vec<f64> {
        let mut weights = vec![0.0; graph.num_edges()];
        for (ei, u, v) in graph.edge_iter() {
            weights[ei] = self.distance(u, v);
        }
        weights
    }
}

impl LinkageStrategy for WardLinkage {
    fn on_merge(&mut self, ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]) {
        let (r1, r2) = (ctx.merged_region1, ctx.merged_region2);
        let (s1, s2) = (self.sizes[r1], self.sizes[r2]);
        let size = s1 + s2;
        let merged: Vec<f64> = self
            .centroids
            .row(r1)
            .iter()
            .zip(self.centroids.row(r2))
            .map(|(a, b)| (a * s1 + b * s2) / size)
            .collect();
        self.centroids.push_row(&merged);
        self.sizes.push(size);
        debug_assert_eq!(self.centroids.num_items(), ctx.new_region + 1);
        for record in new_neighbours {
            let w = self.distance(ctx.new_region, record.neighbour_vertex());
            record.set_new_edge_weight(w);
        }
    }
}

fn grow_set(values: &mut Vec<f64>, index: usize, value: f64) {
    if values.len() <= index {
        values.resize(index + 1, 0.0);
    }
    values[index] = value;
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Binary partition tree with single (minimum / nearest-neighbour)
/// linkage.
pub fn binary_partition_tree_min_linkage(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    let mut linkage = MinLinkage::new(edge_weights);
    binary_partition_tree(graph, edge_weights, &mut linkage)
}

/// Binary partition tree with complete (maximum) linkage.
pub fn binary_partition_tree_complete_linkage(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    let mut linkage = MaxLinkage::new(edge_weights);
    binary_partition_tree(graph, edge_weights, &mut linkage)
}

/// Binary partition tree with average linkage; `edge_weights` are the
/// averaging counts of the initial edge values.
pub fn binary_partition_tree_average_linkage(
    graph: &UndirectedGraph,
    edge_values: &[f64],
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    let mut linkage = AverageLinkage::new(edge_values, edge_weights);
    binary_partition_tree(graph, edge_values, &mut linkage)
}

/// Binary partition tree with exponential linkage.
pub fn binary_partition_tree_exponential_linkage(
    graph: &UndirectedGraph,
    edge_values: &[f64],
    alpha: f64,
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    let mut linkage = ExponentialLinkage::new(edge_values, alpha, edge_weights);
    binary_partition_tree(graph, edge_values, &mut linkage)
}

/// Binary partition tree with Ward linkage over vertex centroids.
pub fn binary_partition_tree_ward_linkage(
    graph: &UndirectedGraph,
    vertex_centroids: &DataArray,
    vertex_sizes: &[f64],
    correction: AltitudeCorrection,
) -> Result<NodeWeightedTree> {
    if vertex_centroids.num_items() != graph.num_vertices()
        || vertex_sizes.len() != graph.num_vertices()
    {
        return Err(HisegError::InvalidShape(
            "centroids or sizes do not match the number of vertices".into(),
        ));
    }
    let mut linkage = WardLinkage::new(vertex_centroids, vertex_sizes);
    let initial = linkage.initial_weights(graph);
    let mut result = binary_partition_tree(graph, &initial, &mut linkage)?;
    if correction == AltitudeCorrection::Max {
        let tree = &result.tree;
        tree.compute_children();
        for i in tree.leaves_to_root(false, true) {
            for &c in tree.children(i)? {
                if result.altitudes[c] > result.altitudes[i] {
                    result.altitudes[i] = result.altitudes[c];
                }
            }
        }
    }
    Ok(result)
}
