//! # hiseg
//!
//! Construction and analysis of hierarchical segmentations of
//! edge-weighted graphs.
//!
//! The input is an undirected graph with scalar edge weights (typically
//! a pixel adjacency graph); the central outputs are trees of nested
//! regions with per-node altitudes encoding the scale at which each
//! region appears. On top of the constructors (canonical and generic
//! binary partition trees, quasi-flat zones, watershed hierarchies,
//! tree of shapes) the crate provides the analysis toolbox: horizontal
//! cuts, saliency maps, tree accumulators, energy-optimal cuts, and
//! hierarchy alignment.

pub mod accumulator;
pub mod algo;
pub mod array;
pub mod attributes;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod image;
pub mod sorting;
pub mod structure;

/// Sentinel for absent-by-design indices: tombstoned edges, vertices
/// outside a region adjacency graph, unassigned labels.
pub const INVALID_INDEX: usize = usize::MAX;

// Re-export commonly used types at crate root
pub use accumulator::Accumulator;
pub use array::DataArray;
pub use error::{HisegError, Result};
pub use hierarchy::core::{
    bpt_canonical, quasi_flat_zones_hierarchy, saliency_map, simplify_tree,
    BptResult, MstResult, NodeWeightedTree, SimplifiedTree,
};
pub use structure::graph::UndirectedGraph;
pub use structure::tree::{Tree, TreeCategory};
