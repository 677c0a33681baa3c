//! Unified error types for the hiseg-core crate.
//!
//! All public-facing errors are collected here so callers can match on a
//! single enum.

use thiserror::Error;

/// Top-level error type for the hiseg-core crate.
#[derive(Error, Debug)]
pub enum HisegError {
    /// An array's dimensions or sizes are incompatible with the graph or
    /// tree it is paired with (mismatched vertex/edge count, wrong rank).
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// A parents array that is not a valid tree: not topologically sorted,
    /// more than one root, or leaves not forming a prefix.
    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    /// The canonical binary partition tree requires a connected graph.
    #[error("Input graph must be connected")]
    Disconnected,

    /// An operation precondition does not hold (negative altitudes,
    /// nonzero leaf altitudes, missing `compute_children` call, ...).
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The requested accumulator or weight function is not defined for the
    /// given element shape.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A vertex, edge, or node index outside the valid range.
    #[error("Index {index} out of range (bound {bound})")]
    OutOfRange { index: usize, bound: usize },

    /// An I/O error while reading or writing a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HisegError>;
