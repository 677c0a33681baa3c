//! CLI argument definitions for all hiseg subcommands.
//!
//! All `clap` structs and enums live here so `main.rs` stays minimal
//! and each command handler only imports the types it needs.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

// ==========================================================================
// Subcommand enum
// ==========================================================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print information about a graph file.
    ///
    /// Shows vertex and edge counts, the degree distribution, and the
    /// number of connected components.
    Info(InfoArgs),

    /// Compute the canonical binary partition tree of a graph.
    ///
    /// Writes the tree, its altitudes, and the minimum spanning tree
    /// edge map as JSON.
    Bpt(BptArgs),

    /// Compute the quasi-flat-zones hierarchy of a graph.
    Qfz(QfzArgs),

    /// Compute a watershed hierarchy (by area, volume, or dynamics).
    Watershed(WatershedArgs),

    /// Label the leaves of a hierarchy by a horizontal cut.
    ///
    /// The cut is selected either by an altitude threshold or by a
    /// requested number of regions.
    Cuts(CutsArgs),

    /// Render the saliency map of the canonical BPT as a grayscale PNG.
    ///
    /// The input graph must carry a `shape` field (4-adjacency grid).
    Render(RenderArgs),
}

// ==========================================================================
// Per-command arguments
// ==========================================================================

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input graph (JSON).
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct BptArgs {
    /// Input graph (JSON).
    pub input: PathBuf,

    /// Output file (JSON); stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct QfzArgs {
    /// Input graph (JSON).
    pub input: PathBuf,

    /// Output file (JSON); stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatershedAttribute {
    Area,
    Volume,
    Dynamics,
}

#[derive(Args, Debug)]
pub struct WatershedArgs {
    /// Input graph (JSON).
    pub input: PathBuf,

    /// Ordering attribute of the hierarchy.
    #[arg(long, value_enum, default_value = "area")]
    pub by: WatershedAttribute,

    /// Output file (JSON); stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CutsArgs {
    /// Input hierarchy (JSON with parents and altitudes).
    pub input: PathBuf,

    /// Cut at the greatest level not above this altitude.
    #[arg(long, conflicts_with = "regions")]
    pub threshold: Option<f64>,

    /// Cut with at least this many regions.
    #[arg(long)]
    pub regions: Option<usize>,

    /// With --regions, pick the coarser cut when the exact count does
    /// not exist.
    #[arg(long, requires = "regions")]
    pub at_most: bool,

    /// Output file (JSON); stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input grid graph (JSON with a `shape` field).
    pub input: PathBuf,

    /// Output PNG file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Add an extra background border around the contour image.
    #[arg(long)]
    pub extra_border: bool,
}
