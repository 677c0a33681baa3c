//! hiseg CLI
//!
//! Command-line tool for building and analysing hierarchical
//! segmentations of edge-weighted graphs.
//!
//! ## Subcommands
//!
//! ```text
//! hiseg info      <graph.json>                       Print graph info
//! hiseg bpt       <graph.json>  [-o out.json]        Canonical binary partition tree
//! hiseg qfz       <graph.json>  [-o out.json]        Quasi-flat-zones hierarchy
//! hiseg watershed <graph.json>  --by area [...]      Watershed hierarchy
//! hiseg cuts      <hierarchy.json> --threshold 2.5   Horizontal cut labelling
//! hiseg render    <graph.json>  -o out.png           Saliency map as a PNG contour image
//! ```

mod args;
mod commands;
mod docs;

use args::Commands;
use clap::Parser;

// ==========================================================================
// Top-level CLI
// ==========================================================================

/// hiseg — hierarchies of nested regions from edge-weighted graphs.
#[derive(Parser, Debug)]
#[command(name = "hiseg", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress non-essential output.
    #[arg(long, global = true)]
    quiet: bool,
}

// ==========================================================================
// Main
// ==========================================================================

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Bpt(args) => commands::bpt::run(args, cli.quiet),
        Commands::Qfz(args) => commands::qfz::run(args, cli.quiet),
        Commands::Watershed(args) => commands::watershed::run(args, cli.quiet),
        Commands::Cuts(args) => commands::cuts::run(args),
        Commands::Render(args) => commands::render::run(args, cli.quiet),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
