//! Command-line parsing.
//!
//! Plain `roi` runs the full update; the subcommands expose the report and
//! the presentation binding on their own.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SourceId;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "roi", version, about = "ROI pricing data updater")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, validate and append pricing rows, then write the report.
    Run(CommonArgs),
    /// Print and save the report without fetching anything.
    Report(CommonArgs),
    /// Publish validated rows to the presentation binding.
    Publish(CommonArgs),
}

/// Overrides shared by every command. Unset flags fall back to the environment.
#[derive(Debug, Args, Clone, Default)]
pub struct CommonArgs {
    /// Pricing table CSV.
    #[arg(long, value_name = "CSV")]
    pub data_file: Option<PathBuf>,

    /// Directory for the dated report file.
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Source fetched for every product/model pair.
    #[arg(long, value_enum)]
    pub source: Option<SourceId>,

    /// JSON file the presentation binding writes to.
    #[arg(long, value_name = "JSON")]
    pub presentation: Option<PathBuf>,

    /// Fetch pairs one at a time.
    #[arg(long)]
    pub sequential: bool,
}
