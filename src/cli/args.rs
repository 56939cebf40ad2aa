//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    axial::AxialCommands,
    compare::CompareArgs,
    completions::CompletionsArgs,
    diameter::DiameterCommands,
    doc::DocArgs,
    init::InitArgs,
    manual::{ThermalGapArgs, WeightsArgs},
    scope::ScopeCommands,
    status::StatusArgs,
};

#[derive(Parser)]
#[command(name = "rotoworks")]
#[command(author, version, about = "Rotor inspection workscopes for the shop floor")]
#[command(long_about = "Define rotor inspection projects, build the scope files a CMM inspection runs from, and document the results on a CAD drawing.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project file or workspace (default: auto-detect by finding a .rw file)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new inspection project
    Init(InitArgs),

    /// List machine types, sub types and their features
    Machines,

    /// View and edit the per-stage feature scope
    #[command(subcommand)]
    Scope(ScopeCommands),

    /// Build and publish the axial workscope
    #[command(subcommand)]
    Axial(AxialCommands),

    /// Build and publish the diameter workscope
    #[command(subcommand)]
    Diameter(DiameterCommands),

    /// Record thermal gap measurements
    ThermalGap(ThermalGapArgs),

    /// Record rotor journal weights
    Weights(WeightsArgs),

    /// Document inspection results on the CAD drawing
    Doc(DocArgs),

    /// Compare results against a reference job
    Compare(CompareArgs),

    /// Show project and inspection status
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}
