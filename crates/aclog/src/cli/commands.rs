//! Subcommand arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Inspect command arguments.
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// The .aclog file to read
    pub file: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Datasets command arguments.
#[derive(Debug, Args)]
pub struct DatasetsCommand {
    /// The .aclog file to read
    pub file: PathBuf,

    /// Only list datasets decoded from records
    #[arg(long)]
    pub raw: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// The .aclog file to read
    pub file: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only export these datasets (repeatable)
    #[arg(short, long, value_name = "KEY")]
    pub dataset: Vec<String>,

    /// Skip derived analyses
    #[arg(long)]
    pub raw: bool,

    /// Pretty-print the JSON
    #[arg(short, long)]
    pub pretty: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
