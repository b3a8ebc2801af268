//! Argument parsing for the `aclog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, DatasetsCommand, ExportCommand, InspectCommand};

/// aclog - Decode and analyse .aclog flight logs
///
/// Scans the binary record stream, decodes every known record type into
/// datasets, and derives noise, spectral and sensor comparison datasets.
#[derive(Debug, Parser)]
#[command(name = "aclog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Read configuration from FILE instead of the default location
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the header, frame statistics and digest of a log
    Inspect(InspectCommand),

    /// List the datasets a log produces
    Datasets(DatasetsCommand),

    /// Export datasets as JSON
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
