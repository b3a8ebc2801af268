//! `aclog` - Decoder and analyser for `.aclog` flight controller logs
//!
//! This library scans the binary record stream of a log, decodes every known
//! record type into columnar datasets, and derives noise, spectral and sensor
//! comparison datasets from them.
//!
//! ```no_run
//! # fn main() -> aclog::Result<()> {
//! let bytes = std::fs::read("flight.aclog")?;
//! let mut result = aclog::parse(&bytes)?;
//! let report = aclog::analysis::run(&mut result.datasets, &Default::default());
//! println!("{} frames, {} derived datasets", result.stats.total_frames, report.added.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod parser;
pub mod records;
pub mod series;
pub mod source;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use dataset::{Dataset, DatasetMap};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use parser::{parse, FrameScanner, LogHeader, ParseResult};
pub use source::LogSource;
