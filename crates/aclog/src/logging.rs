//! `tracing` setup for the CLI.
//!
//! Logs go to stderr so JSON on stdout stays machine-readable. Timestamps are
//! time since start, which is what matters when watching a large log scan.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the CLI reports while scanning and analysing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Header details, truncation warnings and analysis summaries.
    #[default]
    Normal,
    /// Adds per-step scan progress and declined analyses.
    Verbose,
    /// Everything, including resync runs.
    Trace,
}

impl Verbosity {
    /// Map `-v` occurrences and `-q` to a verbosity. `quiet` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Level applied to this crate's events.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset. Dependencies stay at
    /// `warn` unless quiet.
    #[must_use]
    pub fn directive(self) -> String {
        match self {
            Self::Quiet => "error".to_string(),
            other => format!("warn,aclog={}", other.level()).to_lowercase(),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `verbosity`; a second
/// call is a no-op.
///
/// ```no_run
/// use aclog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::uptime())
        .with_target(verbosity >= Verbosity::Verbose);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

/// Subscriber that writes through the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("aclog=debug")
        .with_test_writer()
        .try_init();
}
