//! Error types for aclog.
//!
//! Fatal conditions (a malformed header, the frame safety cap) abort parsing and
//! surface to the caller. Everything else the scanner meets mid-stream is
//! absorbed into statistics instead of becoming an error.

use thiserror::Error;

/// The main error type for aclog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Format Errors ===
    /// The log header is missing, truncated or carries the wrong magic.
    #[error("invalid log header: {message}")]
    Format {
        /// Description of what is wrong with the header.
        message: String,
    },

    /// The scanner processed more frames than the configured safety limit.
    #[error("frame limit of {limit} exceeded; the log is corrupt or adversarial")]
    FrameLimit {
        /// The limit that was exceeded.
        limit: u64,
    },

    /// A primitive read went past the end of the buffer.
    #[error("read of {width} byte(s) at offset {offset} exceeds buffer length {len}")]
    OutOfRange {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes the read needed.
        width: usize,
        /// Length of the buffer.
        len: usize,
    },

    /// A scanner operation was called in the wrong lifecycle state.
    #[error("cannot {operation} while the scanner is {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the scanner was in.
        state: &'static str,
    },

    // === Dataset Errors ===
    /// Columns within one dataset disagree in length.
    #[error("dataset '{dataset}' field '{field}' has {actual} rows, expected {expected}")]
    InconsistentLengths {
        /// Dataset key.
        dataset: String,
        /// First field whose length disagrees.
        field: String,
        /// Length of the reference (`Time`) column.
        expected: usize,
        /// Length of the offending column.
        actual: usize,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Analysis Errors ===
    /// An offloaded analysis task failed to complete.
    #[error("analysis worker failed: {0}")]
    Worker(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for aclog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new header format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a new worker error.
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error aborts parsing of the log.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::FrameLimit { .. })
    }

    /// Check if this error is a header format violation.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}
