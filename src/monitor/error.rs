//! Error types for the dashboard core.
//!
//! Only configuration errors are fatal, and they surface before the event
//! loop starts. Collection errors are reported per subsystem and recovered
//! by the metric source (the subsystem is absent for that tick).

use std::io;
use thiserror::Error;

/// Error type for monitoring operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A metric collector is not available on this system.
    #[error("collector '{0}' is not available on this system")]
    CollectorUnavailable(&'static str),

    /// Failed to collect metrics from a collector.
    #[error("failed to collect metrics from '{collector}': {message}")]
    CollectionFailed {
        /// The collector that failed.
        collector: &'static str,
        /// Error message describing the failure.
        message: String,
    },

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Configuration file exists but could not be read.
    #[error("cannot read configuration file {path}: {message}")]
    ConfigUnreadable {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        message: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// Terminal initialization or rendering error.
    #[error("terminal error: {0}")]
    TerminalError(#[from] io::Error),

    /// Permission denied while reading a metric.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl MonitorError {
    /// Builds a [`MonitorError::CollectionFailed`] from an I/O error,
    /// mapping `PermissionDenied` to its own variant.
    pub fn from_io(collector: &'static str, what: &str, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(format!("{collector}: {what}"))
        } else {
            Self::CollectionFailed { collector, message: format!("failed to read {what}: {err}") }
        }
    }
}

/// Result type alias for monitoring operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
