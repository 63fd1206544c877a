//! Error types for the logging subsystem

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed, or the filter is invalid
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidConfiguration(String),

    /// The log file could not be rotated or opened
    #[error("Log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
