//! Error types for the range-classification core

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while parsing, storing or exporting ranges
#[derive(Debug, Error)]
pub enum PoolError {
    /// Malformed CIDR or address text
    #[error("Invalid CIDR '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },

    /// The underlying database is unavailable or rejected a statement
    #[error("Storage error: {0}")]
    Storage(String),

    /// File open/create/read/write failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more pools could not be written during a snapshot
    #[error("Snapshot incomplete, failed pools: {}", failed_pools.join(", "))]
    Snapshot { failed_pools: Vec<String> },

    /// Internal error (bug or runtime failure)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PoolError {
    pub fn invalid_cidr(cidr: impl Into<String>, reason: impl ToString) -> Self {
        PoolError::InvalidCidr {
            cidr: cidr.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PoolError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only concerns the offending input line
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PoolError::InvalidCidr { .. })
    }
}

impl From<rusqlite::Error> for PoolError {
    fn from(err: rusqlite::Error) -> Self {
        PoolError::Storage(err.to_string())
    }
}

impl From<r2d2::Error> for PoolError {
    fn from(err: r2d2::Error) -> Self {
        PoolError::Storage(format!("Failed to get connection: {}", err))
    }
}
