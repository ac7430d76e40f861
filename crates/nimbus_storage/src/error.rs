//! Error types for persistence driver operations.

use std::io;
use thiserror::Error;

/// Result type for driver operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during driver operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The blob path is not acceptable to the driver.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A stored blob is corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The data directory is held by another process.
    #[error("data directory locked: {0}")]
    Locked(String),

    /// Encryption or decryption failed.
    #[error("encryption error: {0}")]
    Encryption(String),
}

impl StorageError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
