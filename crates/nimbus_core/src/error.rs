//! Error types for Nimbus core.

use nimbus_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Nimbus core operations.
///
/// None of these are retried internally: they reflect caller misuse,
/// absent data, or a driver failure the caller must decide about.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed key or sub-key, missing content, or missing filters.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of what was invalid.
        message: String,
    },

    /// The collection was not declared to the store.
    #[error("unknown collection: {name}")]
    UnknownCollection {
        /// Name of the collection.
        name: String,
    },

    /// No document exists at the requested key.
    #[error("document not found: {path}")]
    NotFound {
        /// Storage path that was looked up.
        path: String,
    },

    /// A continuation token is stale, forged, or from another query.
    #[error("invalid paging token: {message}")]
    PagingToken {
        /// Why the token was rejected.
        message: String,
    },

    /// The persistence driver failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// A stored blob could not be decoded.
    #[error("corrupted blob at {path}: {message}")]
    Corrupted {
        /// Storage path of the blob.
        path: String,
        /// Decoder message.
        message: String,
    },
}

impl CoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unknown collection error.
    pub fn unknown_collection(name: impl Into<String>) -> Self {
        Self::UnknownCollection { name: name.into() }
    }

    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a paging token error.
    pub fn paging_token(message: impl Into<String>) -> Self {
        Self::PagingToken {
            message: message.into(),
        }
    }

    /// Creates a corrupted blob error.
    pub fn corrupted(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Corrupted {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for [`CoreError::Validation`].
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true for [`CoreError::UnknownCollection`].
    #[must_use]
    pub fn is_unknown_collection(&self) -> bool {
        matches!(self, Self::UnknownCollection { .. })
    }

    /// Returns true for [`CoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`CoreError::PagingToken`].
    #[must_use]
    pub fn is_paging_token(&self) -> bool {
        matches!(self, Self::PagingToken { .. })
    }
}
