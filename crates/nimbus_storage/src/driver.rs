//! Persistence driver trait definition.

use crate::error::{StorageError, StorageResult};
use std::sync::Arc;

/// A keyed blob store backing the Nimbus emulation engine.
///
/// Drivers are **opaque byte stores**. A blob is addressed by a path string
/// such as `/nitric/documents/users/42`. Nimbus owns the path scheme and the
/// blob format - drivers do not understand documents or queues.
///
/// # Invariants
///
/// - `get` returns exactly the bytes last passed to `put` for that path
/// - `get` and `delete` on an absent path are not errors
/// - `list` returns every stored path that starts with the prefix, in
///   ascending lexical order
/// - Each individual call is atomic; drivers give no multi-call transactions
/// - Drivers must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryDriver`] - For testing
/// - [`super::FileDriver`] - For persistent storage
/// - [`super::EncryptedDriver`] - Encryption at rest over another driver
pub trait PersistenceDriver: Send + Sync {
    /// Reads the blob stored at `path`.
    ///
    /// Returns `None` if nothing is stored there.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or an I/O error occurs.
    fn get(&self, path: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `data` at `path`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or an I/O error occurs.
    fn put(&self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Removes the blob stored at `path`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or an I/O error occurs.
    fn delete(&self, path: &str) -> StorageResult<()>;

    /// Lists all stored paths beginning with `prefix`, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

impl<D: PersistenceDriver + ?Sized> PersistenceDriver for Arc<D> {
    fn get(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(path)
    }

    fn put(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        (**self).put(path, data)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        (**self).delete(path)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).list(prefix)
    }
}

impl<D: PersistenceDriver + ?Sized> PersistenceDriver for Box<D> {
    fn get(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(path)
    }

    fn put(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        (**self).put(path, data)
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        (**self).delete(path)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).list(prefix)
    }
}

/// Checks that `path` is a well-formed blob path.
///
/// A blob path is absolute (`/`-prefixed), has no trailing slash, and has no
/// empty, `.` or `..` segments.
///
/// # Errors
///
/// Returns [`StorageError::InvalidPath`] describing the first problem found.
pub fn validate_path(path: &str) -> StorageResult<()> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(StorageError::invalid_path(path, "must start with '/'"));
    };

    if rest.is_empty() {
        return Err(StorageError::invalid_path(path, "must name a blob"));
    }

    for segment in rest.split('/') {
        match segment {
            "" => return Err(StorageError::invalid_path(path, "empty segment")),
            "." | ".." => return Err(StorageError::invalid_path(path, "relative segment")),
            _ => {}
        }
    }

    Ok(())
}
