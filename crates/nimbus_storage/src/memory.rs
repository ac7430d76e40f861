//! In-memory persistence driver for testing.

use crate::driver::PersistenceDriver;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory persistence driver.
///
/// This driver keeps every blob in an ordered map and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral emulation sessions that don't need persistence
///
/// Unlike the file driver, paths are not validated: any string is a key.
///
/// # Thread Safety
///
/// This driver is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use nimbus_storage::{InMemoryDriver, PersistenceDriver};
///
/// let driver = InMemoryDriver::new();
/// driver.put("/a/1", b"one").unwrap();
/// driver.put("/a/2", b"two").unwrap();
/// assert_eq!(driver.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDriver {
    items: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryDriver {
    /// Creates a new empty in-memory driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver seeded with pre-existing blobs.
    ///
    /// Useful for testing against a known persisted state.
    #[must_use]
    pub fn with_items<I, K>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            items: RwLock::new(items.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Returns a copy of every stored blob.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn stored_items(&self) -> BTreeMap<String, Vec<u8>> {
        self.items.read().clone()
    }

    /// Returns the number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Removes every stored blob.
    pub fn clear(&self) {
        self.items.write().clear();
    }
}

impl PersistenceDriver for InMemoryDriver {
    fn get(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.items.read().get(path).cloned())
    }

    fn put(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.items.write().insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.items.write().remove(path);
        Ok(())
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let items = self.items.read();
        Ok(items
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone())
            .collect())
    }
}
