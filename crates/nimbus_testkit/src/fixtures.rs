//! Test fixtures and backend helpers.
//!
//! Provides convenience functions for setting up test backends and seeded
//! scenarios.

use crate::data;
use nimbus_core::{LocalBackend, StoreConfig};
use nimbus_storage::{FileDriver, InMemoryDriver, PersistenceDriver};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test backend with automatic cleanup.
pub struct TestBackend {
    /// The backend instance.
    pub backend: LocalBackend,
    driver: Arc<dyn PersistenceDriver>,
    config: StoreConfig,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestBackend {
    /// Creates an in-memory backend declaring the seeded collections.
    pub fn memory() -> Self {
        Self::memory_with_config(data::config())
    }

    /// Creates an in-memory backend with a custom configuration.
    pub fn memory_with_config(config: StoreConfig) -> Self {
        let driver: Arc<dyn PersistenceDriver> = Arc::new(InMemoryDriver::new());
        Self::over(driver, config, None)
    }

    /// Creates a backend over a fresh temporary data directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let driver: Arc<dyn PersistenceDriver> =
            Arc::new(FileDriver::open(temp_dir.path()).expect("Failed to open file driver"));
        Self::over(driver, data::config(), Some(temp_dir))
    }

    /// Creates an in-memory backend holding every seed data set.
    pub fn seeded() -> Self {
        let test = Self::memory();
        data::seed(&test.backend).expect("Failed to seed backend");
        test
    }

    /// Creates a file backend holding every seed data set.
    pub fn seeded_file() -> Self {
        let test = Self::file();
        data::seed(&test.backend).expect("Failed to seed backend");
        test
    }

    fn over(
        driver: Arc<dyn PersistenceDriver>,
        config: StoreConfig,
        temp_dir: Option<TempDir>,
    ) -> Self {
        let backend =
            LocalBackend::open(Arc::clone(&driver), config.clone()).expect("Failed to open backend");
        Self {
            backend,
            driver,
            config,
            _temp_dir: temp_dir,
        }
    }

    /// Drops the backend and opens a new one over the same data.
    ///
    /// File backends release and re-acquire the directory lock.
    pub fn reopen(self) -> Self {
        let Self {
            backend,
            driver,
            config,
            _temp_dir: temp_dir,
        } = self;
        drop(backend);

        let driver: Arc<dyn PersistenceDriver> = match &temp_dir {
            Some(dir) => {
                drop(driver);
                Arc::new(FileDriver::open(dir.path()).expect("Failed to reopen file driver"))
            }
            None => driver,
        };
        Self::over(driver, config, temp_dir)
    }

    /// Returns the driver under the backend.
    pub fn driver(&self) -> &dyn PersistenceDriver {
        self.driver.as_ref()
    }

    /// Returns the data directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestBackend {
    type Target = LocalBackend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

/// Runs a test with a temporary in-memory backend.
///
/// # Example
///
/// ```rust
/// use nimbus_testkit::with_backend;
/// use nimbus_core::{Key, Filters};
///
/// with_backend(|backend| {
///     let result = backend
///         .documents()
///         .query(&Key::collection("users"), "", Filters::all(), 0, None)
///         .unwrap();
///     assert!(result.documents.is_empty());
/// });
/// ```
pub fn with_backend<F, R>(f: F) -> R
where
    F: FnOnce(&LocalBackend) -> R,
{
    let test = TestBackend::memory();
    f(&test.backend)
}

/// Runs a test with a seeded in-memory backend.
pub fn with_seeded_backend<F, R>(f: F) -> R
where
    F: FnOnce(&LocalBackend) -> R,
{
    let test = TestBackend::seeded();
    f(&test.backend)
}

/// Runs a test with a temporary file-backed backend.
pub fn with_file_backend<F, R>(f: F) -> R
where
    F: FnOnce(&LocalBackend, &Path) -> R,
{
    let test = TestBackend::file();
    let path = test.path().expect("File backend should have a path");
    f(&test.backend, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::Key;
    use serde_json::json;

    #[test]
    fn memory_backend_declares_seed_collections() {
        let test = TestBackend::memory();
        assert!(test.config().is_declared(data::PARENT_ITEMS));
        assert!(test.path().is_none());
    }

    #[test]
    fn seeded_backend_has_orders() {
        let test = TestBackend::seeded();
        let order = test
            .documents()
            .get(&Key::new("customers", "1000"), Some(&Key::new("orders", "503")))
            .unwrap();
        assert_eq!(order.field("type"), Some(&json!("scooter/electric")));
    }

    #[test]
    fn file_backend_survives_reopen() {
        let test = TestBackend::file();
        let key = Key::new("users", "1");
        test.documents().set(&key, None, json!({"a": "b"})).unwrap();

        let test = test.reopen();
        assert!(test.path().is_some());
        assert_eq!(
            test.documents().get(&key, None).unwrap().field("a"),
            Some(&json!("b"))
        );
    }
}
