//! Backend facade.

use crate::config::StoreConfig;
use crate::document::DocumentStore;
use crate::error::CoreResult;
use crate::queue::QueueStore;
use nimbus_storage::{FileDriver, InMemoryDriver, PersistenceDriver};
use std::path::Path;
use std::sync::Arc;

/// A document store and a queue store over one persistence driver.
///
/// `LocalBackend` is the entry point for embedding the emulation engine:
///
/// ```rust
/// use nimbus_core::{Key, LocalBackend, ReceiveOptions, StoreConfig, Task};
/// use serde_json::json;
///
/// let backend = LocalBackend::open_in_memory(StoreConfig::new().collection("users")).unwrap();
///
/// let key = Key::new("users", "jane");
/// backend.documents().set(&key, None, json!({"age": "40"})).unwrap();
/// assert_eq!(backend.documents().get(&key, None).unwrap().field("age"), Some(&json!("40")));
///
/// backend.queues().send_batch("jobs", vec![Task::new("1", "resize")]).unwrap();
/// let tasks = backend.queues().receive(ReceiveOptions::new("jobs")).unwrap();
/// assert_eq!(tasks.len(), 1);
/// ```
///
/// Each backend owns its driver handle; two backends never share state
/// unless they are given the same driver.
#[derive(Debug)]
pub struct LocalBackend {
    documents: DocumentStore,
    queues: QueueStore,
}

impl LocalBackend {
    /// Opens a backend over `driver`.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be read or written while
    /// loading the paging token secret.
    pub fn open(driver: Arc<dyn PersistenceDriver>, config: StoreConfig) -> CoreResult<Self> {
        let queues = QueueStore::new(Arc::clone(&driver), &config);
        let documents = DocumentStore::open(driver, config)?;
        Ok(Self { documents, queues })
    }

    /// Opens a backend that keeps everything in memory.
    ///
    /// # Errors
    ///
    /// See [`LocalBackend::open`].
    pub fn open_in_memory(config: StoreConfig) -> CoreResult<Self> {
        Self::open(Arc::new(InMemoryDriver::new()), config)
    }

    /// Opens a backend over a data directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the directory cannot be created or is
    /// locked by another process.
    pub fn open_dir(path: impl AsRef<Path>, config: StoreConfig) -> CoreResult<Self> {
        let driver = FileDriver::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "opened data directory");
        Self::open(Arc::new(driver), config)
    }

    /// Returns the document store.
    #[must_use]
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Returns the queue store.
    #[must_use]
    pub fn queues(&self) -> &QueueStore {
        &self.queues
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        self.documents.config()
    }
}
