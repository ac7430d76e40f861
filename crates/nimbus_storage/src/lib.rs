//! # Nimbus Storage
//!
//! Persistence drivers for the Nimbus local emulation engine.
//!
//! This crate provides the lowest-level persistence abstraction for Nimbus.
//! Drivers are **opaque byte stores keyed by path strings** - they do not
//! interpret the blobs they hold.
//!
//! ## Design Principles
//!
//! - Drivers are simple keyed blob stores (get, put, delete, list by prefix)
//! - No knowledge of documents, queues, or the path scheme built on top
//! - Must be `Send + Sync` so one driver can back many concurrent callers
//! - Nimbus core owns all serialization and path interpretation
//!
//! ## Available Drivers
//!
//! - [`InMemoryDriver`] - For testing and ephemeral emulation
//! - [`FileDriver`] - One file per blob under a locked data directory
//! - [`EncryptedDriver`] - Wrapper that adds AES-256-GCM encryption to blobs
//!
//! ## Example
//!
//! ```rust
//! use nimbus_storage::{InMemoryDriver, PersistenceDriver};
//!
//! let driver = InMemoryDriver::new();
//! driver.put("/nitric/queues/jobs", b"[]").unwrap();
//! assert_eq!(driver.get("/nitric/queues/jobs").unwrap(), Some(b"[]".to_vec()));
//! assert_eq!(driver.list("/nitric/queues/").unwrap(), vec!["/nitric/queues/jobs"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod encrypted;
mod error;
mod file;
mod memory;

pub use driver::{validate_path, PersistenceDriver};
pub use encrypted::{EncryptedDriver, EncryptionKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use error::{StorageError, StorageResult};
pub use file::FileDriver;
pub use memory::InMemoryDriver;
