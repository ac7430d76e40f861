//! # Nimbus Core
//!
//! Local emulation engine for cloud document databases and work queues.
//!
//! This crate provides:
//! - A key model that maps `(collection, id[, sub_collection, sub_id])` to
//!   storage paths
//! - A hierarchical document store with cascading deletes
//! - Filtered queries with `==`, `>`, `<`, `>=`, `<=` and `startsWith`
//! - Cursor pagination with opaque, query-bound tokens
//! - FIFO queues with batch send and depth-bounded receive
//!
//! Everything is persisted through a [`PersistenceDriver`](nimbus_storage::PersistenceDriver)
//! supplied by the caller; see [`LocalBackend`] for the usual entry point.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod key;
pub mod lock;
pub mod query;
pub mod queue;

pub use backend::LocalBackend;
pub use config::StoreConfig;
pub use document::{Content, Document, DocumentStore, QueryResult};
pub use error::{CoreError, CoreResult};
pub use key::{DocumentAddress, Key, PathScheme};
pub use query::{Expression, Filters, Operator, PagingToken};
pub use queue::{BatchResponse, FailedTask, QueueStore, ReceiveOptions, Task};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
