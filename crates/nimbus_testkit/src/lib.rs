//! # Nimbus Testkit
//!
//! Test utilities for Nimbus.
//!
//! This crate provides:
//! - [`TestBackend`], an in-memory or temp-directory backend that cleans up
//!   after itself
//! - Seed data sets (users, customers with orders, lettered items)
//! - proptest strategies for keys and content
//! - Concurrency stress helpers for document and queue writes
//!
//! ## Usage
//!
//! ```rust
//! use nimbus_testkit::prelude::*;
//!
//! let backend = TestBackend::seeded();
//! let user = backend.documents().get(&data::user_key(1), None).unwrap();
//! assert_eq!(user.field("country"), Some(&serde_json::json!("US")));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod data;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
