//! Hierarchical document storage.
//!
//! Documents are JSON objects addressed by a [`Key`](crate::Key), optionally
//! nested one level below a parent document in a freely named
//! sub-collection.

mod index;
mod store;

pub use store::{DocumentStore, QueryResult};

use crate::key::Key;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document content: an untyped JSON object.
pub type Content = Map<String, Value>;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The document's own key. For a child, `collection` is the
    /// sub-collection name.
    pub key: Key,
    /// The owning parent for sub-collection documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Key>,
    /// Field values.
    pub content: Content,
}

impl Document {
    /// Returns a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.get(name)
    }

    /// Ordering key used for query results: id, then parent id.
    pub(crate) fn sort_key(&self) -> (&str, Option<&str>) {
        (
            self.key.id.as_str(),
            self.parent.as_ref().map(|p| p.id.as_str()),
        )
    }
}
