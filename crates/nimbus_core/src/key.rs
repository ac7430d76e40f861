//! Document keys and the storage path scheme.
//!
//! Paths are built from escaped segments:
//!
//! ```text
//! <document_root>/<collection>/<id>                        top-level document
//! <document_root>/<collection>/<id>/<sub_collection>/<id>  child document
//! <index_root>/<collection>/<id>                           sub-collection names of a parent
//! <queue_root>/<queue_name>                                queue array
//! ```
//!
//! Escaping maps `%` to `%25` and `/` to `%2F` (and the segments `.`/`..` to
//! `%2E` runs), so no id can impersonate a deeper path.

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Address of a document within a collection.
///
/// A key with a blank `id` denotes the whole collection and is only
/// meaningful for queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Collection name (or sub-collection name when used as a sub-key).
    pub collection: String,
    /// Document id.
    pub id: String,
}

impl Key {
    /// Creates a key.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a collection-scan key (blank id).
    pub fn collection(collection: impl Into<String>) -> Self {
        Self::new(collection, "")
    }

    /// Returns true if the id is blank.
    #[must_use]
    pub fn is_collection_scan(&self) -> bool {
        self.id.is_empty()
    }

    fn require_complete(&self, name: &str) -> CoreResult<()> {
        if self.collection.is_empty() {
            return Err(CoreError::validation(format!(
                "{name}.collection must not be blank"
            )));
        }
        if self.id.is_empty() {
            return Err(CoreError::validation(format!("{name}.id must not be blank")));
        }
        Ok(())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Where a stored document sits: its own key and, for children, its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAddress {
    /// The document's key. For a child, `collection` is the sub-collection name.
    pub key: Key,
    /// The owning parent, if this is a sub-collection document.
    pub parent: Option<Key>,
}

/// Escapes a single path segment.
#[must_use]
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment == "." || segment == ".." {
        return Cow::Owned(segment.replace('.', "%2E"));
    }
    if !segment.contains(['%', '/']) {
        return Cow::Borrowed(segment);
    }
    let mut out = String::with_capacity(segment.len() + 4);
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverses [`escape_segment`]. Returns `None` for malformed escapes.
#[must_use]
pub fn unescape_segment(segment: &str) -> Option<String> {
    if !segment.contains('%') {
        return Some(segment.to_string());
    }
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Builds and parses storage paths for one store configuration.
#[derive(Debug, Clone)]
pub struct PathScheme {
    document_root: String,
    index_root: String,
    queue_root: String,
}

impl PathScheme {
    /// Creates the scheme for `config`'s roots.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            document_root: config.document_root.clone(),
            index_root: config.index_root.clone(),
            queue_root: config.queue_root.clone(),
        }
    }

    /// Resolves the storage path of a document.
    ///
    /// With a `sub_key`, the path addresses the child
    /// `sub_key.collection/sub_key.id` owned by `key`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if any required field is blank.
    pub fn path_for(&self, key: &Key, sub_key: Option<&Key>) -> CoreResult<String> {
        key.require_complete("key")?;
        let mut path = format!(
            "{}/{}/{}",
            self.document_root,
            escape_segment(&key.collection),
            escape_segment(&key.id)
        );
        if let Some(sub_key) = sub_key {
            sub_key.require_complete("sub_key")?;
            path.push('/');
            path.push_str(&escape_segment(&sub_key.collection));
            path.push('/');
            path.push_str(&escape_segment(&sub_key.id));
        }
        Ok(path)
    }

    /// Prefix covering every document (and descendant) in a collection.
    #[must_use]
    pub fn collection_prefix(&self, collection: &str) -> String {
        format!("{}/{}/", self.document_root, escape_segment(collection))
    }

    /// Prefix covering the children of `document_path` in `sub_collection`.
    #[must_use]
    pub fn children_prefix(&self, document_path: &str, sub_collection: &str) -> String {
        format!("{document_path}/{}/", escape_segment(sub_collection))
    }

    /// Path of the sub-collection index blob for `document_path`.
    #[must_use]
    pub fn index_path(&self, document_path: &str) -> String {
        let relative = document_path
            .strip_prefix(&self.document_root)
            .unwrap_or(document_path);
        format!("{}{relative}", self.index_root)
    }

    /// Path of the blob holding queue `name`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the name is blank.
    pub fn queue_path(&self, name: &str) -> CoreResult<String> {
        if name.is_empty() {
            return Err(CoreError::validation("queue name must not be blank"));
        }
        Ok(format!("{}/{}", self.queue_root, escape_segment(name)))
    }

    /// Returns the document root.
    #[must_use]
    pub fn document_root(&self) -> &str {
        &self.document_root
    }

    /// Returns the queue root.
    #[must_use]
    pub fn queue_root(&self) -> &str {
        &self.queue_root
    }

    /// Splits a document path into its unescaped segments below the root.
    fn segments(&self, path: &str) -> Option<Vec<String>> {
        let rest = path
            .strip_prefix(&self.document_root)?
            .strip_prefix('/')?;
        rest.split('/').map(unescape_segment).collect()
    }

    /// Parses a document path back into its address.
    ///
    /// Returns `None` for paths outside the document root or with a shape
    /// that is neither a top-level nor a child document.
    #[must_use]
    pub fn parse(&self, path: &str) -> Option<DocumentAddress> {
        let mut segments = self.segments(path)?;
        match segments.len() {
            2 => {
                let id = segments.pop()?;
                let collection = segments.pop()?;
                Some(DocumentAddress {
                    key: Key { collection, id },
                    parent: None,
                })
            }
            4 => {
                let id = segments.pop()?;
                let collection = segments.pop()?;
                let parent_id = segments.pop()?;
                let parent_collection = segments.pop()?;
                Some(DocumentAddress {
                    key: Key { collection, id },
                    parent: Some(Key::new(parent_collection, parent_id)),
                })
            }
            _ => None,
        }
    }
}
