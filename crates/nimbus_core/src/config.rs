//! Store configuration.

use std::collections::BTreeSet;

/// Configuration shared by the document and queue stores.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Collections the document store accepts. Anything else is rejected
    /// with `UnknownCollection`.
    pub collections: BTreeSet<String>,

    /// Path under which document blobs are stored.
    pub document_root: String,

    /// Path under which sub-collection index blobs are stored.
    pub index_root: String,

    /// Path under which queue blobs are stored.
    pub queue_root: String,

    /// Path of the blob holding the paging token secret.
    pub cursor_secret_path: String,

    /// Depth used by `receive` when the caller gives none.
    pub default_receive_depth: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collections: BTreeSet::new(),
            document_root: "/nitric/documents".to_string(),
            index_root: "/nitric/index".to_string(),
            queue_root: "/nitric/queues".to_string(),
            cursor_secret_path: "/nitric/meta/cursor-secret".to_string(),
            default_receive_depth: 10,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values and no collections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a collection.
    #[must_use]
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collections.insert(name.into());
        self
    }

    /// Declares several collections.
    #[must_use]
    pub fn collections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the document root path.
    #[must_use]
    pub fn document_root(mut self, root: impl Into<String>) -> Self {
        self.document_root = trim_root(root.into());
        self
    }

    /// Sets the sub-collection index root path.
    #[must_use]
    pub fn index_root(mut self, root: impl Into<String>) -> Self {
        self.index_root = trim_root(root.into());
        self
    }

    /// Sets the queue root path.
    #[must_use]
    pub fn queue_root(mut self, root: impl Into<String>) -> Self {
        self.queue_root = trim_root(root.into());
        self
    }

    /// Sets where the paging token secret is kept.
    #[must_use]
    pub fn cursor_secret_path(mut self, path: impl Into<String>) -> Self {
        self.cursor_secret_path = path.into();
        self
    }

    /// Sets the default receive depth.
    #[must_use]
    pub const fn default_receive_depth(mut self, depth: u32) -> Self {
        self.default_receive_depth = depth;
        self
    }

    /// Returns true if `name` was declared.
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.collections.contains(name)
    }
}

fn trim_root(mut root: String) -> String {
    while root.len() > 1 && root.ends_with('/') {
        root.pop();
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert!(config.collections.is_empty());
        assert_eq!(config.queue_root, "/nitric/queues");
        assert_eq!(config.default_receive_depth, 10);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .collection("users")
            .collections(["customers", "items"])
            .queue_root("/dev/queues/")
            .default_receive_depth(5);

        assert!(config.is_declared("users"));
        assert!(config.is_declared("items"));
        assert!(!config.is_declared("orders"));
        assert_eq!(config.queue_root, "/dev/queues");
        assert_eq!(config.default_receive_depth, 5);
    }
}
