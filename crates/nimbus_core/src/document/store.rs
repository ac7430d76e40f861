//! Document store.

use super::{index, Document};
use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::key::{escape_segment, Key, PathScheme};
use crate::lock::PathLocks;
use crate::query::{engine, Filters, Paginator, PagingToken, SECRET_SIZE};
use nimbus_storage::PersistenceDriver;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matching documents, ordered by id then parent id.
    pub documents: Vec<Document>,
    /// Token for the next page; `None` when nothing remains.
    pub paging_token: Option<PagingToken>,
}

/// CRUD and query operations over documents held by a persistence driver.
///
/// Writes to a top-level document and to any of its children are
/// serialized; writes to different top-level documents run in parallel.
pub struct DocumentStore {
    driver: Arc<dyn PersistenceDriver>,
    config: StoreConfig,
    paths: PathScheme,
    locks: PathLocks,
    paginator: Paginator,
}

impl DocumentStore {
    /// Opens a document store over `driver`.
    ///
    /// The paging token secret is read from `config.cursor_secret_path`, or
    /// generated and stored there on first use, so tokens stay valid across
    /// store instances sharing the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be read or written.
    pub fn open(driver: Arc<dyn PersistenceDriver>, config: StoreConfig) -> CoreResult<Self> {
        let secret = load_or_create_secret(driver.as_ref(), &config.cursor_secret_path)?;
        tracing::debug!(
            collections = config.collections.len(),
            root = %config.document_root,
            "opened document store"
        );
        Ok(Self {
            paths: PathScheme::new(&config),
            driver,
            config,
            locks: PathLocks::new(),
            paginator: Paginator::new(secret),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the path scheme in use.
    #[must_use]
    pub fn paths(&self) -> &PathScheme {
        &self.paths
    }

    /// Fetches a document, or the child `sub_key` of `key`.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank key or sub-key fields
    /// - `UnknownCollection` if `key.collection` was not declared
    /// - `NotFound` if nothing is stored there
    pub fn get(&self, key: &Key, sub_key: Option<&Key>) -> CoreResult<Document> {
        let path = self.resolve(key, sub_key)?;
        match self.driver.get(&path)? {
            Some(bytes) => decode(&path, &bytes),
            None => Err(CoreError::not_found(path)),
        }
    }

    /// Creates or replaces a document.
    ///
    /// `content` must be a JSON object. Writing a child records its
    /// sub-collection name on the parent so a later delete can find it.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank key fields or non-object content
    /// - `UnknownCollection` if `key.collection` was not declared
    pub fn set(&self, key: &Key, sub_key: Option<&Key>, content: Value) -> CoreResult<()> {
        let path = self.resolve(key, sub_key)?;
        let Value::Object(content) = content else {
            return Err(CoreError::validation("content must be a JSON object"));
        };

        let document = Document {
            key: sub_key.cloned().unwrap_or_else(|| key.clone()),
            parent: sub_key.map(|_| key.clone()),
            content,
        };
        let bytes = serde_json::to_vec(&document).map_err(|e| CoreError::corrupted(&path, e))?;

        let _guard = self.locks.document(&key.collection, &key.id);
        if let Some(sub_key) = sub_key {
            let parent_path = self.paths.path_for(key, None)?;
            index::record(
                self.driver.as_ref(),
                &self.paths.index_path(&parent_path),
                &sub_key.collection,
            )?;
        }
        self.driver.put(&path, &bytes)?;

        tracing::debug!(path = %path, "set document");
        Ok(())
    }

    /// Deletes a document and every document beneath it.
    ///
    /// Deleting something that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank key fields
    /// - `UnknownCollection` if `key.collection` was not declared
    pub fn delete(&self, key: &Key, sub_key: Option<&Key>) -> CoreResult<()> {
        let path = self.resolve(key, sub_key)?;

        let _guard = self.locks.document(&key.collection, &key.id);
        let removed = self.delete_tree(&path)?;

        tracing::debug!(path = %path, descendants = removed, "deleted document");
        Ok(())
    }

    /// Runs a filtered, paginated query.
    ///
    /// Scope is chosen by which of `key.id` and `sub_collection` are set:
    ///
    /// | `key.id` | `sub_collection` | candidates                                   |
    /// |----------|------------------|----------------------------------------------|
    /// | blank    | blank            | every top-level document in the collection   |
    /// | set      | blank            | that one document                            |
    /// | set      | set              | that document's children in `sub_collection` |
    /// | blank    | set              | `sub_collection` children of every parent    |
    ///
    /// `limit == 0` returns every match. A stale or foreign `paging_token`
    /// yields an empty page.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank collection or [`Filters::Unspecified`]
    /// - `UnknownCollection` if `key.collection` was not declared
    pub fn query(
        &self,
        key: &Key,
        sub_collection: &str,
        filters: impl Into<Filters>,
        limit: usize,
        paging_token: Option<&PagingToken>,
    ) -> CoreResult<QueryResult> {
        self.check_collection(&key.collection)?;
        let filters = filters.into();
        let expressions = filters.expressions()?;

        let candidates = self.candidates(key, sub_collection)?;
        let scanned = candidates.len();
        let results = engine::evaluate(candidates, expressions);
        let fingerprint = self.paginator.fingerprint(key, sub_collection, expressions);

        match self
            .paginator
            .paginate(results, limit, paging_token, &fingerprint)
        {
            Ok((documents, paging_token)) => {
                tracing::debug!(
                    collection = %key.collection,
                    sub_collection,
                    scanned,
                    returned = documents.len(),
                    more = paging_token.is_some(),
                    "query"
                );
                Ok(QueryResult {
                    documents,
                    paging_token,
                })
            }
            Err(e) if e.is_paging_token() => {
                tracing::warn!(collection = %key.collection, error = %e, "ignoring paging token");
                Ok(QueryResult::default())
            }
            Err(e) => Err(e),
        }
    }

    fn check_collection(&self, collection: &str) -> CoreResult<()> {
        if collection.is_empty() {
            return Err(CoreError::validation("key.collection must not be blank"));
        }
        if !self.config.is_declared(collection) {
            return Err(CoreError::unknown_collection(collection));
        }
        Ok(())
    }

    fn resolve(&self, key: &Key, sub_key: Option<&Key>) -> CoreResult<String> {
        self.check_collection(&key.collection)?;
        self.paths.path_for(key, sub_key)
    }

    /// Removes `document_path`, its descendants and its index. Returns the
    /// number of descendants removed.
    fn delete_tree(&self, document_path: &str) -> CoreResult<usize> {
        let index_path = self.paths.index_path(document_path);
        let mut removed = 0;

        for sub_collection in index::read(self.driver.as_ref(), &index_path)? {
            let prefix = self.paths.children_prefix(document_path, &sub_collection);
            for child in self.driver.list(&prefix)? {
                if is_direct(&child, &prefix) {
                    removed += self.delete_tree(&child)? + 1;
                }
            }
        }

        self.driver.delete(&index_path)?;
        self.driver.delete(document_path)?;
        Ok(removed)
    }

    fn candidates(&self, key: &Key, sub_collection: &str) -> CoreResult<Vec<Document>> {
        let paths = match (key.is_collection_scan(), sub_collection.is_empty()) {
            (false, true) => vec![self.paths.path_for(key, None)?],
            (false, false) => {
                let parent = self.paths.path_for(key, None)?;
                let prefix = self.paths.children_prefix(&parent, sub_collection);
                self.driver
                    .list(&prefix)?
                    .into_iter()
                    .filter(|p| is_direct(p, &prefix))
                    .collect()
            }
            (true, true) => {
                let prefix = self.paths.collection_prefix(&key.collection);
                self.driver
                    .list(&prefix)?
                    .into_iter()
                    .filter(|p| is_direct(p, &prefix))
                    .collect()
            }
            (true, false) => {
                let prefix = self.paths.collection_prefix(&key.collection);
                let wanted = escape_segment(sub_collection);
                self.driver
                    .list(&prefix)?
                    .into_iter()
                    .filter(|p| {
                        let parts: Vec<&str> = p[prefix.len()..].split('/').collect();
                        parts.len() == 3 && parts[1] == wanted
                    })
                    .collect()
            }
        };

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            // Removed between list and get.
            if let Some(bytes) = self.driver.get(&path)? {
                documents.push(decode(&path, &bytes)?);
            }
        }
        Ok(documents)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// True if `path` sits exactly one segment below `prefix`.
fn is_direct(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn decode(path: &str, bytes: &[u8]) -> CoreResult<Document> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::corrupted(path, e))
}

fn load_or_create_secret(
    driver: &dyn PersistenceDriver,
    path: &str,
) -> CoreResult<[u8; SECRET_SIZE]> {
    if let Some(bytes) = driver.get(path)? {
        return <[u8; SECRET_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            CoreError::corrupted(
                path,
                format!("expected {SECRET_SIZE} bytes, found {}", bytes.len()),
            )
        });
    }

    let mut secret = [0u8; SECRET_SIZE];
    rand::thread_rng().fill_bytes(&mut secret);
    driver.put(path, &secret)?;
    tracing::info!(path, "generated paging token secret");
    Ok(secret)
}
