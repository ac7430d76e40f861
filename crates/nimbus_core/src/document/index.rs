//! Sub-collection index.
//!
//! Each parent that has ever received a child keeps a small blob listing the
//! sub-collection names written beneath it. Cascading deletes read this
//! list and prefix-scan only those sub-collections instead of the whole
//! collection.

use crate::error::{CoreError, CoreResult};
use nimbus_storage::PersistenceDriver;
use std::collections::BTreeSet;

/// Reads the sub-collection names recorded at `index_path`.
pub(crate) fn read(driver: &dyn PersistenceDriver, index_path: &str) -> CoreResult<BTreeSet<String>> {
    match driver.get(index_path)? {
        Some(bytes) => {
            serde_json::from_slice(&bytes).map_err(|e| CoreError::corrupted(index_path, e))
        }
        None => Ok(BTreeSet::new()),
    }
}

/// Records `sub_collection` at `index_path` if it is not there yet.
///
/// Callers hold the parent's lock.
pub(crate) fn record(
    driver: &dyn PersistenceDriver,
    index_path: &str,
    sub_collection: &str,
) -> CoreResult<()> {
    let mut names = read(driver, index_path)?;
    if names.insert(sub_collection.to_string()) {
        let bytes =
            serde_json::to_vec(&names).map_err(|e| CoreError::corrupted(index_path, e))?;
        driver.put(index_path, &bytes)?;
        tracing::debug!(index = index_path, sub_collection, "recorded sub-collection");
    }
    Ok(())
}
