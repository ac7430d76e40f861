//! Per-resource write locks.
//!
//! Every read-modify-write cycle against the driver (document set/delete,
//! queue send/receive) runs under the lock of its resource root:
//!
//! - `documents:<collection>/<id>` for a top-level document and all of its
//!   children, so cascading deletes and child writes serialize;
//! - `queues:<name>` for a queue.
//!
//! Writers on different roots never contend. Reads take no lock.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Table size above which idle entries are dropped on the next acquire.
const PRUNE_THRESHOLD: usize = 1024;

/// Guard held for the duration of a write. The lock is released on drop.
pub type PathGuard = ArcMutexGuard<RawMutex, ()>;

/// Lock table keyed by resource root.
#[derive(Debug, Default)]
pub struct PathLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PathLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock for `resource` is held.
    pub fn lock(&self, resource: &str) -> PathGuard {
        let entry = {
            let mut table = self.table.lock();
            if table.len() > PRUNE_THRESHOLD {
                table.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(table.entry(resource.to_string()).or_default())
        };
        entry.lock_arc()
    }

    /// Locks the subtree of a top-level document.
    pub fn document(&self, collection: &str, id: &str) -> PathGuard {
        self.lock(&format!("documents:{collection}/{id}"))
    }

    /// Locks a queue.
    pub fn queue(&self, name: &str) -> PathGuard {
        self.lock(&format!("queues:{name}"))
    }

    /// Number of resources currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Returns true if no resource is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}
