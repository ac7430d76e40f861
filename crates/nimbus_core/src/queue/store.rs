//! Queue store.

use super::task::{BatchResponse, FailedTask, ReceiveOptions, Task};
use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::key::PathScheme;
use crate::lock::PathLocks;
use nimbus_storage::PersistenceDriver;
use std::sync::Arc;

/// Batch send and depth-bounded receive over persisted task arrays.
pub struct QueueStore {
    driver: Arc<dyn PersistenceDriver>,
    paths: PathScheme,
    locks: PathLocks,
    default_depth: u32,
}

impl QueueStore {
    /// Creates a queue store over `driver`.
    pub fn new(driver: Arc<dyn PersistenceDriver>, config: &StoreConfig) -> Self {
        Self {
            driver,
            paths: PathScheme::new(config),
            locks: PathLocks::new(),
            default_depth: config.default_receive_depth,
        }
    }

    /// Appends `tasks` to the tail of `queue`, in order.
    ///
    /// Tasks with a blank id, or that cannot be encoded, are returned in
    /// [`BatchResponse::failed_tasks`]; the rest are committed.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank queue name
    /// - `Corrupted` if the stored queue cannot be decoded
    /// - `StorageUnavailable` if the driver fails
    pub fn send_batch(&self, queue: &str, tasks: Vec<Task>) -> CoreResult<BatchResponse> {
        let path = self.paths.queue_path(queue)?;
        let mut response = BatchResponse::default();
        if tasks.is_empty() {
            return Ok(response);
        }

        let mut accepted = Vec::with_capacity(tasks.len());
        for task in tasks {
            match check_task(&task) {
                Ok(()) => accepted.push(task),
                Err(message) => response.failed_tasks.push(FailedTask { task, message }),
            }
        }

        if !accepted.is_empty() {
            let _guard = self.locks.queue(queue);
            let mut stored = self.read(&path)?.unwrap_or_default();
            stored.extend(accepted);
            self.write(&path, &stored)?;
            tracing::debug!(
                queue,
                queued = stored.len(),
                failed = response.failed_tasks.len(),
                "sent batch"
            );
        }

        Ok(response)
    }

    /// Pops up to `depth` tasks from the head of a queue, oldest first.
    ///
    /// An empty or absent queue yields no tasks.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank queue name or a depth of zero
    /// - `Corrupted` if the stored queue cannot be decoded
    /// - `StorageUnavailable` if the driver fails
    pub fn receive(&self, options: ReceiveOptions) -> CoreResult<Vec<Task>> {
        let path = self.paths.queue_path(&options.queue_name)?;
        let depth = options.depth.unwrap_or(self.default_depth);
        if depth == 0 {
            return Err(CoreError::validation("receive depth must be at least 1"));
        }

        let _guard = self.locks.queue(&options.queue_name);
        let Some(mut tasks) = self.read(&path)? else {
            return Ok(Vec::new());
        };

        let take = tasks.len().min(depth as usize);
        let remaining = tasks.split_off(take);
        self.write(&path, &remaining)?;

        tracing::debug!(
            queue = %options.queue_name,
            received = tasks.len(),
            remaining = remaining.len(),
            "received tasks"
        );
        Ok(tasks)
    }

    /// Acknowledges a task.
    ///
    /// Tasks leave storage when received, so there is nothing to do.
    pub fn complete(&self, queue: &str, task_id: &str) {
        tracing::debug!(queue, task_id, "complete is a no-op for local queues");
    }

    fn read(&self, path: &str) -> CoreResult<Option<Vec<Task>>> {
        match self.driver.get(path)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CoreError::corrupted(path, e)),
            None => Ok(None),
        }
    }

    fn write(&self, path: &str, tasks: &[Task]) -> CoreResult<()> {
        let bytes = serde_json::to_vec(tasks).map_err(|e| CoreError::corrupted(path, e))?;
        self.driver.put(path, &bytes)?;
        Ok(())
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("paths", &self.paths)
            .field("default_depth", &self.default_depth)
            .finish_non_exhaustive()
    }
}

fn check_task(task: &Task) -> Result<(), String> {
    if task.id.is_empty() {
        return Err("task id must not be blank".to_string());
    }
    serde_json::to_vec(task)
        .map(drop)
        .map_err(|e| format!("task cannot be encoded: {e}"))
}
