//! Queue task records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A unit of work carried by a queue.
///
/// Serializes with the field names `ID`, `PayloadType` and `Payload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Caller-chosen task id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Free-form payload type tag.
    #[serde(rename = "PayloadType", default)]
    pub payload_type: String,
    /// Task body.
    #[serde(rename = "Payload", default, deserialize_with = "null_as_empty")]
    pub payload: Map<String, Value>,
}

impl Task {
    /// Creates a task with an empty payload.
    pub fn new(id: impl Into<String>, payload_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload_type: payload_type.into(),
            payload: Map::new(),
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A task that was rejected from a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTask {
    /// The rejected task.
    pub task: Task,
    /// Why it was rejected.
    pub message: String,
}

/// Outcome of a batch send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Tasks that were not enqueued. Every other task was.
    pub failed_tasks: Vec<FailedTask>,
}

impl BatchResponse {
    /// Returns true if every task was enqueued.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_tasks.is_empty()
    }
}

/// Arguments of a receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveOptions {
    /// Queue to pop from.
    pub queue_name: String,
    /// Maximum number of tasks to pop; the store default when `None`.
    pub depth: Option<u32>,
}

impl ReceiveOptions {
    /// Receives from `queue_name` with the default depth.
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            depth: None,
        }
    }

    /// Sets the depth.
    #[must_use]
    pub const fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }
}
