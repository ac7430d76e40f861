//! Queue command implementations.

use nimbus_core::{ReceiveOptions, Task};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Sends a JSON array of tasks. Tasks without an `ID` get a random one.
pub fn send(path: &Path, queue: &str, tasks: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = parse_tasks(tasks)?;
    let count = tasks.len();

    let backend = super::open(path, Vec::new())?;
    let response = backend.queues().send_batch(queue, tasks)?;

    for failed in &response.failed_tasks {
        eprintln!("Rejected task {:?}: {}", failed.task.id, failed.message);
    }
    println!(
        "Sent {} of {count} task(s) to {queue}",
        count - response.failed_tasks.len()
    );
    Ok(())
}

/// Pops up to `depth` tasks and prints them as JSON.
pub fn receive(
    path: &Path,
    queue: &str,
    depth: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::open(path, Vec::new())?;
    let mut options = ReceiveOptions::new(queue);
    if let Some(depth) = depth {
        options = options.depth(depth);
    }
    let tasks = backend.queues().receive(options)?;
    println!("{}", serde_json::to_string_pretty(&tasks)?);
    Ok(())
}

fn parse_tasks(input: &str) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let Value::Array(mut items) = serde_json::from_str(input)? else {
        return Err("tasks must be a JSON array".into());
    };
    for item in &mut items {
        if let Value::Object(fields) = item {
            if !fields.contains_key("ID") {
                let id = uuid::Uuid::new_v4().to_string();
                debug!(id = %id, "assigned task id");
                fields.insert("ID".to_string(), Value::String(id));
            }
        }
    }
    Ok(serde_json::from_value(Value::Array(items))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_ids_are_generated() {
        let tasks = parse_tasks(r#"[{"ID": "a"}, {"PayloadType": "resize"}]"#).unwrap();
        assert_eq!(tasks[0].id, "a");
        assert_eq!(tasks[1].payload_type, "resize");
        assert!(uuid::Uuid::parse_str(&tasks[1].id).is_ok());
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(parse_tasks(r#"{"ID": "a"}"#).is_err());
    }

    #[test]
    fn send_then_receive_through_directory() {
        let dir = tempdir().unwrap();
        send(dir.path(), "jobs", r#"[{"ID": "1"}, {"ID": "2"}]"#).unwrap();
        receive(dir.path(), "jobs", Some(1)).unwrap();

        let backend = super::super::open(dir.path(), Vec::new()).unwrap();
        let rest = backend.queues().receive(ReceiveOptions::new("jobs")).unwrap();
        assert_eq!(rest, vec![Task::new("2", "")]);
    }
}
