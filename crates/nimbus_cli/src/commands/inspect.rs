//! Inspect command implementation.

use nimbus_core::key::unescape_segment;
use nimbus_core::StoreConfig;
use nimbus_storage::{FileDriver, PersistenceDriver};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Data directory inspection result.
#[derive(Debug, Default, Serialize)]
pub struct InspectResult {
    /// Data directory path.
    pub path: String,
    /// Number of stored documents, children included.
    pub documents: usize,
    /// Number of sub-collection index blobs.
    pub indexes: usize,
    /// Pending task count per queue.
    pub queues: BTreeMap<String, usize>,
    /// Blobs outside the known roots.
    pub other: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(format!("No data directory found at {:?}", path).into());
    }

    let driver = FileDriver::open(path)?;
    let result = inspect(&driver, &StoreConfig::default(), path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Counts blobs under each configured root.
pub fn inspect(
    driver: &dyn PersistenceDriver,
    config: &StoreConfig,
    path: &Path,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut result = InspectResult {
        path: path.display().to_string(),
        ..InspectResult::default()
    };

    let document_prefix = format!("{}/", config.document_root);
    let index_prefix = format!("{}/", config.index_root);
    let queue_prefix = format!("{}/", config.queue_root);

    for blob in driver.list("/")? {
        if blob.starts_with(&document_prefix) {
            result.documents += 1;
        } else if blob.starts_with(&index_prefix) {
            result.indexes += 1;
        } else if let Some(name) = blob.strip_prefix(&queue_prefix) {
            let pending = match driver.get(&blob)? {
                Some(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                    Value::Array(tasks) => tasks.len(),
                    _ => 0,
                },
                None => 0,
            };
            let name = unescape_segment(name).unwrap_or_else(|| name.to_string());
            result.queues.insert(name, pending);
        } else {
            result.other += 1;
        }
    }

    Ok(result)
}

fn print_text_output(result: &InspectResult) {
    println!("Data directory: {}", result.path);
    println!();
    println!("Documents:      {}", result.documents);
    println!("Index blobs:    {}", result.indexes);
    println!("Other blobs:    {}", result.other);

    if !result.queues.is_empty() {
        println!();
        println!("Queues:");
        for (name, pending) in &result.queues {
            println!("  {:<24} {} pending", name, pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::{Key, LocalBackend, Task};
    use nimbus_storage::InMemoryDriver;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn counts_blobs_per_root() {
        let driver = Arc::new(InMemoryDriver::new());
        let config = StoreConfig::new().collection("customers");
        let backend = LocalBackend::open(driver.clone(), config.clone()).unwrap();

        let customer = Key::new("customers", "1000");
        backend.documents().set(&customer, None, json!({})).unwrap();
        backend
            .documents()
            .set(&customer, Some(&Key::new("orders", "501")), json!({}))
            .unwrap();
        backend
            .queues()
            .send_batch("jobs", vec![Task::new("1", ""), Task::new("2", "")])
            .unwrap();

        let result = inspect(driver.as_ref(), &config, Path::new("mem")).unwrap();
        assert_eq!(result.documents, 2);
        assert_eq!(result.indexes, 1);
        assert_eq!(result.queues.get("jobs"), Some(&2));
        // The paging token secret.
        assert_eq!(result.other, 1);
    }
}
