//! Document command implementations.

use nimbus_core::Key;
use serde_json::Value;
use std::path::Path;

/// Prints the document at `key` (or its child `sub`).
pub fn get(
    path: &Path,
    collections: Vec<String>,
    key: &Key,
    sub: Option<&Key>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::open(path, collections)?;
    let document = backend.documents().get(key, sub)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Stores `content` at `key` (or its child `sub`).
pub fn set(
    path: &Path,
    collections: Vec<String>,
    key: &Key,
    sub: Option<&Key>,
    content: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let content: Value = serde_json::from_str(content)?;
    let backend = super::open(path, collections)?;
    backend.documents().set(key, sub, content)?;
    println!("Stored {}", describe(key, sub));
    Ok(())
}

/// Deletes the document at `key` (or its child `sub`).
pub fn delete(
    path: &Path,
    collections: Vec<String>,
    key: &Key,
    sub: Option<&Key>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::open(path, collections)?;
    backend.documents().delete(key, sub)?;
    println!("Deleted {}", describe(key, sub));
    Ok(())
}

fn describe(key: &Key, sub: Option<&Key>) -> String {
    match sub {
        Some(sub) => format!("{key}/{sub}"),
        None => key.to_string(),
    }
}
