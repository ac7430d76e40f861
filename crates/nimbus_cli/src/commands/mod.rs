//! CLI command implementations.

pub mod document;
pub mod inspect;
pub mod query;
pub mod queue;

use nimbus_core::{Key, LocalBackend, StoreConfig};
use std::io::Read;
use std::path::Path;

/// Parses `collection:id`, or a bare `collection` for a whole-collection key.
pub fn parse_key(s: &str) -> Result<Key, String> {
    match s.split_once(':') {
        Some((collection, _)) if collection.is_empty() => {
            Err(format!("missing collection in key {s:?}"))
        }
        Some((collection, id)) => Ok(Key::new(collection, id)),
        None if s.is_empty() => Err("key must not be empty".to_string()),
        None => Ok(Key::collection(s)),
    }
}

/// Returns `value`, or stdin when `value` is `-`.
pub fn read_argument(value: String) -> std::io::Result<String> {
    if value != "-" {
        return Ok(value);
    }
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn open(path: &Path, collections: Vec<String>) -> Result<LocalBackend, Box<dyn std::error::Error>> {
    let config = StoreConfig::new().collections(collections);
    Ok(LocalBackend::open_dir(path, config)?)
}
