//! Nimbus CLI
//!
//! Command-line access to a Nimbus data directory.
//!
//! # Commands
//!
//! - `get`, `set`, `delete` - Read and write single documents
//! - `query` - Filter a collection or sub-collection, one page at a time
//! - `send`, `receive` - Push and pop queue tasks
//! - `inspect` - Count stored blobs per root

mod commands;

use clap::{Parser, Subcommand};
use nimbus_core::Key;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Nimbus local cloud-emulation tools.
#[derive(Parser)]
#[command(name = "nimbus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Collection to accept (repeatable)
    #[arg(global = true, short, long = "collection")]
    collections: Vec<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a document as JSON
    Get {
        /// Document key as `collection:id`
        #[arg(value_parser = commands::parse_key)]
        key: Key,

        /// Child key as `sub-collection:id`
        #[arg(long, value_parser = commands::parse_key)]
        sub: Option<Key>,
    },

    /// Create or replace a document
    Set {
        /// Document key as `collection:id`
        #[arg(value_parser = commands::parse_key)]
        key: Key,

        /// JSON object content, or `-` to read it from stdin
        content: String,

        /// Child key as `sub-collection:id`
        #[arg(long, value_parser = commands::parse_key)]
        sub: Option<Key>,
    },

    /// Delete a document and, for a parent, all of its children
    Delete {
        /// Document key as `collection:id`
        #[arg(value_parser = commands::parse_key)]
        key: Key,

        /// Child key as `sub-collection:id`
        #[arg(long, value_parser = commands::parse_key)]
        sub: Option<Key>,
    },

    /// Query a collection, a document or a sub-collection
    Query {
        /// `collection` for a scan, or `collection:id`
        #[arg(value_parser = commands::parse_key)]
        key: Key,

        /// Sub-collection to search under the key
        #[arg(short, long, default_value = "")]
        sub_collection: String,

        /// Filter as `"field op value"` (repeatable)
        #[arg(short, long = "where")]
        filters: Vec<String>,

        /// Page size (0 for everything)
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Paging token from a previous page
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Send a JSON array of tasks to a queue
    Send {
        /// Queue name
        queue: String,

        /// JSON task array, or `-` to read it from stdin
        tasks: String,
    },

    /// Pop tasks from a queue
    Receive {
        /// Queue name
        queue: String,

        /// Maximum number of tasks to pop
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Count stored blobs per root
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let collections = cli.collections;
    match cli.command {
        Commands::Get { key, sub } => {
            let path = cli.path.ok_or("Data directory required for get")?;
            commands::document::get(&path, collections, &key, sub.as_ref())?;
        }
        Commands::Set { key, content, sub } => {
            let path = cli.path.ok_or("Data directory required for set")?;
            let content = commands::read_argument(content)?;
            commands::document::set(&path, collections, &key, sub.as_ref(), &content)?;
        }
        Commands::Delete { key, sub } => {
            let path = cli.path.ok_or("Data directory required for delete")?;
            commands::document::delete(&path, collections, &key, sub.as_ref())?;
        }
        Commands::Query {
            key,
            sub_collection,
            filters,
            limit,
            token,
        } => {
            let path = cli.path.ok_or("Data directory required for query")?;
            commands::query::run(
                &path,
                collections,
                &key,
                &sub_collection,
                &filters,
                limit,
                token,
            )?;
        }
        Commands::Send { queue, tasks } => {
            let path = cli.path.ok_or("Data directory required for send")?;
            let tasks = commands::read_argument(tasks)?;
            commands::queue::send(&path, &queue, &tasks)?;
        }
        Commands::Receive { queue, depth } => {
            let path = cli.path.ok_or("Data directory required for receive")?;
            commands::queue::receive(&path, &queue, depth)?;
        }
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Data directory required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Version => {
            println!("Nimbus CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Nimbus Core v{}", nimbus_core::VERSION);
        }
    }

    Ok(())
}
