//! File-based persistence driver.
//!
//! Layout of a data directory:
//!
//! ```text
//! <root>/
//! ├─ LOCK                                      # Advisory lock for single-process access
//! └─ nitric.d/
//!    ├─ documents.d/customers.d/1000.blob      # blob for "/nitric/documents/customers/1000"
//!    ├─ documents.d/customers.d/1000.d/orders.d/501.blob
//!    └─ queues.d/jobs.blob
//! ```
//!
//! Every segment but the last maps to a `.d` directory and the last to a
//! `.blob` file, so a blob and the directory holding its sub-collections
//! live side by side and no segment text can make the two collide.

use crate::driver::{validate_path, PersistenceDriver};
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const BLOB_EXTENSION: &str = "blob";
const DIR_EXTENSION: &str = "d";
const TEMP_EXTENSION: &str = "tmp";

/// A persistence driver storing one file per blob under a root directory.
///
/// Data survives process restarts.
///
/// # Durability
///
/// - `put` writes a temporary file, syncs it, then renames it over the
///   target, so readers see either the old or the new blob, never a torn one
/// - The root directory is guarded by an exclusive advisory lock; a second
///   `FileDriver::open` on the same directory fails with
///   [`StorageError::Locked`]
/// - `delete` removes directories left empty, up to the root
///
/// # Example
///
/// ```no_run
/// use nimbus_storage::{FileDriver, PersistenceDriver};
/// use std::path::Path;
///
/// let driver = FileDriver::open(Path::new(".nimbus")).unwrap();
/// driver.put("/nitric/queues/jobs", b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileDriver {
    root: PathBuf,
    /// Held shared by writers and exclusively while pruning directories.
    layout: RwLock<()>,
    _lock_file: File,
}

impl FileDriver {
    /// Opens or creates a data directory and takes its exclusive lock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists and is not a directory
    /// - Another process holds the lock ([`StorageError::Locked`])
    /// - I/O errors occur
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;

        if !root.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", root.display()),
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked(root.display().to_string()));
        }

        tracing::debug!(root = %root.display(), "opened file driver");

        Ok(Self {
            root: root.to_path_buf(),
            layout: RwLock::new(()),
            _lock_file: lock_file,
        })
    }

    /// Returns the root data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a blob path to its file location.
    fn blob_file(&self, path: &str) -> StorageResult<PathBuf> {
        validate_path(path)?;
        let segments: Vec<&str> = path[1..].split('/').collect();
        let Some((name, dirs)) = segments.split_last() else {
            return Err(StorageError::invalid_path(path, "must name a blob"));
        };
        let mut file = self.root.clone();
        for dir in dirs {
            file.push(format!("{dir}.{DIR_EXTENSION}"));
        }
        file.push(format!("{name}.{BLOB_EXTENSION}"));
        Ok(file)
    }

    /// Directory that contains every blob whose path starts with `prefix`.
    fn scan_root(&self, prefix: &str) -> PathBuf {
        let mut dir = self.root.clone();
        let Some(cut) = prefix.rfind('/') else {
            return dir;
        };
        for segment in prefix[..cut].split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return self.root.clone();
            }
            dir.push(format!("{segment}.{DIR_EXTENSION}"));
        }
        dir
    }

    fn collect(&self, dir: &Path, prefix: &str, out: &mut Vec<String>) -> StorageResult<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let entry_path = entry.path();

            if file_type.is_dir() {
                if entry_path.extension().and_then(|e| e.to_str()) == Some(DIR_EXTENSION) {
                    self.collect(&entry_path, prefix, out)?;
                }
                continue;
            }

            if entry_path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }

            if let Some(blob_path) = self.blob_path(&entry_path) {
                if blob_path.starts_with(prefix) {
                    out.push(blob_path);
                }
            }
        }

        Ok(())
    }

    /// Maps a file location back to its blob path.
    fn blob_path(&self, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(&self.root).ok()?;
        let names = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        let (name, dirs) = names.split_last()?;

        let mut path = String::new();
        for dir in dirs {
            path.push('/');
            path.push_str(dir.strip_suffix(DIR_EXTENSION)?.strip_suffix('.')?);
        }
        path.push('/');
        path.push_str(name.strip_suffix(BLOB_EXTENSION)?.strip_suffix('.')?);
        Some(path)
    }

    /// Removes empty directories from `dir` up to, not including, the root.
    fn prune(&self, mut dir: &Path) {
        let _layout = self.layout.write();
        while dir != self.root.as_path() && dir.starts_with(&self.root) {
            if fs::remove_dir(dir).is_err() {
                break;
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
}

impl PersistenceDriver for FileDriver {
    fn get(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        let file = self.blob_file(path)?;
        match fs::read(&file) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let file = self.blob_file(path)?;
        let _layout = self.layout.read();
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = file.with_extension(format!(
            "{BLOB_EXTENSION}.{:016x}.{TEMP_EXTENSION}",
            rand::random::<u64>()
        ));

        let mut handle = File::create(&temp)?;
        handle.write_all(data)?;
        handle.sync_all()?;
        drop(handle);

        if let Err(e) = fs::rename(&temp, &file) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        Ok(())
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        let file = self.blob_file(path)?;
        match fs::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        if let Some(parent) = file.parent() {
            self.prune(parent);
        }
        Ok(())
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut paths = Vec::new();
        self.collect(&self.scan_root(prefix), prefix, &mut paths)?;
        paths.sort();
        Ok(paths)
    }
}
