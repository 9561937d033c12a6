//! String key/value stores backing task persistence
//!
//! The task list lives under a single key as a serialized blob. Two stores
//! implement [`KeyValueStore`]:
//!
//! - [`MemoryStore`]: in-process map, shared between clones
//! - [`FileStore`]: one JSON object file mapping key to string value
//!
//! ```text
//! store.json          # {"todos": "[{\"id\":1,\"text\":\"buy milk\",\"completed\":false}]"}
//! store.json.lock     # advisory lock taken around every write
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::Result;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// A string key/value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Clones share the same map, so a second handle observes
/// everything written through the first.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a single entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Raw value under `key`, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: a single JSON object of string values.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A missing file is an empty map; a file that is not
    /// a JSON object of strings reads as empty too.
    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "store file is not a string map; treating as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), self.lock_timeout_ms)?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&entries)?;
        lock::write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), key, bytes = value.len(), "store written");
        Ok(())
    }
}
