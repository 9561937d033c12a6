//! Persistence adapter: the whole task list as one blob under one key.
//!
//! The blob is a JSON array of `{id, text, completed}` records. Loading never
//! fails observably: a missing key, unreadable store, or blob of the wrong
//! shape all load as an empty list.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::task::Task;

/// Reads and writes the serialized task list under a fixed key.
#[derive(Debug, Clone)]
pub struct TaskRepository<K> {
    key: String,
    kv: K,
}

impl<K: KeyValueStore> TaskRepository<K> {
    pub fn new(key: impl Into<String>, kv: K) -> Self {
        Self {
            key: key.into(),
            kv,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn into_kv(self) -> K {
        self.kv
    }

    /// Load the stored task list, degrading every failure to an empty list.
    pub fn load(&self) -> Vec<Task> {
        let blob = match self.kv.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "task store unreadable; starting empty");
                return Vec::new();
            }
        };
        match decode(&blob) {
            Ok(tasks) => {
                tracing::debug!(key = %self.key, count = tasks.len(), "tasks loaded");
                tasks
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "stored tasks malformed; starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored blob with `tasks`.
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let blob = encode(tasks)?;
        self.kv.set(&self.key, &blob)
    }
}

/// Serialize tasks in store order.
pub fn encode(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Parse a stored blob.
///
/// Shape errors fail the whole blob. Records that parse but break the list
/// invariants are repaired: text is trimmed, blank entries are dropped, and
/// a repeated id keeps only its first record.
pub fn decode(blob: &str) -> Result<Vec<Task>> {
    let records: Vec<Task> = serde_json::from_str(blob).map_err(Error::Json)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut tasks = Vec::with_capacity(records.len());
    for mut record in records {
        let trimmed = record.text.trim();
        if trimmed.is_empty() {
            tracing::warn!(id = %record.id, "dropping stored task with blank text");
            continue;
        }
        if !seen.insert(record.id) {
            tracing::warn!(id = %record.id, "dropping stored task with duplicate id");
            continue;
        }
        if trimmed.len() != record.text.len() {
            record.text = trimmed.to_string();
        }
        tasks.push(record);
    }
    Ok(tasks)
}
