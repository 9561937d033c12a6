//! Task store: the authoritative ordered list of tasks.
//!
//! Insertion order is display order. Every mutator is total: bad input or an
//! unknown id is a no-op reported through [`Change::Unchanged`], never an
//! error. Accepted mutations are written through the [`TaskRepository`]
//! before the mutator returns; a failed write is logged and parked in
//! [`TaskStore::take_save_error`] while the in-memory list stays
//! authoritative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::persist::TaskRepository;

/// Task identifier, unique within a store and stable across reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        value
            .trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| Error::InvalidArgument(format!("invalid task id '{value}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

/// Why a mutator left the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoChange {
    EmptyText,
    UnknownId,
    /// The edit prompt was dismissed.
    Cancelled,
}

impl fmt::Display for NoChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoChange::EmptyText => write!(f, "text is empty"),
            NoChange::UnknownId => write!(f, "no such task"),
            NoChange::Cancelled => write!(f, "edit cancelled"),
        }
    }
}

/// Outcome of a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    Added { id: TaskId },
    Toggled { id: TaskId, completed: bool },
    Edited { id: TaskId },
    Deleted { id: TaskId },
    Unchanged { reason: NoChange },
}

impl Change {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Change::Unchanged { .. })
    }

    pub fn task_id(&self) -> Option<TaskId> {
        match *self {
            Change::Added { id }
            | Change::Toggled { id, .. }
            | Change::Edited { id }
            | Change::Deleted { id } => Some(id),
            Change::Unchanged { .. } => None,
        }
    }
}

/// The in-memory task list plus its persistence adapter.
#[derive(Debug)]
pub struct TaskStore<K> {
    tasks: Vec<Task>,
    repo: TaskRepository<K>,
    save_error: Option<Error>,
}

impl<K: KeyValueStore> TaskStore<K> {
    /// Open a store, loading whatever the repository holds.
    pub fn open(repo: TaskRepository<K>) -> Self {
        let tasks = repo.load();
        Self {
            tasks,
            repo,
            save_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks not yet completed, across the whole store.
    pub fn remaining_count(&self) -> usize {
        remaining_count(&self.tasks)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.remaining_count()
    }

    pub fn repository(&self) -> &TaskRepository<K> {
        &self.repo
    }

    pub fn into_repository(self) -> TaskRepository<K> {
        self.repo
    }

    /// Take the error from the most recent failed save, if any.
    pub fn take_save_error(&mut self) -> Option<Error> {
        self.save_error.take()
    }

    /// Append a task with the trimmed text. Blank text is a no-op.
    pub fn add(&mut self, text: &str) -> Change {
        let text = text.trim();
        if text.is_empty() {
            return Change::Unchanged {
                reason: NoChange::EmptyText,
            };
        }
        let id = next_id(&self.tasks);
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
        });
        tracing::debug!(%id, "task added");
        self.persist();
        Change::Added { id }
    }

    /// Flip the completed flag of `id`.
    pub fn toggle(&mut self, id: TaskId) -> Change {
        let change = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                tracing::debug!(%id, completed = task.completed, "task toggled");
                Change::Toggled {
                    id,
                    completed: task.completed,
                }
            }
            None => Change::Unchanged {
                reason: NoChange::UnknownId,
            },
        };
        self.persist();
        change
    }

    /// Replace the text of `id` with the trimmed `text`. Blank text is a no-op.
    pub fn edit(&mut self, id: TaskId, text: &str) -> Change {
        let text = text.trim();
        if text.is_empty() {
            return Change::Unchanged {
                reason: NoChange::EmptyText,
            };
        }
        let change = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.text = text.to_string();
                tracing::debug!(%id, "task edited");
                Change::Edited { id }
            }
            None => Change::Unchanged {
                reason: NoChange::UnknownId,
            },
        };
        self.persist();
        change
    }

    /// Remove `id` from the store.
    pub fn delete(&mut self, id: TaskId) -> Change {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let change = if self.tasks.len() < before {
            tracing::debug!(%id, "task deleted");
            Change::Deleted { id }
        } else {
            Change::Unchanged {
                reason: NoChange::UnknownId,
            }
        };
        self.persist();
        change
    }

    fn persist(&mut self) {
        match self.repo.save(&self.tasks) {
            Ok(()) => {
                self.save_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to save tasks; keeping in-memory state");
                self.save_error = Some(Error::SaveFailed(err.to_string()));
            }
        }
    }
}

/// Count of tasks that are not completed.
pub fn remaining_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.completed).count()
}

/// A fresh id: one past the largest id in use, or 1 for an empty list.
///
/// If the largest id is `u64::MAX` the smallest unused id is taken instead.
pub fn next_id(tasks: &[Task]) -> TaskId {
    let max = tasks.iter().map(|task| task.id.get()).max();
    match max {
        None => TaskId(1),
        Some(max) => match max.checked_add(1) {
            Some(next) => TaskId(next),
            None => smallest_unused_id(tasks),
        },
    }
}

fn smallest_unused_id(tasks: &[Task]) -> TaskId {
    let mut used: Vec<u64> = tasks.iter().map(|task| task.id.get()).collect();
    used.sort_unstable();
    let mut candidate = 1u64;
    for id in used {
        if id == candidate {
            candidate += 1;
        } else if id > candidate {
            break;
        }
    }
    TaskId(candidate)
}
