//! View selector over the task list. Never touches the store.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Chip order.
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// Lowercase tag used on the command line and in JSON.
    pub fn tag(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Chip label.
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown filter '{other}' (expected all, active or completed)"
            ))),
        }
    }
}

/// The current filter. Starts at [`Filter::All`] and is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    current: Filter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, filter: Filter) {
        self.current = filter;
    }

    pub fn current(&self) -> Filter {
        self.current
    }
}

/// Tasks visible under `filter`, in store order.
pub fn visible(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}
