//! Pure projection of (tasks, filter) into a view model.
//!
//! [`project`] is deterministic: the same tasks and filter always produce the
//! same [`View`]. Painters ([`plain`] here, `ui::view` for the terminal) only
//! lay out what the view model already decided. Task text is carried as a
//! plain string and is only ever emitted as literal text.

use serde::Serialize;

use crate::filter::{self, Filter};
use crate::task::{self, Task, TaskId};

/// Placeholder shown when the filtered view has no entries.
pub const EMPTY_STATE: &str = "No tasks here yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Edit,
    Delete,
}

impl Control {
    pub fn label(self) -> &'static str {
        match self {
            Control::Edit => "edit",
            Control::Delete => "del",
        }
    }
}

/// One row of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: TaskId,
    /// Checkbox state.
    pub checked: bool,
    pub text: String,
    /// Marks the row with the completed visual state.
    pub completed: bool,
    pub controls: [Control; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub filter: Filter,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub filter: Filter,
    pub entries: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<&'static str>,
    /// Incomplete tasks across the whole store, whatever the filter.
    pub remaining: usize,
    pub summary: String,
    pub chips: [Chip; 3],
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_chip(&self) -> Option<&Chip> {
        self.chips.iter().find(|chip| chip.active)
    }

    /// Entry texts in display order.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.text.as_str()).collect()
    }
}

/// "1 task remaining" or "N tasks remaining".
pub fn summary_text(remaining: usize) -> String {
    if remaining == 1 {
        "1 task remaining".to_string()
    } else {
        format!("{remaining} tasks remaining")
    }
}

/// Build the full view for `tasks` under `filter`.
pub fn project(tasks: &[Task], filter: Filter) -> View {
    let entries: Vec<Entry> = filter::visible(tasks, filter)
        .into_iter()
        .map(|task| Entry {
            id: task.id,
            checked: task.completed,
            text: task.text.clone(),
            completed: task.completed,
            controls: [Control::Edit, Control::Delete],
        })
        .collect();
    let empty_state = entries.is_empty().then_some(EMPTY_STATE);
    let remaining = task::remaining_count(tasks);
    let chips = Filter::ALL.map(|candidate| Chip {
        filter: candidate,
        label: candidate.label(),
        active: candidate == filter,
    });

    View {
        filter,
        entries,
        empty_state,
        remaining,
        summary: summary_text(remaining),
        chips,
    }
}

/// Plain-text rendering used by the command line.
pub fn plain(view: &View) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.entries.len() + 2);
    let chips: Vec<String> = view
        .chips
        .iter()
        .map(|chip| {
            if chip.active {
                format!("[{}]", chip.label)
            } else {
                chip.label.to_string()
            }
        })
        .collect();
    lines.push(chips.join("  "));

    if let Some(empty) = view.empty_state {
        lines.push(format!("  {empty}"));
    }
    let id_width = view
        .entries
        .iter()
        .map(|entry| entry.id.to_string().len())
        .max()
        .unwrap_or(1);
    for entry in &view.entries {
        lines.push(format!(
            "  {:>id_width$}  {}  {}",
            entry.id,
            checkbox(entry.checked),
            entry.text
        ));
    }
    lines.push(view.summary.clone());
    lines
}

pub fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}
