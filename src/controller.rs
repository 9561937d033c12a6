//! Input controller: turns host events into store and filter operations.
//!
//! Every dispatched event returns a fresh [`View`] built from the whole
//! store, so hosts never patch a previous render.

use std::collections::VecDeque;

use crate::filter::{Filter, FilterState};
use crate::kv::KeyValueStore;
use crate::render::{self, View};
use crate::task::{Change, NoChange, TaskId, TaskStore};

/// Something the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Add control activated, or Enter pressed in the input field.
    Submit,
    Toggle(TaskId),
    Delete(TaskId),
    /// Edit control activated; the replacement comes from an [`EditPrompt`].
    Edit(TaskId),
    SelectFilter(Filter),
}

/// Asks the user for a replacement text.
///
/// `Some` is a confirmation (possibly empty or unchanged), `None` a cancel.
pub trait EditPrompt {
    fn request(&mut self, id: TaskId, current: &str) -> Option<String>;
}

/// Canned answers, consumed in order. Records every request it receives.
/// An exhausted script cancels.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    answers: VecDeque<Option<String>>,
    asked: Vec<(TaskId, String)>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm(mut self, text: impl Into<String>) -> Self {
        self.answers.push_back(Some(text.into()));
        self
    }

    pub fn cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    /// Every `(id, current text)` the controller asked about.
    pub fn asked(&self) -> &[(TaskId, String)] {
        &self.asked
    }
}

impl EditPrompt for Scripted {
    fn request(&mut self, id: TaskId, current: &str) -> Option<String> {
        self.asked.push((id, current.to_string()));
        self.answers.pop_front().flatten()
    }
}

/// A single answer that is already known, such as the result of a closed
/// modal or a command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(Option<String>);

impl Reply {
    pub fn confirm(text: impl Into<String>) -> Self {
        Self(Some(text.into()))
    }

    pub fn cancel() -> Self {
        Self(None)
    }
}

impl EditPrompt for Reply {
    fn request(&mut self, _id: TaskId, _current: &str) -> Option<String> {
        self.0.take()
    }
}

/// Owns the store, the filter and the input field.
#[derive(Debug)]
pub struct Controller<K> {
    store: TaskStore<K>,
    filter: FilterState,
    input: String,
    last_change: Option<Change>,
}

impl<K: KeyValueStore> Controller<K> {
    pub fn new(store: TaskStore<K>) -> Self {
        Self {
            store,
            filter: FilterState::new(),
            input: String::new(),
            last_change: None,
        }
    }

    pub fn store(&self) -> &TaskStore<K> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore<K> {
        &mut self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter.current()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Outcome of the last store operation, if the last event had one.
    pub fn last_change(&self) -> Option<Change> {
        self.last_change
    }

    /// Current render of (store, filter).
    pub fn view(&self) -> View {
        render::project(self.store.tasks(), self.filter.current())
    }

    /// Apply one event and return the full re-render.
    pub fn dispatch(&mut self, event: Event, prompt: &mut dyn EditPrompt) -> View {
        self.last_change = match event {
            Event::Submit => {
                let change = self.store.add(&self.input);
                if change.is_changed() {
                    self.input.clear();
                }
                Some(change)
            }
            Event::Toggle(id) => Some(self.store.toggle(id)),
            Event::Delete(id) => Some(self.store.delete(id)),
            Event::Edit(id) => Some(self.edit(id, prompt)),
            Event::SelectFilter(filter) => {
                tracing::debug!(filter = %filter, "filter selected");
                self.filter.set(filter);
                None
            }
        };
        self.view()
    }

    fn edit(&mut self, id: TaskId, prompt: &mut dyn EditPrompt) -> Change {
        let current = match self.store.get(id) {
            Some(task) => task.text.clone(),
            None => {
                return Change::Unchanged {
                    reason: NoChange::UnknownId,
                }
            }
        };
        match prompt.request(id, &current) {
            Some(replacement) => self.store.edit(id, &replacement),
            None => {
                tracing::debug!(%id, "edit cancelled");
                Change::Unchanged {
                    reason: NoChange::Cancelled,
                }
            }
        }
    }
}
