//! Task commands: add, list, toggle, edit, delete, summary.

use serde::Serialize;

use crate::controller::{Controller, EditPrompt, Event, Reply, Scripted};
use crate::error::Result;
use crate::filter::Filter;
use crate::kv::FileStore;
use crate::output::{emit_success, HumanOutput};
use crate::render;
use crate::task::{Change, NoChange, Task, TaskId};

use super::editor::ExternalEditor;
use super::Session;

#[derive(Serialize)]
struct ChangeReport<'a> {
    #[serde(flatten)]
    change: Change,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<&'a Task>,
    remaining: usize,
    summary: &'a str,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    total: usize,
    remaining: usize,
    completed: usize,
    summary: &'a str,
}

pub(super) fn add(session: &Session, text: &str) -> Result<()> {
    let mut controller = session.open();
    controller.set_input(text);
    apply(session, "add", &mut controller, Event::Submit, &mut Scripted::new())
}

pub(super) fn toggle(session: &Session, id: TaskId) -> Result<()> {
    let mut controller = session.open();
    apply(session, "toggle", &mut controller, Event::Toggle(id), &mut Scripted::new())
}

pub(super) fn delete(session: &Session, id: TaskId) -> Result<()> {
    let mut controller = session.open();
    apply(session, "delete", &mut controller, Event::Delete(id), &mut Scripted::new())
}

pub(super) fn edit(session: &Session, id: TaskId, text: Option<String>) -> Result<()> {
    let mut controller = session.open();
    match text {
        Some(text) => apply(
            session,
            "edit",
            &mut controller,
            Event::Edit(id),
            &mut Reply::confirm(text),
        ),
        None => {
            let mut editor = ExternalEditor::new();
            let before = controller.store().get(id).cloned();
            controller.dispatch(Event::Edit(id), &mut editor);
            if let Some(err) = editor.take_error() {
                return Err(err);
            }
            finish(session, "edit", &mut controller, before)
        }
    }
}

pub(super) fn list(session: &Session, filter: Filter) -> Result<()> {
    let mut controller = session.open();
    let view = controller.dispatch(Event::SelectFilter(filter), &mut Scripted::new());

    let mut lines = render::plain(&view).into_iter();
    let mut human = HumanOutput::new(lines.next().unwrap_or_default());
    for line in lines {
        human.push_line(line);
    }
    emit_success(session.output, "list", &view, Some(&human))
}

pub(super) fn summary(session: &Session) -> Result<()> {
    let controller = session.open();
    let store = controller.store();
    let text = render::summary_text(store.remaining_count());
    let report = SummaryReport {
        total: store.len(),
        remaining: store.remaining_count(),
        completed: store.completed_count(),
        summary: &text,
    };
    let human = HumanOutput::new(text.clone());
    emit_success(session.output, "summary", &report, Some(&human))
}

fn apply(
    session: &Session,
    command: &str,
    controller: &mut Controller<FileStore>,
    event: Event,
    prompt: &mut dyn EditPrompt,
) -> Result<()> {
    let before = match event {
        Event::Toggle(id) | Event::Delete(id) | Event::Edit(id) => {
            controller.store().get(id).cloned()
        }
        Event::Submit | Event::SelectFilter(_) => None,
    };
    controller.dispatch(event, prompt);
    finish(session, command, controller, before)
}

/// Report the last change, failing if it could not be saved.
fn finish(
    session: &Session,
    command: &str,
    controller: &mut Controller<FileStore>,
    before: Option<Task>,
) -> Result<()> {
    if let Some(err) = controller.store_mut().take_save_error() {
        return Err(err);
    }
    let change = controller.last_change().unwrap_or(Change::Unchanged {
        reason: NoChange::UnknownId,
    });
    let store = controller.store();
    let task = change.task_id().and_then(|id| store.get(id)).or(before.as_ref());
    let summary = render::summary_text(store.remaining_count());

    let mut human = HumanOutput::new(describe(command, change, task));
    human.push_line(summary.clone());
    if matches!(
        change,
        Change::Unchanged {
            reason: NoChange::UnknownId
        }
    ) {
        human.push_next_step("todo list");
    }

    let report = ChangeReport {
        change,
        task,
        remaining: store.remaining_count(),
        summary: &summary,
    };
    emit_success(session.output, command, &report, Some(&human))
}

fn describe(command: &str, change: Change, task: Option<&Task>) -> String {
    let text = task.map(|task| task.text.as_str()).unwrap_or("");
    match change {
        Change::Added { id } => format!("Added #{id}: {text}"),
        Change::Toggled {
            id,
            completed: true,
        } => format!("Completed #{id}: {text}"),
        Change::Toggled {
            id,
            completed: false,
        } => format!("Reopened #{id}: {text}"),
        Change::Edited { id } => format!("Edited #{id}: {text}"),
        Change::Deleted { id } => format!("Deleted #{id}: {text}"),
        Change::Unchanged {
            reason: NoChange::EmptyText,
        } if command == "add" => "Nothing to add: text is empty".to_string(),
        Change::Unchanged { reason } => format!("Unchanged: {reason}"),
    }
}
