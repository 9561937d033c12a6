use std::io;
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use crate::controller::{Controller, EditPrompt, Event, Reply, Scripted};
use crate::error::Result;
use crate::filter::Filter;
use crate::kv::KeyValueStore;
use crate::render::View;
use crate::task::{Change, NoChange, TaskId};

use super::editor::{EditModal, EditorAction, LineInput};
use super::view;

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

pub struct AppState<K> {
    controller: Controller<K>,
    pub(crate) view: View,
    pub(crate) input: LineInput,
    pub(crate) focus: Focus,
    pub(crate) selected: Option<TaskId>,
    pub(crate) edit: Option<EditModal>,
    pub(crate) show_help: bool,
    status_message: Option<String>,
    info_message: Option<String>,
}

impl<K: KeyValueStore> AppState<K> {
    pub fn new(controller: Controller<K>) -> Self {
        let view = controller.view();
        let input = LineInput::with_value(controller.input());
        let selected = view.entries.first().map(|entry| entry.id);
        Self {
            controller,
            view,
            input,
            focus: Focus::Input,
            selected,
            edit: None,
            show_help: false,
            status_message: None,
            info_message: None,
        }
    }

    pub fn controller(&self) -> &Controller<K> {
        &self.controller
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.view.entries.iter().position(|entry| entry.id == id)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        if self.edit.is_some() {
            return "enter save  esc cancel  ctrl+u clear";
        }
        match self.focus {
            Focus::Input => "enter add  tab list  ctrl+u clear  esc list",
            Focus::List => "space toggle  e edit  d delete  1/2/3 filter  tab input  ? help  q quit",
        }
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn clear_messages(&mut self) {
        self.status_message = None;
        self.info_message = None;
    }

    /// Run one event through the controller and re-render everything.
    fn apply(&mut self, event: Event, prompt: &mut dyn EditPrompt) {
        let previous = self.selected_index();
        self.view = self.controller.dispatch(event, prompt);
        if let Some(change) = self.controller.last_change() {
            self.report(change);
        }
        if let Some(err) = self.controller.store_mut().take_save_error() {
            self.set_error(err.to_string());
        }
        self.resolve_selection(previous);
    }

    fn report(&mut self, change: Change) {
        let message = match change {
            Change::Added { id } => format!("added #{id}"),
            Change::Toggled {
                id,
                completed: true,
            } => format!("completed #{id}"),
            Change::Toggled {
                id,
                completed: false,
            } => format!("reopened #{id}"),
            Change::Edited { id } => format!("edited #{id}"),
            Change::Deleted { id } => format!("deleted #{id}"),
            Change::Unchanged { reason } => match reason {
                NoChange::EmptyText => "nothing to save: text is empty".to_string(),
                NoChange::Cancelled => "cancelled".to_string(),
                NoChange::UnknownId => {
                    self.clear_messages();
                    return;
                }
            },
        };
        self.set_info(message);
    }

    /// Keep the selection on the same task when it is still visible,
    /// otherwise fall back to the row nearest the old position.
    fn resolve_selection(&mut self, previous: Option<usize>) {
        if self.selected_index().is_some() {
            return;
        }
        let entries = &self.view.entries;
        self.selected = if entries.is_empty() {
            None
        } else {
            let idx = previous.unwrap_or(0).min(entries.len() - 1);
            Some(entries[idx].id)
        };
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view.entries.len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected_index().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.selected = Some(self.view.entries[next].id);
    }

    fn submit_input(&mut self) {
        self.controller.set_input(self.input.value());
        self.apply(Event::Submit, &mut Scripted::new());
        let accepted = self.controller.input().is_empty();
        self.input.set(self.controller.input());
        if accepted {
            // Select the new row when the current filter shows it.
            if let Some(id) = self.controller.last_change().and_then(|change| change.task_id()) {
                if self.view.entries.iter().any(|entry| entry.id == id) {
                    self.selected = Some(id);
                }
            }
        }
    }

    fn select_filter(&mut self, filter: Filter) {
        self.apply(Event::SelectFilter(filter), &mut Scripted::new());
        self.set_info(format!("showing {}", filter.tag()));
    }

    fn open_editor(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        if let Some(task) = self.controller.store().get(id) {
            self.edit = Some(EditModal::new(id, &task.text));
            self.clear_messages();
        }
    }

    fn close_editor(&mut self, confirmed: bool) {
        let Some(modal) = self.edit.take() else {
            return;
        };
        let id = modal.task_id();
        let mut reply = if confirmed {
            Reply::confirm(modal.into_value())
        } else {
            Reply::cancel()
        };
        self.apply(Event::Edit(id), &mut reply);
    }
}

/// Apply one key press. Returns true when the app should quit.
pub(crate) fn handle_key<K: KeyValueStore>(app: &mut AppState<K>, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(modal) = app.edit.as_mut() {
        match modal.handle_key(key) {
            EditorAction::Submit => app.close_editor(true),
            EditorAction::Cancel => app.close_editor(false),
            EditorAction::None => {}
        }
        return false;
    }

    if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
        app.focus = match app.focus {
            Focus::Input => Focus::List,
            Focus::List => Focus::Input,
        };
        return false;
    }

    match app.focus {
        Focus::Input => match key.code {
            KeyCode::Enter => app.submit_input(),
            KeyCode::Esc => app.focus = Focus::List,
            _ => {
                app.input.handle_key(key);
            }
        },
        Focus::List => return handle_list_key(app, key),
    }
    false
}

fn handle_list_key<K: KeyValueStore>(app: &mut AppState<K>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::Char('G') | KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Char(' ') | KeyCode::Char('x') => {
            if let Some(id) = app.selected {
                app.apply(Event::Toggle(id), &mut Scripted::new());
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = app.selected {
                app.apply(Event::Delete(id), &mut Scripted::new());
            }
        }
        KeyCode::Char('e') | KeyCode::Enter => app.open_editor(),
        KeyCode::Char('1') => app.select_filter(Filter::All),
        KeyCode::Char('2') => app.select_filter(Filter::Active),
        KeyCode::Char('3') => app.select_filter(Filter::Completed),
        KeyCode::Char('f') => {
            let next = app.controller.filter().next();
            app.select_filter(next);
        }
        KeyCode::Char('i') | KeyCode::Char('a') => app.focus = Focus::Input,
        KeyCode::Char('?') => app.show_help = !app.show_help,
        _ => {}
    }
    false
}

pub fn run<K: KeyValueStore>(controller: Controller<K>, poll_ms: u64) -> Result<()> {
    let mut app = AppState::new(controller);
    run_terminal(&mut app, poll_ms)
}

fn run_terminal<K: KeyValueStore>(app: &mut AppState<K>, poll_ms: u64) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(err.into());
        }
    };

    let result = run_loop(&mut terminal, app, poll_ms);

    let restore = restore_terminal(&mut terminal);
    result?;
    restore?;
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn run_loop<B: Backend, K: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut AppState<K>,
    poll_ms: u64,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(poll_ms))? {
            match event::read()? {
                TermEvent::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                TermEvent::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::persist::TaskRepository;
    use crate::task::TaskStore;

    fn app() -> AppState<MemoryStore> {
        let store = TaskStore::open(TaskRepository::new("todos", MemoryStore::new()));
        AppState::new(Controller::new(store))
    }

    fn press(app: &mut AppState<MemoryStore>, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_and_submit(app: &mut AppState<MemoryStore>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn enter_adds_and_keeps_focus_in_input() {
        let mut app = app();
        type_and_submit(&mut app, "buy milk");
        assert_eq!(app.view.texts(), vec!["buy milk"]);
        assert_eq!(app.input.value(), "");
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.selected, Some(TaskId::new(1)));
    }

    #[test]
    fn whitespace_submit_keeps_input_text() {
        let mut app = app();
        type_and_submit(&mut app, "   ");
        assert!(app.view.is_empty());
        assert_eq!(app.input.value(), "   ");
    }

    #[test]
    fn list_keys_toggle_filter_and_delete() {
        let mut app = app();
        type_and_submit(&mut app, "a");
        type_and_submit(&mut app, "b");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::List);

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.controller().store().tasks()[0].completed);
        assert_eq!(app.view.summary, "1 task remaining");

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.view.texts(), vec!["b"]);
        assert_eq!(app.selected, Some(TaskId::new(2)));

        press(&mut app, KeyCode::Char('d'));
        assert!(app.view.is_empty());
        assert_eq!(app.selected, None);
        assert_eq!(app.controller().store().len(), 1);
    }

    #[test]
    fn selection_follows_task_after_toggle_hides_it() {
        let mut app = app();
        for text in ["a", "b", "c"] {
            type_and_submit(&mut app, text);
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected, Some(TaskId::new(2)));

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.view.texts(), vec!["a", "c"]);
        assert_eq!(app.selected, Some(TaskId::new(3)));
    }

    #[test]
    fn edit_modal_confirm_and_cancel() {
        let mut app = app();
        type_and_submit(&mut app, "draft");
        press(&mut app, KeyCode::Tab);

        press(&mut app, KeyCode::Char('e'));
        assert!(app.edit.is_some());
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        type_and_submit(&mut app, "final");
        assert!(app.edit.is_none());
        assert_eq!(app.view.texts(), vec!["final"]);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('!'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view.texts(), vec!["final"]);
        assert!(matches!(app.status_line(), Some((msg, StatusKind::Info)) if msg == "cancelled"));
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
        press(&mut app, KeyCode::Esc);
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
