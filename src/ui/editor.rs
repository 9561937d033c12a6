use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

/// Single-line text field with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    value: String,
    cursor: usize,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field pre-filled with `value`, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        let mut input = Self::new();
        input.set(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing key. Returns false if the key is not an editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('u') {
                self.clear();
                return true;
            }
            return false;
        }
        match key.code {
            KeyCode::Char(ch) if !ch.is_control() => {
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, ch);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }
}

/// Modal replacement prompt for one task.
#[derive(Debug, Clone)]
pub struct EditModal {
    task_id: TaskId,
    input: LineInput,
}

impl EditModal {
    pub fn new(task_id: TaskId, current: &str) -> Self {
        Self {
            task_id,
            input: LineInput::with_value(current),
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn input(&self) -> &LineInput {
        &self.input
    }

    pub fn into_value(self) -> String {
        self.input.value
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Enter => EditorAction::Submit,
            _ => {
                self.input.handle_key(key);
                EditorAction::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(input: &mut LineInput, text: &str) {
        for ch in text.chars() {
            input.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_and_cursor_movement() {
        let mut input = LineInput::new();
        type_text(&mut input, "buy mlk");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Left));
        type_text(&mut input, "i");
        assert_eq!(input.value(), "buy milk");

        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value(), "uy milk");
        input.handle_key(key(KeyCode::End));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "uy mil");
        assert_eq!(input.cursor(), 6);
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut input = LineInput::with_value("café");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "caf");
        input.handle_key(key(KeyCode::Home));
        type_text(&mut input, "é");
        assert_eq!(input.value(), "écaf");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = LineInput::with_value("draft");
        assert!(input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert_eq!(input.value(), "");
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn modal_submits_and_cancels() {
        let mut modal = EditModal::new(TaskId::new(3), "draft");
        assert_eq!(modal.handle_key(key(KeyCode::Char('!'))), EditorAction::None);
        assert_eq!(modal.handle_key(key(KeyCode::Enter)), EditorAction::Submit);
        assert_eq!(modal.task_id(), TaskId::new(3));
        assert_eq!(modal.clone().into_value(), "draft!");
        assert_eq!(modal.handle_key(key(KeyCode::Esc)), EditorAction::Cancel);
    }
}
