//! Edit prompt backed by the user's external editor.
//!
//! The current text is written to a temp file and `$VISUAL`, `$EDITOR` or
//! `vi` is run on it. A non-zero editor exit cancels; otherwise the file
//! contents, less the trailing newline the prefill wrote, are the confirmed
//! replacement.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::controller::EditPrompt;
use crate::error::{Error, Result};
use crate::task::TaskId;

#[derive(Debug, Default)]
pub struct ExternalEditor {
    error: Option<Error>,
}

impl ExternalEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error raised while running the editor, if any. A failed launch is
    /// reported to the controller as a cancel.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}

impl EditPrompt for ExternalEditor {
    fn request(&mut self, id: TaskId, current: &str) -> Option<String> {
        match edit_text(current) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(%id, error = %err, "external editor failed");
                self.error = Some(err);
                None
            }
        }
    }
}

fn edit_text(current: &str) -> Result<Option<String>> {
    let mut temp = tempfile::Builder::new()
        .prefix("todo-edit-")
        .suffix(".txt")
        .tempfile()?;
    writeln!(temp, "{current}")?;
    temp.flush()?;

    let status = launch_editor(temp.path())?;
    if !status.success() {
        tracing::debug!(code = ?status.code(), "editor exited unsuccessfully; treating as cancel");
        return Ok(None);
    }

    let content = fs::read_to_string(temp.path())?;
    Ok(Some(strip_final_newline(&content).to_string()))
}

/// Drop one trailing line ending so an untouched buffer reads back as the
/// prefilled text.
fn strip_final_newline(content: &str) -> &str {
    content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(content)
}

fn launch_editor(path: &Path) -> Result<ExitStatus> {
    let mut attempted: Vec<String> = Vec::new();
    for candidate in editor_candidates() {
        let parts = split_editor_command(&candidate);
        let Some((program, args)) = parts.split_first() else {
            continue;
        };
        attempted.push(program.clone());
        match Command::new(program).args(args).arg(path).status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(Error::OperationFailed(format!(
                    "failed to launch editor '{program}': {err}"
                )));
            }
        }
    }
    let tried = if attempted.is_empty() {
        "no editor candidates".to_string()
    } else {
        attempted.join(", ")
    };
    Err(Error::OperationFailed(format!(
        "no editor found (tried {tried}); set $VISUAL or $EDITOR"
    )))
}

fn editor_candidates() -> Vec<String> {
    let mut out = Vec::new();
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                out.push(value);
            }
        }
    }
    out.push("vi".to_string());
    out
}

fn split_editor_command(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|part| part.to_string())
        .collect()
}
