//! Shared output formatting for todo CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "todo.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable rendering of a command result: a header, plain lines
/// under it, and an optional "Next steps" list.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    lines: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            lines: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    /// Plain line printed directly under the header.
    pub fn push_line(&mut self, value: impl Into<String>) {
        self.lines.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Error,
}

/// JSON envelope shared by every command; `body` supplies `data` or `error`.
#[derive(Serialize)]
struct Envelope<'a, B: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: Status,
    #[serde(flatten)]
    body: B,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    next_steps: &'a [String],
}

#[derive(Serialize)]
struct Data<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Serialize)]
struct Failure<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: i32,
    kind: &'static str,
}

fn print_envelope<B: Serialize>(envelope: &Envelope<'_, B>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return print_envelope(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Success,
            body: Data { data },
            next_steps: human.map(|h| h.next_steps.as_slice()).unwrap_or_default(),
        });
    }
    if options.quiet {
        return Ok(());
    }
    if let Some(human) = human {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let message = err.to_string();
        return print_envelope(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Error,
            body: Failure {
                error: ErrorBody {
                    message: &message,
                    code: err.exit_code(),
                    kind: error_kind(err),
                },
            },
            next_steps: &next_steps,
        });
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut out = output.header.clone();
    for line in &output.lines {
        out.push('\n');
        out.push_str(line);
    }
    if !output.next_steps.is_empty() {
        out.push_str("\n\nNext steps:");
        for step in &output.next_steps {
            out.push_str("\n- ");
            out.push_str(step);
        }
    }
    out
}

/// Best-effort command name for error envelopes, read before clap parses.
pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

fn command_name_from(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if matches!(arg.as_str(), "--store" | "--key" | "--config") {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "ui".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::InvalidConfig(_) => vec!["fix config.toml or pass --config <path>".to_string()],
        Error::LockFailed(_) => vec!["another todo process holds the store; retry".to_string()],
        Error::SaveFailed(_) => vec!["check that the store path is writable".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn command_name_skips_flag_values() {
        assert_eq!(command_name_from(args(&["--store", "x.json", "add", "milk"])), "add");
        assert_eq!(command_name_from(args(&["--json", "list"])), "list");
        assert_eq!(command_name_from(args(&["--key", "work"])), "ui");
    }

    #[test]
    fn format_human_keeps_plain_lines_unbulleted() {
        let mut output = HumanOutput::new("header");
        output.push_line("  1  [ ]  a");
        output.push_next_step("todo list");
        assert_eq!(
            format_human(&output),
            "header\n  1  [ ]  a\n\nNext steps:\n- todo list"
        );
    }

    #[test]
    fn error_envelope_flattens_body() {
        let next_steps = vec!["retry".to_string()];
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command: "add",
            status: Status::Error,
            body: Failure {
                error: ErrorBody {
                    message: "boom",
                    code: 4,
                    kind: "operation_failed",
                },
            },
            next_steps: &next_steps,
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], 4);
        assert_eq!(value["next_steps"][0], "retry");
        assert!(value.get("data").is_none());
    }
}
