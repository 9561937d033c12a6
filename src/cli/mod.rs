//! Command-line interface for todo
//!
//! This module defines the CLI structure using clap derive macros. Task
//! commands live in `tasks`; the edit prompt backed by `$EDITOR` lives in
//! `editor`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::kv::FileStore;
use crate::output::OutputOptions;
use crate::persist::TaskRepository;
use crate::task::{TaskId, TaskStore};

mod editor;
mod tasks;

pub use editor::ExternalEditor;

/// todo - a small persistent to-do list
///
/// Without a subcommand the full-screen terminal UI starts.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the store file (defaults to the per-user data directory)
    #[arg(long, global = true, env = "TODO_STORE")]
    pub store: Option<PathBuf>,

    /// Key the task list is stored under
    #[arg(long, global = true, env = "TODO_KEY")]
    pub key: Option<String>,

    /// Path to a config file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "TODO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Which tasks to show: all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Flip a task between active and completed
    Toggle {
        /// Task id
        id: TaskId,
    },

    /// Replace a task's text; opens $VISUAL/$EDITOR when no text is given
    Edit {
        /// Task id
        id: TaskId,

        /// Replacement text
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task id
        id: TaskId,
    },

    /// Print the remaining-task summary
    Summary,

    /// Start the terminal UI
    Ui,
}

/// Resolved settings for one invocation.
#[derive(Debug)]
pub(crate) struct Session {
    config: Config,
    store_path: PathBuf,
    output: OutputOptions,
}

impl Session {
    fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = Config::resolve(cli.config.as_deref())?;
        if let Some(path) = cli.store.as_ref() {
            config.store.path = Some(path.clone());
        }
        if let Some(key) = cli.key.as_ref() {
            config.store.key = key.clone();
        }
        config.validate()?;
        let store_path = config.store_path()?;
        tracing::debug!(
            store = %store_path.display(),
            key = %config.store.key,
            "session resolved"
        );
        Ok(Self {
            config,
            store_path,
            output: OutputOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
        })
    }

    fn open(&self) -> Controller<FileStore> {
        let kv = FileStore::new(&self.store_path).with_lock_timeout(self.config.store.lock_timeout_ms);
        let repo = TaskRepository::new(self.config.store.key.clone(), kv);
        Controller::new(TaskStore::open(repo))
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let session = Session::resolve(&self)?;
        let command = self.command.unwrap_or(Commands::Ui);
        match command {
            Commands::Add { text } => tasks::add(&session, &text.join(" ")),
            Commands::List { filter } => tasks::list(&session, filter),
            Commands::Toggle { id } => tasks::toggle(&session, id),
            Commands::Edit { id, text } => {
                let text = if text.is_empty() {
                    None
                } else {
                    Some(text.join(" "))
                };
                tasks::edit(&session, id, text)
            }
            Commands::Delete { id } => tasks::delete(&session, id),
            Commands::Summary => tasks::summary(&session),
            Commands::Ui => {
                if session.output.json {
                    return Err(Error::InvalidArgument(
                        "--json is not supported by the terminal UI".to_string(),
                    ));
                }
                crate::ui::run(session.open(), session.config.ui.poll_ms)
            }
        }
    }
}
