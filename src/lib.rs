//! todo - persistent to-do list engine
//!
//! A pure task store with a persistence adapter, a filter, a renderer and
//! an input controller, plus two hosts built on them: a ratatui terminal UI
//! and a scriptable command line.
//!
//! # Core Concepts
//!
//! - **Task**: text plus a completed flag, identified by a stable id
//! - **Store**: the authoritative ordered task list, saved after each mutation
//! - **Filter**: all / active / completed view selector, never persisted
//! - **View**: the deterministic render of (store, filter)
//!
//! # Module Organization
//!
//! - `task`: task store and its mutators
//! - `persist`: task list <-> serialized blob under one key
//! - `kv`: key/value stores (in-memory and file-backed)
//! - `lock`: file locking and atomic writes for the store file
//! - `filter`: filter state and visibility rules
//! - `render`: view model projection and plain-text painter
//! - `controller`: event dispatch and the edit prompt capability
//! - `ui`: terminal front end
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `config.toml`
//! - `output`: human and JSON output for CLI commands
//! - `error`: error types and result aliases

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod kv;
pub mod lock;
pub mod output;
pub mod persist;
pub mod render;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
