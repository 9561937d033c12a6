//! Configuration loading and management
//!
//! Handles parsing of the optional `config.toml` file. Every field has a
//! default, so a missing file behaves like an empty one.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the config file inside the per-user config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Name of the store file inside the per-user data directory
pub const STORE_FILE: &str = "store.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Persistence configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Terminal UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where and under which key the task list is persisted
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Key holding the serialized task list
    #[serde(default = "default_store_key")]
    pub key: String,

    /// Path to the key/value file (defaults to the per-user data dir)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long to wait for the store lock before giving up
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_store_key() -> String {
    "todos".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: default_store_key(),
            path: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Input poll interval in milliseconds
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

fn default_poll_ms() -> u64 {
    120
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            match Self::load(&config_path) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicit path must load cleanly; the per-user default location
    /// falls back to defaults when missing or invalid.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        Ok(project_dirs()
            .map(|dirs| Self::load_from_dir(dirs.config_dir()))
            .unwrap_or_default())
    }

    /// Path of the key/value store file, falling back to the data dir.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.store.path.as_ref() {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(STORE_FILE))
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "no home directory found; pass --store or set store.path".to_string(),
                )
            })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.ui.validate()?;
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::InvalidConfig("store.key cannot be empty".to_string()));
        }
        if self.key.trim() != self.key {
            return Err(Error::InvalidConfig(format!(
                "store.key '{}' has surrounding whitespace",
                self.key
            )));
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl UiConfig {
    fn validate(&self) -> Result<()> {
        if !(10..=2000).contains(&self.poll_ms) {
            return Err(Error::InvalidConfig(format!(
                "ui.poll_ms must be between 10 and 2000 (got {})",
                self.poll_ms
            )));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "todo")
}
