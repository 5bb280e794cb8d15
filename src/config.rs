//! Configuration management for sqlite-lens.
//!
//! Handles loading configuration from a TOML file, with sensible defaults
//! when no file exists.

use crate::error::{LensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Settings for the external sqlite binary.
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

/// Settings for the external sqlite binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Command used to run queries (path or name of the sqlite3 binary).
    #[serde(default = "default_command")]
    pub command: String,

    /// Query timeout in seconds; 0 disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_command() -> String {
    "sqlite3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SqliteConfig {
    /// Returns the configured timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// invalid file is a configuration error.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            LensError::config(format!("cannot read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|e| LensError::config(format!("invalid config {}: {e}", path.display())))
    }

    /// Returns the default config file path.
    ///
    /// Uses the platform config directory (`~/.config/sqlens/config.toml`
    /// on Linux), falling back to the current directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("sqlens").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("sqlens.toml"))
    }
}
