use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;

const CONFIG_FILE_PATH: &str = "config.toml";

pub const DEFAULT_STORAGE_KEY: &str = "conversations";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
pub const DEFAULT_THREAD_WINDOW: usize = 50;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory the file-backed key-value store writes to
    #[serde(default = "paths::default_data_dir")]
    pub data_dir: PathBuf,
    /// Key the conversation list is persisted under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Fixed delay of the simulated assistant reply
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// Force the simulated reply down its error path
    #[serde(default)]
    pub simulate_failure: bool,
    /// Number of trailing messages rendered in the thread view
    #[serde(default = "default_thread_window")]
    pub thread_window: usize,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn default_thread_window() -> usize {
    DEFAULT_THREAD_WINDOW
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: paths::default_data_dir(),
            storage_key: default_storage_key(),
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            simulate_failure: false,
            thread_window: DEFAULT_THREAD_WINDOW,
        }
    }
}

impl AppConfig {
    /// Resolve the configuration: `~/.chat_shell/config.json`, then
    /// `config.toml` in the working directory, then environment overrides.
    pub fn new() -> Self {
        let mut config =
            Self::load_from(&paths::config_json_path(), Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load from the first config file that exists and parses. Unreadable or
    /// malformed files are skipped and the defaults are used instead.
    pub fn load_from(json_path: &Path, toml_path: &Path) -> Self {
        for path in [json_path, toml_path] {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring config {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Parse a single config file; the format follows the extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Ok(serde_json::from_str(&content)?),
        }
    }

    /// Apply `CHAT_SHELL_*` overrides from the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CHAT_SHELL_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("CHAT_SHELL_STORAGE_KEY") {
            self.storage_key = key;
        }
        if let Some(delay) = lookup("CHAT_SHELL_REPLY_DELAY_MS") {
            match delay.trim().parse() {
                Ok(ms) => self.reply_delay_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid CHAT_SHELL_REPLY_DELAY_MS={delay:?}"),
            }
        }
        if let Some(fail) = lookup("CHAT_SHELL_SIMULATE_FAILURE") {
            self.simulate_failure = parse_bool_env(&fail);
        }
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}
