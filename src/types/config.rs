//! Configuration structures.
//!
//! Configuration is loaded from JSON files or strings; every field has a
//! default so partial documents are accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{Error, Result};

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Watcher configuration.
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.watcher.validate()?;
        self.observability.validate()
    }
}

/// Watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Final path components whose subitem-changed notifications are dropped.
    pub ignored_file_names: Vec<String>,

    /// Emit a debug record for every enqueued event.
    pub trace_events: bool,
}

impl WatcherConfig {
    pub fn validate(&self) -> Result<()> {
        for name in &self.ignored_file_names {
            if name.is_empty() {
                return Err(Error::validation("ignored file name cannot be empty"));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(Error::validation(format!(
                    "ignored file name must be a single path component: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            ignored_file_names: vec![".DS_Store".to_string()],
            trace_events: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing filter directives used when `RUST_LOG` is unset
    /// (`info`, `dirwatch=debug`, ...).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl ObservabilityConfig {
    pub fn validate(&self) -> Result<()> {
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .map(|_| ())
            .map_err(|err| {
                Error::validation(format!("invalid log_level {:?}: {}", self.log_level, err))
            })
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
