//! Tracing setup for processes that embed a watcher.
//!
//! The library only emits `tracing` records. Installing a subscriber is left
//! to the host, which can do it from its [`ObservabilityConfig`] here.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::{ObservabilityConfig, Result};

/// Environment override for the log format (`json` or `compact`).
pub const LOG_FORMAT_ENV: &str = "DIRWATCH_LOG_FORMAT";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// An explicit `json`/`compact` setting wins; anything else defers to the flag.
    pub fn from_setting(setting: Option<&str>, json_logs: bool) -> Self {
        match setting {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            Some(v) if v.eq_ignore_ascii_case("compact") => Self::Compact,
            _ if json_logs => Self::Json,
            _ => Self::Compact,
        }
    }

    pub fn resolve(config: &ObservabilityConfig) -> Self {
        let setting = std::env::var(LOG_FORMAT_ENV).ok();
        Self::from_setting(setting.as_deref(), config.json_logs)
    }
}

/// Filter from `RUST_LOG` when set, otherwise from `config.log_level`.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    config.validate()?;
    Ok(EnvFilter::new(&config.log_level))
}

/// Install the global subscriber once for the process.
///
/// Returns `Ok(true)` when this call installed it, `Ok(false)` when a
/// subscriber was already in place.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let format = LogFormat::resolve(config);

    let mut installed = false;
    TRACING_INIT.get_or_init(|| {
        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact())
                .try_init(),
        };
        installed = result.is_ok();
    });

    if installed {
        tracing::debug!(?format, "Tracing initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_setting_overrides_flag() {
        assert_eq!(LogFormat::from_setting(Some("JSON"), false), LogFormat::Json);
        assert_eq!(LogFormat::from_setting(Some("compact"), true), LogFormat::Compact);
    }

    #[test]
    fn test_format_falls_back_to_flag() {
        assert_eq!(LogFormat::from_setting(None, true), LogFormat::Json);
        assert_eq!(LogFormat::from_setting(Some("pretty"), false), LogFormat::Compact);
    }

    #[test]
    fn test_configured_level_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = ObservabilityConfig {
            log_level: "dirwatch=debug".to_string(),
            ..Default::default()
        };
        assert_eq!(env_filter(&config).unwrap().to_string(), "dirwatch=debug");
    }
}
