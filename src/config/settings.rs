//! Configuration settings for botdeck.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix for overrides, e.g. `BOTDECK__LOADER__REFRESH_DELAY_MS`.
pub const ENV_PREFIX: &str = "BOTDECK";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Loader configuration.
    pub loader: LoaderConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location, returning defaults if it doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from a TOML file layered with environment overrides.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_path);

        ::config::Config::builder()
            .add_source(::config::File::from(config_path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<PathBuf> {
        let config_path = path.unwrap_or_else(default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }
}

fn default_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Strategy loader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delay before the post-load resize and redraw, in milliseconds.
    pub refresh_delay_ms: u64,
    /// Cancel a still-pending refresh when the next load starts.
    pub cancel_stale_refresh: bool,
    /// Strategy loaded when none is requested explicitly.
    pub default_strategy: Option<String>,
}

impl LoaderConfig {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            refresh_delay_ms: 100,
            cancel_stale_refresh: false,
            default_strategy: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write logs to a daily rolling file.
    pub file_logging: bool,
    /// Directory for log files (platform data dir when unset).
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "botdeck=info".to_string(),
            file_logging: false,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.loader, LoaderConfig::default());
        assert_eq!(config.logging.filter, "botdeck=info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[loader]\nrefresh_delay_ms = 250\ndefault_strategy = \"stake_list_101\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.loader.refresh_delay(), Duration::from_millis(250));
        assert_eq!(config.loader.default_strategy.as_deref(), Some("stake_list_101"));
        assert!(!config.loader.cancel_stale_refresh);
        assert!(!config.logging.file_logging);
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.loader.cancel_stale_refresh = true;
        config.logging.log_dir = Some(dir.path().join("logs"));

        let path = config.save(Some(dir.path().join("nested").join("config.toml"))).unwrap();
        assert_eq!(Config::load(Some(path)).unwrap(), config);
    }
}
