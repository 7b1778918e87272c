//! Configuration management
//!
//! Loads configuration from shareio.toml at startup.
//! The file location can be overridden with `SHAREIO_CONFIG`.

use crate::share::{ConnectionStringError, ShareSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "SHAREIO_CONFIG";

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "shareio.toml";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Seekable stream settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// Network share settings
    #[serde(default)]
    pub share: ShareConfig,
}

/// Seekable stream configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StreamConfig {
    /// Bytes retained for backward seeks
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

/// Network share configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ShareConfig {
    /// `sambaPath=...;username=...;domain=...;password=...`
    #[serde(default)]
    pub connection_string: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

fn default_window_size() -> usize {
    4096
}

impl Config {
    /// Load configuration from the file named by `SHAREIO_CONFIG` or `shareio.toml`
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(config_path)
    }

    /// Load configuration from `path`, falling back to defaults when missing
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.stream.window_size == 0 {
            return Err(ConfigError::Invalid("stream.window_size must be > 0".into()));
        }
        Ok(config)
    }

    /// Decode the configured connection string, if any
    pub fn share_settings(&self) -> Result<Option<ShareSettings>, ConfigError> {
        self.share
            .connection_string
            .as_deref()
            .map(ShareSettings::decode)
            .transpose()
            .map_err(ConfigError::from)
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Invalid share connection string: {0}")]
    ConnectionString(#[from] ConnectionStringError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.stream.window_size, 4096);
        assert!(config.share.connection_string.is_none());
        assert!(config.share_settings().unwrap().is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml("[stream]\nwindow_size = 16\n").unwrap();
        assert_eq!(config.stream.window_size, 16);
        assert_eq!(config.share, ShareConfig::default());
    }

    #[test]
    fn test_parse_share_settings() {
        let config = Config::from_toml(
            r#"
            [share]
            connection_string = 'sambaPath=\\files\media;username=bob;domain=CORP'
            "#,
        )
        .unwrap();
        let settings = config.share_settings().unwrap().unwrap();
        assert_eq!(settings.share_path, r"\\files\media");
        assert_eq!(settings.credentials.logon_name(), r"CORP\bob");
    }

    #[test]
    fn test_invalid_connection_string() {
        let config = Config::from_toml("[share]\nconnection_string = 'domain=x'\n").unwrap();
        assert!(matches!(
            config.share_settings(),
            Err(ConfigError::ConnectionString(ConnectionStringError::MissingKey(_)))
        ));
    }

    #[test]
    fn test_rejects_zero_window() {
        assert!(matches!(
            Config::from_toml("[stream]\nwindow_size = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::from_toml("[stream\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("shareio-config-that-does-not-exist.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("shareio-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[stream]\nwindow_size = 32\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.stream.window_size, 32);
    }
}
