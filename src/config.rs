//! Configuration management for Tube Fetcher
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, file loading, and zero-config defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{app, store};
use crate::errors::{ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Persistent store settings
    pub store: StoreConfigToml,
    /// Filename generation settings
    pub naming: NamingConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfigToml {
    /// Data directory holding the database (None = platform default)
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfigToml {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

/// TOML-friendly naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfigToml {
    /// Template used when no stored template is marked default
    pub fallback_template: String,
}

impl Default for NamingConfigToml {
    fn default() -> Self {
        Self {
            fallback_template: crate::constants::naming::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
    /// Show log targets in output
    pub show_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_targets: false,
        }
    }
}

impl AppConfig {
    /// Load configuration with simple precedence: defaults, then the config
    /// file (explicit path, or the default location when present)
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path }.into());
                }
                Some(path)
            }
            None => {
                let default_path = Self::default_config_path()?;
                default_path.exists().then_some(default_path)
            }
        };

        match config_path {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                Self::load_from_file(&path).await
            }
            None => Ok(Self::default()),
        }
    }

    /// Create a default config file on first run if none exists
    ///
    /// Returns the config path either way so callers can report it.
    pub async fn initialize_first_run() -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            return Ok(config_path);
        }

        info!("Creating default configuration file...");
        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ConfigError::Io)?;
        }

        let content =
            toml::to_string_pretty(&Self::default()).map_err(|e| ConfigError::InvalidValue {
                field: "config".to_string(),
                value: String::new(),
                reason: e.to_string(),
            })?;
        tokio::fs::write(&config_path, content)
            .await
            .map_err(ConfigError::Io)?;

        info!("Wrote default config to {}", config_path.display());
        Ok(config_path)
    }

    /// Resolve the database path from configuration and CLI override
    pub fn database_path(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        let data_dir = match data_dir_override.or(self.store.data_dir.as_ref()) {
            Some(dir) => dir.clone(),
            None => Self::default_data_dir()?,
        };
        Ok(data_dir.join(store::DB_FILE_NAME))
    }

    async fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::Io)?;
        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;
        Ok(config)
    }

    /// Default config file path for the current OS
    ///
    /// Uses the platform config directory to keep config and data unified:
    /// - macOS: ~/Library/Application Support/tube-fetcher/config.toml
    /// - Linux: ~/.config/tube-fetcher/config.toml
    /// - Windows: %APPDATA%/tube-fetcher/config.toml
    fn default_config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join(app::CONFIG_FILE_NAME))
    }

    /// Default data directory (holds the database) for the current OS
    fn default_data_dir() -> Result<PathBuf> {
        Self::app_dir()
    }

    fn app_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| ConfigError::InvalidValue {
            field: "data_dir".to_string(),
            value: String::new(),
            reason: "no platform config directory available".to_string(),
        })?;
        Ok(base.join(app::APP_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_defaults_when_no_file_given() {
        let config = AppConfig::default();
        assert!(config.store.data_dir.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.naming.fallback_template.contains("{title}"));
    }

    #[tokio::test]
    async fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[store]
data_dir = "/tmp/tube-data"

[naming]
fallback_template = "{date} {title}.{format}"

[logging]
level = "debug"
show_targets = true
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load(Some(path)).await.unwrap();
        assert_eq!(
            config.store.data_dir.as_deref(),
            Some(std::path::Path::new("/tmp/tube-data"))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.naming.fallback_template.starts_with("{date}"));
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(PathBuf::from("/nonexistent/config.toml"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_database_path_prefers_cli_override() {
        let config = AppConfig {
            store: StoreConfigToml {
                data_dir: Some(PathBuf::from("/from/config")),
            },
            ..Default::default()
        };

        let override_dir = PathBuf::from("/from/cli");
        let path = config.database_path(Some(&override_dir)).unwrap();
        assert!(path.starts_with("/from/cli"));
        assert!(path.ends_with(store::DB_FILE_NAME));

        let path = config.database_path(None).unwrap();
        assert!(path.starts_with("/from/config"));
    }

    #[tokio::test]
    async fn test_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.logging.level, config.logging.level);
    }
}
