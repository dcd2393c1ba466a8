use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, StorageBackend};
use crate::domain::models::{Priority, TaskKind};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid priority for {task}: '{value}'. Must be one of: high, low, disabled")]
    InvalidPriority { task: TaskKind, value: String },

    #[error("Invalid dismiss_duration_hours: 0. Must be at least 1")]
    ZeroDismissDuration,

    #[error("Forum base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Database path cannot be empty when using the sqlite backend")]
    EmptyDatabasePath,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the working directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .onboarding/config.yaml
    /// 3. .onboarding/local.yaml (optional overrides)
    /// 4. Environment variables (ONBOARDING_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`] with `.onboarding/` resolved under `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(".onboarding");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("ONBOARDING_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Priorities are only checked in strict mode; lenient configurations
    /// degrade unknown values to disabled at selection time.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let onboarding = &config.onboarding;
        if onboarding.strict_priorities {
            for kind in TaskKind::ALL {
                let value = onboarding.priority_setting(kind);
                if value.parse::<Priority>().is_err() {
                    return Err(ConfigError::InvalidPriority {
                        task: kind,
                        value: value.to_string(),
                    });
                }
            }
        }

        if onboarding.dismiss_duration_hours == 0 {
            return Err(ConfigError::ZeroDismissDuration);
        }

        if config.forum.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.storage.backend == StorageBackend::Sqlite && config.storage.database_path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
