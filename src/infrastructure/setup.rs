//! Setup and wiring
//!
//! Handles project initialization and assembly of a ready-to-start
//! controller from loaded configuration:
//! - Configuration directory and default config file creation
//! - Storage backend selection (memory or migrated `SQLite`)
//! - Forum client and controller construction

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::adapters::memory::InMemoryKeyValueStore;
use crate::adapters::sqlite::{database_url, initialize_database, SqliteKeyValueStore};
use crate::domain::models::{Config, StorageBackend, StorageConfig};
use crate::domain::ports::{Celebration, KeyValueStore};
use crate::infrastructure::forum::ForumClient;
use crate::services::{ControllerDeps, VisibilityController, WeightedSelector};

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Onboarding tips configuration
# Override settings by editing this file, .onboarding/local.yaml, or by
# setting environment variables with the ONBOARDING_ prefix
#
# Example environment variables:
#   export ONBOARDING_ONBOARDING__FAQ_PRIORITY=high
#   export ONBOARDING_FORUM__BASE_URL=https://forum.example.com
#   export ONBOARDING_LOGGING__LEVEL=debug

onboarding:
  # Task priorities: high, low or disabled
  faq_priority: "low"
  twofactor_priority: "high"
  chat_priority: "low"
  avatar_priority: "high"
  name_priority: "low"
  bio_priority: "low"

  # Hours an account must exist before tips appear
  hours_before_showing: 24

  # Highest trust level that still sees tips
  max_trust_level: 1

  # Hours a dismissal hides the banner
  dismiss_duration_hours: 24

  # Where the banner appears: homepage or everywhere
  show_on: "homepage"

site:
  chat_enabled: true
  prioritize_username_in_ux: false
  default_homepage: "latest"

forum:
  base_url: "http://localhost:3000"
  timeout_secs: 30

storage:
  # memory or sqlite
  backend: "sqlite"
  database_path: ".onboarding/local_storage.db"

logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "json"

  # File rotation when log_dir is set: daily, hourly, never
  rotation: "daily"
"#;

/// Setup paths and directories
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Get setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(current_dir))
    }

    /// Setup paths rooted at `root`
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let config_dir = root.as_ref().join(".onboarding");
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<()> {
    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")
}

/// Create the default configuration file
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<()> {
    if paths.config_file.exists() && !force {
        return Ok(());
    }

    create_config_dir(paths)?;
    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;

    Ok(())
}

/// Open the configured storage backend, migrating `SQLite` if needed.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryKeyValueStore::new())),
        StorageBackend::Sqlite => {
            let pool = initialize_database(&database_url(&config.database_path))
                .await
                .context("Failed to initialize local storage database")?;
            Ok(Arc::new(SqliteKeyValueStore::new(pool)))
        }
    }
}

/// Build a controller from configuration, ready for `start`.
pub async fn build_controller(config: &Config) -> Result<Arc<VisibilityController>> {
    build_controller_with(config, None).await
}

/// Same as [`build_controller`] with a host celebration effect.
pub async fn build_controller_with(
    config: &Config,
    celebration: Option<Arc<dyn Celebration>>,
) -> Result<Arc<VisibilityController>> {
    let client = ForumClient::new(&config.forum).context("Failed to build forum client")?;
    let store = open_store(&config.storage).await?;

    let mut deps = ControllerDeps::new(Arc::new(client), store);
    if let Some(celebration) = celebration {
        deps = deps.with_celebration(celebration);
    }

    info!(
        base_url = %config.forum.base_url,
        storage = ?config.storage.backend,
        show_on = ?config.onboarding.show_on,
        "onboarding controller built"
    );

    Ok(Arc::new(VisibilityController::new(
        config.onboarding.clone(),
        config.site.clone(),
        deps,
        WeightedSelector::from_entropy(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[test]
    fn test_default_template_is_valid() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.onboarding.twofactor_priority, "high");
    }

    #[test]
    fn test_create_config_file_respects_force() {
        let root = tempfile::tempdir().unwrap();
        let paths = SetupPaths::in_dir(root.path());
        assert!(!paths.is_initialized());

        create_config_file(&paths, false).unwrap();
        assert!(paths.is_initialized());

        fs::write(&paths.config_file, "onboarding: {}\n").unwrap();
        create_config_file(&paths, false).unwrap();
        assert_eq!(fs::read_to_string(&paths.config_file).unwrap(), "onboarding: {}\n");

        create_config_file(&paths, true).unwrap();
        assert_eq!(fs::read_to_string(&paths.config_file).unwrap(), DEFAULT_CONFIG_TEMPLATE);
    }

    #[tokio::test]
    async fn test_open_sqlite_store() {
        let root = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sqlite,
            database_path: root.path().join("local.db").to_string_lossy().into_owned(),
        };
        let store = open_store(&config).await.unwrap();
        store.set("fullProfile_alice", "{}").await.unwrap();
        assert_eq!(store.get("fullProfile_alice").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_build_controller_with_memory_storage() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;

        let controller = build_controller(&config).await.unwrap();
        assert_eq!(controller.state().await, crate::domain::models::BannerState::Hidden);
    }
}
