use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::task::TaskKind;

/// Main configuration structure for the onboarding engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Onboarding tip settings (priorities, gates, dismissal)
    #[serde(default)]
    pub onboarding: OnboardingConfig,

    /// Site settings the engine reads but does not own
    #[serde(default)]
    pub site: SiteSettings,

    /// Forum API connection
    #[serde(default)]
    pub forum: ForumConfig,

    /// Device-local storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the banner may appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowOn {
    #[default]
    Homepage,
    Everywhere,
}

/// Onboarding tip settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OnboardingConfig {
    /// Priority of the "read the FAQ" tip: high, low or disabled
    #[serde(default = "default_low")]
    pub faq_priority: String,

    #[serde(default = "default_high")]
    pub twofactor_priority: String,

    #[serde(default = "default_low")]
    pub chat_priority: String,

    #[serde(default = "default_high")]
    pub avatar_priority: String,

    #[serde(default = "default_low")]
    pub name_priority: String,

    #[serde(default = "default_low")]
    pub bio_priority: String,

    /// Hours an account must exist before tips appear
    #[serde(default = "default_hours_before_showing")]
    pub hours_before_showing: u32,

    /// Highest trust level still considered a novice
    #[serde(default = "default_max_trust_level")]
    pub max_trust_level: u8,

    /// Hours a dismissal suppresses the banner
    #[serde(default = "default_dismiss_duration_hours")]
    pub dismiss_duration_hours: u32,

    /// Page placement rule
    #[serde(default)]
    pub show_on: ShowOn,

    /// Reject unrecognized priorities instead of treating them as disabled
    #[serde(default = "default_strict_priorities")]
    pub strict_priorities: bool,
}

fn default_low() -> String {
    "low".to_string()
}

fn default_high() -> String {
    "high".to_string()
}

const fn default_hours_before_showing() -> u32 {
    24
}

const fn default_max_trust_level() -> u8 {
    1
}

const fn default_dismiss_duration_hours() -> u32 {
    24
}

const fn default_strict_priorities() -> bool {
    cfg!(debug_assertions)
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            faq_priority: default_low(),
            twofactor_priority: default_high(),
            chat_priority: default_low(),
            avatar_priority: default_high(),
            name_priority: default_low(),
            bio_priority: default_low(),
            hours_before_showing: default_hours_before_showing(),
            max_trust_level: default_max_trust_level(),
            dismiss_duration_hours: default_dismiss_duration_hours(),
            show_on: ShowOn::default(),
            strict_priorities: default_strict_priorities(),
        }
    }
}

impl OnboardingConfig {
    /// Raw priority setting for a task type.
    pub fn priority_setting(&self, kind: TaskKind) -> &str {
        match kind {
            TaskKind::ReadFaq => &self.faq_priority,
            TaskKind::SecondFactor => &self.twofactor_priority,
            TaskKind::NoChannels => &self.chat_priority,
            TaskKind::LetterAvatar => &self.avatar_priority,
            TaskKind::NoName => &self.name_priority,
            TaskKind::NoBio => &self.bio_priority,
        }
    }

    pub fn dismiss_duration(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.dismiss_duration_hours))
    }

    pub fn min_account_age(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.hours_before_showing))
    }
}

/// Site settings consumed read-only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SiteSettings {
    #[serde(default = "default_true")]
    pub chat_enabled: bool,

    #[serde(default)]
    pub prioritize_username_in_ux: bool,

    /// Homepage filter, e.g. `latest` for the `discovery.latest` route
    #[serde(default = "default_homepage")]
    pub default_homepage: String,
}

const fn default_true() -> bool {
    true
}

fn default_homepage() -> String {
    "latest".to_string()
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            chat_enabled: default_true(),
            prioritize_username_in_ux: false,
            default_homepage: default_homepage(),
        }
    }
}

impl SiteSettings {
    /// Route name of the homepage.
    pub fn homepage_route(&self) -> String {
        format!("discovery.{}", self.default_homepage)
    }
}

/// Forum API connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ForumConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_username: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_username: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
}

/// Device-local storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the `SQLite` file used by the sqlite backend
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    ".onboarding/local_storage.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_setting_lookup() {
        let config = OnboardingConfig {
            bio_priority: "disabled".to_string(),
            ..Default::default()
        };
        assert_eq!(config.priority_setting(TaskKind::NoBio), "disabled");
        assert_eq!(config.priority_setting(TaskKind::SecondFactor), "high");
    }

    #[test]
    fn test_homepage_route() {
        let site = SiteSettings {
            default_homepage: "categories".to_string(),
            ..Default::default()
        };
        assert_eq!(site.homepage_route(), "discovery.categories");
    }

    #[test]
    fn test_durations() {
        let config = OnboardingConfig::default();
        assert_eq!(config.dismiss_duration(), chrono::Duration::hours(24));
        assert_eq!(config.min_account_age(), chrono::Duration::hours(24));
    }
}
