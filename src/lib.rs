//! Onboarding Tips - new-user task engine
//!
//! Nudges new forum users toward profile-completion tasks by showing one
//! weighted-random unfinished task at a time in a dismissible banner, until
//! every task is done.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Profile cache, dismissal store, task
//!   catalog, weighted selector and the visibility state machine
//! - **Adapters** (`adapters`): Storage and navigation port implementations
//! - **Infrastructure Layer** (`infrastructure`): Forum HTTP client,
//!   configuration, logging and wiring
//!
//! # Example
//!
//! ```no_run
//! use onboarding_tips::adapters::BroadcastNavigation;
//! use onboarding_tips::domain::models::{RouteChange, UserSummary};
//! use onboarding_tips::infrastructure::config::ConfigLoader;
//! use onboarding_tips::infrastructure::logging::{LogConfig, LoggerImpl};
//! use onboarding_tips::infrastructure::setup::build_controller;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let _logger = LoggerImpl::init(&LogConfig::from_settings(&config.logging)?)?;
//!
//!     let navigation = BroadcastNavigation::default();
//!     let controller = build_controller(&config).await?;
//!     controller.start(&navigation).await;
//!
//!     controller.set_user(Some(UserSummary::new("alice"))).await;
//!     navigation.publish(RouteChange::new("discovery.latest"));
//!
//!     controller.stop().await;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    BannerState, Config, ExtendedProfile, HiddenReason, OnboardingConfig, ProfileUpdate,
    RouteChange, SiteSettings, Task, TaskKind, UserSummary,
};
pub use domain::ports::{Celebration, Clock, KeyValueStore, NavigationService, ProfileClient};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ControllerDeps, VisibilityController, WeightedSelector};
