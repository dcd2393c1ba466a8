//! Common test utilities for integration tests
//!
//! Provides scripted collaborators (profile client, celebration), user and
//! profile fixtures, and a harness that wires them into a controller.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use onboarding_tips::adapters::InMemoryKeyValueStore;
use onboarding_tips::domain::errors::{DomainError, DomainResult};
use onboarding_tips::domain::models::{
    ExtendedProfile, OnboardingConfig, ProfileUpdate, ShowOn, SiteSettings, UserSummary,
};
use onboarding_tips::domain::ports::{Celebration, ManualClock, ProfileClient};
use onboarding_tips::services::{ControllerDeps, VisibilityController, WeightedSelector};

pub const HOME: &str = "discovery.latest";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A novice with every summary-level task already done.
pub fn settled_user(username: &str) -> UserSummary {
    let mut user = UserSummary::new(username);
    user.read_faq = true;
    user.second_factor_enabled = true;
    user.avatar_template = format!("/user_avatar/forum.example/{username}/{{size}}/7_2.png");
    user
}

/// A profile old enough to pass the account-age gate with name and bio set.
pub fn settled_profile(username: &str) -> ExtendedProfile {
    ExtendedProfile {
        username: username.to_string(),
        name: Some("Alice Example".to_string()),
        bio_raw: Some("Gardener and Rust fan".to_string()),
        created_at: Some(now() - Duration::days(5)),
        can_edit_name: true,
        can_change_bio: true,
        can_pick_avatar: true,
        ..Default::default()
    }
}

/// Profile client backed by one in-memory profile, with failure switches
/// and an optional gate that parks the next fetch until released.
pub struct FakeProfileClient {
    profile: Mutex<ExtendedProfile>,
    pub fetches: AtomicUsize,
    pub updates: Mutex<Vec<ProfileUpdate>>,
    pub fail_fetch: AtomicBool,
    pub fail_update: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    pub fetch_started: Notify,
}

impl FakeProfileClient {
    pub fn new(profile: ExtendedProfile) -> Self {
        Self {
            profile: Mutex::new(profile),
            fetches: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            gate: Mutex::new(None),
            fetch_started: Notify::new(),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_profile(&self, profile: ExtendedProfile) {
        *self.profile.lock().unwrap() = profile;
    }

    /// Park the next fetch until the returned handle is notified.
    pub fn hold_next_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl ProfileClient for FakeProfileClient {
    async fn fetch_profile(&self, username: &str) -> DomainResult<ExtendedProfile> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.fetch_started.notify_one();
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(DomainError::fetch_failure(username, "503 Service Unavailable"));
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> DomainResult<ExtendedProfile> {
        self.updates.lock().unwrap().push(update.clone());
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(DomainError::fetch_failure(username, "422 Unprocessable Entity"));
        }

        let mut profile = self.profile.lock().unwrap();
        if let Some(name) = &update.name {
            profile.name = Some(name.clone());
        }
        if let Some(bio) = &update.bio_raw {
            profile.bio_raw = Some(bio.clone());
        }
        if let Some(upload_id) = update.avatar_upload_id {
            profile.avatar_template = format!("/user_avatar/forum.example/{username}/{{size}}/{upload_id}_2.png");
        }
        if let Some(skip) = update.skip_new_user_tips {
            profile.user_option.skip_new_user_tips = skip;
        }
        Ok(profile.clone())
    }
}

/// Counts celebration starts and stops.
#[derive(Default)]
pub struct RecordingCelebration {
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
}

impl RecordingCelebration {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Celebration for RecordingCelebration {
    async fn celebrate(&self) -> DomainResult<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub controller: Arc<VisibilityController>,
    pub client: Arc<FakeProfileClient>,
    pub store: Arc<InMemoryKeyValueStore>,
    pub celebration: Arc<RecordingCelebration>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(profile: ExtendedProfile, config: OnboardingConfig) -> Self {
        Self::with_store(profile, config, Arc::new(InMemoryKeyValueStore::new()))
    }

    /// Harness sharing `store` with other controllers, like a second session
    /// on the same device.
    pub fn with_store(
        profile: ExtendedProfile,
        config: OnboardingConfig,
        store: Arc<InMemoryKeyValueStore>,
    ) -> Self {
        let client = Arc::new(FakeProfileClient::new(profile));
        let celebration = Arc::new(RecordingCelebration::default());
        let clock = Arc::new(ManualClock::new(now()));
        let deps = ControllerDeps::new(client.clone(), store.clone())
            .with_clock(clock.clone())
            .with_celebration(celebration.clone());
        let controller = Arc::new(VisibilityController::new(
            config,
            SiteSettings::default(),
            deps,
            WeightedSelector::seeded(42),
        ));
        Self {
            controller,
            client,
            store,
            celebration,
            clock,
        }
    }
}

/// Homepage-only configuration with default priorities.
pub fn homepage_config() -> OnboardingConfig {
    OnboardingConfig {
        show_on: ShowOn::Homepage,
        strict_priorities: false,
        ..Default::default()
    }
}
