//! Banner visibility state machine.
//!
//! The controller owns the ephemeral selection state and decides on every
//! session change, navigation event and profile refresh whether the banner
//! shows a task, shows the completion celebration, or stays hidden.
//!
//! Evaluations run outside the state lock (they await storage and at most one
//! profile fetch). Each one takes a generation number when it starts and only
//! commits its result if no later evaluation or authoritative action (dismiss,
//! disable, own-preferences hide) bumped the generation in the meantime.

use std::sync::{Arc, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BannerState, ExtendedProfile, HiddenReason, OnboardingConfig, ProfileUpdate, RouteChange,
    SelectionState, ShowOn, SiteSettings, Task, UserSummary,
};
use crate::domain::ports::{
    Celebration, Clock, KeyValueStore, NavigationService, NullCelebration, ProfileClient,
    SystemClock,
};
use crate::services::dismissal_store::DismissalStore;
use crate::services::profile_cache::ProfileCache;
use crate::services::profile_editor::ProfileEditor;
use crate::services::task_catalog::{build_tasks, candidate_set};
use crate::services::weighted_selector::WeightedSelector;

/// External collaborators the controller is built from.
#[derive(Clone)]
pub struct ControllerDeps {
    /// Forum profile reads and edits.
    pub client: Arc<dyn ProfileClient>,
    /// Device-local storage for the profile cache and dismissal records.
    pub store: Arc<dyn KeyValueStore>,
    /// Completion effect.
    pub celebration: Arc<dyn Celebration>,
    pub clock: Arc<dyn Clock>,
}

impl ControllerDeps {
    /// Wall clock and no celebration effect.
    pub fn new(client: Arc<dyn ProfileClient>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            store,
            celebration: Arc::new(NullCelebration::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a `ManualClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use the host's completion effect.
    pub fn with_celebration(mut self, celebration: Arc<dyn Celebration>) -> Self {
        self.celebration = celebration;
        self
    }
}

/// What started an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// The user session appeared or changed.
    Session,
    /// The host navigated to a new route.
    Navigation,
    /// The profile changed under the current route, e.g. after a task edit.
    Refresh,
}

/// Result of running the gates, before it is committed.
enum Verdict {
    Dismissed { until: Option<i64> },
    Hide(HiddenReason),
    Candidates(Vec<Task>),
}

struct ControllerState {
    user: Option<UserSummary>,
    route: Option<RouteChange>,
    banner: BannerState,
    hidden_reason: Option<HiddenReason>,
    selection: SelectionState,
    selector: WeightedSelector,
    generation: u64,
    /// The user had at least one candidate since becoming eligible.
    had_candidates: bool,
    /// Completion was already shown for the current "no tasks" stretch.
    completion_shown: bool,
    celebrating: bool,
    dismissed_until: Option<i64>,
}

impl ControllerState {
    /// Move to `Hidden`. Returns whether a running celebration must be torn down.
    fn hide(&mut self, reason: HiddenReason) -> bool {
        self.banner = BannerState::Hidden;
        self.hidden_reason = Some(reason);
        self.selection.clear();
        std::mem::take(&mut self.celebrating)
    }

    fn username(&self) -> DomainResult<String> {
        self.user
            .as_ref()
            .map(|u| u.username.clone())
            .ok_or(DomainError::NoActiveUser)
    }
}

/// Follow-up work decided under the lock and run after it is released.
#[derive(Default)]
struct Effects {
    celebrate: bool,
    stop_celebration: bool,
}

/// Decides whether the onboarding banner shows a task, the completion
/// celebration, or nothing, and applies the banner's user actions.
///
/// Shared as an `Arc`; every method takes `&self`.
pub struct VisibilityController {
    onboarding: OnboardingConfig,
    site: SiteSettings,
    client: Arc<dyn ProfileClient>,
    celebration: Arc<dyn Celebration>,
    clock: Arc<dyn Clock>,
    profiles: Arc<ProfileCache>,
    dismissals: DismissalStore,
    editor: ProfileEditor,
    state: Mutex<ControllerState>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl VisibilityController {
    /// Build a controller in the `Hidden` state with no user.
    pub fn new(
        onboarding: OnboardingConfig,
        site: SiteSettings,
        deps: ControllerDeps,
        selector: WeightedSelector,
    ) -> Self {
        let profiles = Arc::new(ProfileCache::new(
            deps.store.clone(),
            deps.client.clone(),
            deps.clock.clone(),
        ));
        Self {
            dismissals: DismissalStore::new(deps.store.clone(), deps.clock.clone()),
            editor: ProfileEditor::new(deps.client.clone(), profiles.clone()),
            profiles,
            onboarding,
            site,
            client: deps.client,
            celebration: deps.celebration,
            clock: deps.clock,
            state: Mutex::new(ControllerState {
                user: None,
                route: None,
                banner: BannerState::Hidden,
                hidden_reason: None,
                selection: SelectionState::default(),
                selector,
                generation: 0,
                had_candidates: false,
                completion_shown: false,
                celebrating: false,
                dismissed_until: None,
            }),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to navigation events. Replaces any previous subscription.
    ///
    /// The listener holds only a weak reference, so dropping the last
    /// controller handle ends it too.
    pub async fn start(self: &Arc<Self>, navigation: &dyn NavigationService) {
        let mut receiver = navigation.subscribe();
        let controller: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(route) => {
                        let Some(controller) = controller.upgrade() else {
                            break;
                        };
                        controller.on_navigate(route).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "navigation listener lagged, older route changes dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("navigation listener finished");
        });

        if let Some(previous) = self.listener.lock().await.replace(handle) {
            previous.abort();
        }
        info!("onboarding controller started");
    }

    /// Unsubscribe from navigation and tear down any running celebration.
    pub async fn stop(&self) {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
        }
        let was_celebrating = std::mem::take(&mut self.state.lock().await.celebrating);
        if was_celebrating {
            self.celebration.stop().await;
        }
        info!("onboarding controller stopped");
    }

    /// Install (or clear) the session user and evaluate.
    pub async fn set_user(&self, user: Option<UserSummary>) -> BannerState {
        {
            let mut state = self.state.lock().await;
            let previous = state.user.as_ref().map(|u| u.username.as_str());
            let next = user.as_ref().map(|u| u.username.as_str());
            if previous != next {
                state.had_candidates = false;
                state.completion_shown = false;
                state.dismissed_until = None;
                state.selection.clear();
            }
            state.user = user;
        }
        self.evaluate(Trigger::Session).await
    }

    /// React to a route change.
    ///
    /// Arriving on the user's own preferences page hides the banner at once
    /// and drops the cached profile, since edits there are about to happen.
    pub async fn on_navigate(&self, route: RouteChange) -> BannerState {
        let own_preferences = {
            let mut state = self.state.lock().await;
            let username = state
                .user
                .as_ref()
                .filter(|u| route.is_own_preferences(&u.username))
                .map(|u| u.username.clone());
            state.route = Some(route);

            username.map(|username| {
                state.generation += 1;
                (username, state.hide(HiddenReason::OwnPreferences))
            })
        };

        let Some((username, stop_celebration)) = own_preferences else {
            return self.evaluate(Trigger::Navigation).await;
        };

        debug!(username, "own preferences page, hiding banner");
        self.run_effects(Effects {
            celebrate: false,
            stop_celebration,
        })
        .await;
        if let Err(err) = self.profiles.invalidate(&username).await {
            warn!(username, error = %err, "failed to invalidate cached profile");
        }
        BannerState::Hidden
    }

    /// Re-evaluate after the profile may have changed, keeping the current
    /// task when it is still open.
    pub async fn check_completion(&self) -> BannerState {
        self.evaluate(Trigger::Refresh).await
    }

    /// Apply a task edit and re-check completion.
    pub async fn complete_task(&self, update: ProfileUpdate) -> DomainResult<BannerState> {
        let username = self.state.lock().await.username()?;
        let profile = self.editor.apply(&username, &update).await?;
        Ok(self.after_edit(&username, &profile).await)
    }

    /// Save the bio entered from the "no bio" task.
    pub async fn save_bio(&self, bio: &str) -> DomainResult<BannerState> {
        let username = self.state.lock().await.username()?;
        let profile = self.editor.save_bio(&username, bio).await?;
        Ok(self.after_edit(&username, &profile).await)
    }

    /// Save the display name entered from the "no name" task.
    pub async fn save_name(&self, name: &str) -> DomainResult<BannerState> {
        let username = self.state.lock().await.username()?;
        let profile = self.editor.save_name(&username, name).await?;
        Ok(self.after_edit(&username, &profile).await)
    }

    /// Switch to an uploaded avatar from the "letter avatar" task.
    pub async fn pick_avatar(&self, upload_id: u64) -> DomainResult<BannerState> {
        let username = self.state.lock().await.username()?;
        let profile = self.editor.pick_avatar(&username, upload_id).await?;
        Ok(self.after_edit(&username, &profile).await)
    }

    async fn after_edit(&self, username: &str, profile: &ExtendedProfile) -> BannerState {
        {
            let mut state = self.state.lock().await;
            if let Some(user) = state.user.as_mut().filter(|u| u.username == username) {
                refresh_summary(user, profile);
            }
        }
        self.check_completion().await
    }

    /// Replace the shown task with a different open one.
    ///
    /// Returns `None` when no task is showing.
    pub async fn show_different_task(&self) -> Option<Task> {
        let mut state = self.state.lock().await;
        if !matches!(state.banner, BannerState::ShowingTask(_)) {
            return None;
        }

        let ControllerState {
            selection,
            selector,
            banner,
            ..
        } = &mut *state;
        let next = selector.pick_different(selection.candidates(), selection.active_index())?;
        selection.set_active(Some(next));
        let task = selection.active_task()?.clone();
        *banner = BannerState::ShowingTask(task.kind);
        debug!(task = %task.kind, "showing a different task");
        Some(task)
    }

    /// Hide the banner and suppress it for the configured duration.
    ///
    /// The banner is hidden before the record is written, so a storage
    /// failure still leaves it hidden for this session.
    pub async fn dismiss(&self) -> DomainResult<()> {
        let (username, stop_celebration) = {
            let mut state = self.state.lock().await;
            let username = state.username()?;
            state.generation += 1;
            (username, state.hide(HiddenReason::Dismissed))
        };
        self.run_effects(Effects {
            celebrate: false,
            stop_celebration,
        })
        .await;

        let record = self
            .dismissals
            .dismiss(&username, self.onboarding.dismiss_duration())
            .await?;
        self.state.lock().await.dismissed_until = Some(record.expires_at_epoch_ms);
        info!(username, expires_at = record.expires_at_epoch_ms, "onboarding banner dismissed");
        Ok(())
    }

    /// Persist the tip-skip preference, then hide for good.
    ///
    /// On failure nothing changes locally and the error is returned.
    pub async fn disable_onboarding(&self) -> DomainResult<()> {
        let username = self.state.lock().await.username()?;

        if let Err(err) = self
            .client
            .update_profile(&username, &ProfileUpdate::skip_tips())
            .await
        {
            error!(username, error = %err, "error disabling onboarding");
            return Err(err);
        }

        let stop_celebration = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            if let Some(user) = state.user.as_mut().filter(|u| u.username == username) {
                user.user_option.skip_new_user_tips = true;
            }
            state.dismissed_until = None;
            state.hide(HiddenReason::Disabled)
        };
        self.run_effects(Effects {
            celebrate: false,
            stop_celebration,
        })
        .await;

        if let Err(err) = self.profiles.invalidate(&username).await {
            warn!(username, error = %err, "failed to invalidate cached profile");
        }
        if let Err(err) = self.dismissals.clear(&username).await {
            warn!(username, error = %err, "failed to clear dismissal record");
        }
        info!(username, "onboarding disabled");
        Ok(())
    }

    /// Close the completion banner and tear down the celebration.
    pub async fn party_over(&self) {
        let stop_celebration = {
            let mut state = self.state.lock().await;
            if state.banner == BannerState::ShowingCompletion {
                state.generation += 1;
                state.hide(HiddenReason::PartyOver)
            } else {
                std::mem::take(&mut state.celebrating)
            }
        };
        self.run_effects(Effects {
            celebrate: false,
            stop_celebration,
        })
        .await;
    }

    /// Current banner state.
    pub async fn state(&self) -> BannerState {
        self.state.lock().await.banner
    }

    /// The task the banner shows, if any.
    pub async fn active_task(&self) -> Option<Task> {
        self.state.lock().await.selection.active_task().cloned()
    }

    /// Why the last decision was `Hidden`.
    pub async fn hidden_reason(&self) -> Option<HiddenReason> {
        self.state.lock().await.hidden_reason
    }

    /// Epoch milliseconds at which the current dismissal ends, if dismissed.
    pub async fn dismissal_expires_at(&self) -> Option<i64> {
        self.state.lock().await.dismissed_until
    }

    async fn evaluate(&self, trigger: Trigger) -> BannerState {
        let (generation, user, route) = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.banner = BannerState::Evaluating;
            (state.generation, state.user.clone(), state.route.clone())
        };

        let verdict = self.run_gates(user.as_ref(), route.as_ref()).await;

        let (banner, effects) = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                debug!(generation, current = state.generation, "discarding superseded evaluation");
                return state.banner;
            }
            let effects = self.commit(&mut state, trigger, verdict);
            (state.banner, effects)
        };

        self.run_effects(effects).await;
        banner
    }

    async fn run_gates(&self, user: Option<&UserSummary>, route: Option<&RouteChange>) -> Verdict {
        let Some(user) = user else {
            return Verdict::Hide(HiddenReason::NoUser);
        };
        let username = user.username.as_str();

        match self.dismissals.check_status(username).await {
            Ok(status) if status.dismissed => {
                return Verdict::Dismissed {
                    until: status.expires_at,
                };
            }
            Ok(_) => {}
            Err(err) => warn!(username, error = %err, "dismissal check failed, assuming not dismissed"),
        }

        if user.skips_tips() || user.trust_level > self.onboarding.max_trust_level {
            return Verdict::Hide(HiddenReason::NotNovice);
        }

        if route.is_some_and(|r| r.is_own_preferences(username)) {
            return Verdict::Hide(HiddenReason::OwnPreferences);
        }
        if !self.placement_allows(route) {
            return Verdict::Hide(HiddenReason::WrongPage);
        }

        let Some(profile) = self.profiles.get(username).await else {
            return Verdict::Hide(HiddenReason::ProfileUnavailable);
        };

        if let Some(created_at) = profile.created_at {
            if self.clock.now() - created_at < self.onboarding.min_account_age() {
                return Verdict::Hide(HiddenReason::TooSoon);
            }
        }

        match build_tasks(user, Some(&profile), &self.onboarding, &self.site) {
            Ok(tasks) => Verdict::Candidates(candidate_set(tasks)),
            Err(err) => {
                error!(username, error = %err, "invalid onboarding configuration");
                Verdict::Hide(HiddenReason::Misconfigured)
            }
        }
    }

    fn placement_allows(&self, route: Option<&RouteChange>) -> bool {
        match self.onboarding.show_on {
            ShowOn::Everywhere => true,
            ShowOn::Homepage => route.is_some_and(|r| r.name == self.site.homepage_route()),
        }
    }

    fn commit(&self, state: &mut ControllerState, trigger: Trigger, verdict: Verdict) -> Effects {
        state.dismissed_until = None;
        let candidates = match verdict {
            Verdict::Dismissed { until } => {
                debug!(until, "banner dismissed");
                let stop_celebration = state.hide(HiddenReason::Dismissed);
                state.dismissed_until = until;
                return Effects {
                    celebrate: false,
                    stop_celebration,
                };
            }
            Verdict::Hide(reason) => {
                debug!(reason = reason.as_str(), "banner hidden");
                return Effects {
                    celebrate: false,
                    stop_celebration: state.hide(reason),
                };
            }
            Verdict::Candidates(candidates) => candidates,
        };

        if candidates.is_empty() {
            if state.celebrating {
                state.banner = BannerState::ShowingCompletion;
                state.hidden_reason = None;
                state.selection.clear();
                return Effects::default();
            }
            if state.had_candidates && !state.completion_shown {
                info!("all onboarding tasks complete");
                state.completion_shown = true;
                state.celebrating = true;
                state.banner = BannerState::ShowingCompletion;
                state.hidden_reason = None;
                state.selection.clear();
                return Effects {
                    celebrate: true,
                    stop_celebration: false,
                };
            }
            return Effects {
                celebrate: false,
                stop_celebration: state.hide(HiddenReason::AllTasksComplete),
            };
        }

        state.had_candidates = true;
        state.completion_shown = false;

        let kept = match trigger {
            Trigger::Refresh => state.selection.reconcile(candidates),
            Trigger::Session | Trigger::Navigation => {
                state.selection = SelectionState::new(candidates, None);
                false
            }
        };
        if !kept {
            let ControllerState {
                selection,
                selector,
                ..
            } = &mut *state;
            let picked = selector.pick(selection.candidates());
            selection.set_active(picked);
        }

        let Some(kind) = state.selection.active_task().map(|t| t.kind) else {
            return Effects {
                celebrate: false,
                stop_celebration: state.hide(HiddenReason::AllTasksComplete),
            };
        };

        debug!(task = %kind, candidates = state.selection.candidates().len(), "showing task");
        state.banner = BannerState::ShowingTask(kind);
        state.hidden_reason = None;
        Effects {
            celebrate: false,
            stop_celebration: std::mem::take(&mut state.celebrating),
        }
    }

    async fn run_effects(&self, effects: Effects) {
        if effects.stop_celebration {
            self.celebration.stop().await;
        }
        if effects.celebrate {
            if let Err(err) = self.celebration.celebrate().await {
                warn!(error = %err, "celebration failed to start");
            }
        }
    }
}

/// Copy fields an edit may have changed back into the session summary.
fn refresh_summary(user: &mut UserSummary, profile: &ExtendedProfile) {
    if !profile.avatar_template.is_empty() {
        user.avatar_template.clone_from(&profile.avatar_template);
    }
    if profile.name.is_some() {
        user.name.clone_from(&profile.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKeyValueStore;
    use crate::domain::models::{StorageKind, TaskKind};
    use crate::domain::ports::ManualClock;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticClient {
        profile: ExtendedProfile,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ProfileClient for StaticClient {
        async fn fetch_profile(&self, _username: &str) -> DomainResult<ExtendedProfile> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.profile.clone())
        }

        async fn update_profile(
            &self,
            _username: &str,
            _update: &ProfileUpdate,
        ) -> DomainResult<ExtendedProfile> {
            Ok(self.profile.clone())
        }
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
    }

    fn controller(everywhere: bool) -> (VisibilityController, Arc<InMemoryKeyValueStore>) {
        let profile = ExtendedProfile {
            username: "alice".to_string(),
            name: Some("Alice".to_string()),
            bio_raw: Some("hello".to_string()),
            created_at: Some(start() - Duration::days(3)),
            ..Default::default()
        };
        let client = Arc::new(StaticClient {
            profile,
            fetches: AtomicUsize::new(0),
        });
        let store = Arc::new(InMemoryKeyValueStore::new());
        let deps = ControllerDeps::new(client, store.clone())
            .with_clock(Arc::new(ManualClock::new(start())));
        let onboarding = OnboardingConfig {
            show_on: if everywhere { ShowOn::Everywhere } else { ShowOn::Homepage },
            ..Default::default()
        };
        let controller = VisibilityController::new(
            onboarding,
            SiteSettings::default(),
            deps,
            WeightedSelector::seeded(5),
        );
        (controller, store)
    }

    fn faq_user() -> UserSummary {
        let mut user = UserSummary::new("alice");
        user.second_factor_enabled = true;
        user.avatar_template = "/user_avatar/x/alice/{size}/1.png".to_string();
        user
    }

    #[tokio::test]
    async fn test_initial_state_is_hidden() {
        let (controller, _) = controller(true);
        assert_eq!(controller.state().await, BannerState::Hidden);
        assert_eq!(controller.set_user(None).await, BannerState::Hidden);
        assert_eq!(controller.hidden_reason().await, Some(HiddenReason::NoUser));
    }

    #[tokio::test]
    async fn test_single_open_task_is_shown() {
        let (controller, _) = controller(true);
        let state = controller.set_user(Some(faq_user())).await;
        assert_eq!(state, BannerState::ShowingTask(TaskKind::ReadFaq));
        assert_eq!(controller.active_task().await.unwrap().kind, TaskKind::ReadFaq);
        assert_eq!(controller.hidden_reason().await, None);
    }

    #[tokio::test]
    async fn test_homepage_gate() {
        let (controller, _) = controller(false);
        assert_eq!(controller.set_user(Some(faq_user())).await, BannerState::Hidden);
        assert_eq!(controller.hidden_reason().await, Some(HiddenReason::WrongPage));

        let state = controller.on_navigate(RouteChange::new("discovery.latest")).await;
        assert_eq!(state, BannerState::ShowingTask(TaskKind::ReadFaq));

        let state = controller.on_navigate(RouteChange::new("topic.fromParams")).await;
        assert_eq!(state, BannerState::Hidden);
    }

    #[tokio::test]
    async fn test_trust_level_gate() {
        let (controller, _) = controller(true);
        let mut user = faq_user();
        user.trust_level = 2;
        assert_eq!(controller.set_user(Some(user)).await, BannerState::Hidden);
        assert_eq!(controller.hidden_reason().await, Some(HiddenReason::NotNovice));
    }

    #[tokio::test]
    async fn test_dismiss_hides_and_persists() {
        let (controller, store) = controller(true);
        controller.set_user(Some(faq_user())).await;
        controller.dismiss().await.unwrap();

        assert_eq!(controller.state().await, BannerState::Hidden);
        assert!(controller.dismissal_expires_at().await.is_some());
        assert!(store
            .get(&StorageKind::DismissalStatus.key("alice"))
            .await
            .unwrap()
            .is_some());

        let state = controller.on_navigate(RouteChange::new("discovery.latest")).await;
        assert_eq!(state, BannerState::Hidden);
        assert_eq!(controller.hidden_reason().await, Some(HiddenReason::Dismissed));
    }

    #[tokio::test]
    async fn test_dismiss_without_user_fails() {
        let (controller, _) = controller(true);
        assert!(matches!(controller.dismiss().await, Err(DomainError::NoActiveUser)));
    }

    #[tokio::test]
    async fn test_show_different_task_only_while_showing() {
        let (controller, _) = controller(true);
        assert!(controller.show_different_task().await.is_none());

        let mut user = faq_user();
        user.second_factor_enabled = false;
        controller.set_user(Some(user)).await;
        let before = controller.active_task().await.unwrap().kind;
        let after = controller.show_different_task().await.unwrap().kind;
        assert_ne!(before, after);
        assert_eq!(controller.state().await, BannerState::ShowingTask(after));
    }
}
