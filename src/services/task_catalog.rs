//! Task catalog: which onboarding tasks exist for a user and how much each weighs.

use tracing::warn;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ExtendedProfile, OnboardingConfig, Priority, SiteSettings, Task, TaskKind, UserSummary,
};

/// Resolve the weight for a task type from its configured priority.
///
/// Strict configurations reject unknown values; lenient ones treat them as
/// disabled so a typo never leaks an undefined weight into selection.
pub fn resolve_weight(config: &OnboardingConfig, kind: TaskKind) -> DomainResult<u32> {
    let setting = config.priority_setting(kind);
    match setting.parse::<Priority>() {
        Ok(priority) => Ok(priority.weight()),
        Err(err) if config.strict_priorities => Err(err),
        Err(_) => {
            warn!(task = %kind, setting, "unrecognized priority, treating task as disabled");
            Ok(Priority::Disabled.weight())
        }
    }
}

fn can_join_chat(user: &UserSummary, site: &SiteSettings) -> bool {
    site.chat_enabled && user.can_chat && user.has_joinable_public_channels
}

/// Whether `kind` is already done for this user.
///
/// Tasks that depend on the extended profile count as satisfied until a
/// profile is available, so nothing is prompted on partial information.
fn is_satisfied(
    kind: TaskKind,
    user: &UserSummary,
    profile: Option<&ExtendedProfile>,
    site: &SiteSettings,
) -> bool {
    match kind {
        TaskKind::ReadFaq => user.read_faq,
        TaskKind::SecondFactor => user.second_factor_enabled,
        TaskKind::NoChannels => {
            !can_join_chat(user, site) || !user.chat_channels.public_channels.is_empty()
        }
        TaskKind::LetterAvatar => !user.has_letter_avatar(),
        TaskKind::NoName => match profile {
            Some(profile) => {
                site.prioritize_username_in_ux || !profile.can_edit_name || profile.has_name()
            }
            None => true,
        },
        TaskKind::NoBio => match profile {
            Some(profile) => !profile.can_change_bio || profile.has_bio(),
            None => true,
        },
    }
}

/// Build the full, ordered task list for a user.
pub fn build_tasks(
    user: &UserSummary,
    profile: Option<&ExtendedProfile>,
    config: &OnboardingConfig,
    site: &SiteSettings,
) -> DomainResult<Vec<Task>> {
    TaskKind::ALL
        .iter()
        .map(|&kind| {
            let weight = resolve_weight(config, kind)?;
            Ok(Task::new(kind, weight, is_satisfied(kind, user, profile, site)))
        })
        .collect()
}

/// Keep only tasks eligible for selection, preserving catalog order.
pub fn candidate_set(tasks: Vec<Task>) -> Vec<Task> {
    tasks.into_iter().filter(Task::is_candidate).collect()
}
