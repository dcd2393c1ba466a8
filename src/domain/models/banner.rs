//! Banner visibility states and the ephemeral task selection.

use serde::{Deserialize, Serialize};

use super::task::{Task, TaskKind};

/// Visibility state of the onboarding banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "task")]
pub enum BannerState {
    Hidden,
    Evaluating,
    ShowingTask(TaskKind),
    ShowingCompletion,
}

impl BannerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Evaluating => "evaluating",
            Self::ShowingTask(_) => "showing_task",
            Self::ShowingCompletion => "showing_completion",
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::ShowingTask(_) | Self::ShowingCompletion)
    }
}

/// Why the controller last decided to hide the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenReason {
    NoUser,
    Dismissed,
    NotNovice,
    WrongPage,
    OwnPreferences,
    ProfileUnavailable,
    TooSoon,
    AllTasksComplete,
    Misconfigured,
    Disabled,
    PartyOver,
}

impl HiddenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoUser => "no_user",
            Self::Dismissed => "dismissed",
            Self::NotNovice => "not_novice",
            Self::WrongPage => "wrong_page",
            Self::OwnPreferences => "own_preferences",
            Self::ProfileUnavailable => "profile_unavailable",
            Self::TooSoon => "too_soon",
            Self::AllTasksComplete => "all_tasks_complete",
            Self::Misconfigured => "misconfigured",
            Self::Disabled => "disabled",
            Self::PartyOver => "party_over",
        }
    }
}

/// Candidate snapshot plus the index of the task currently shown.
///
/// `active` only ever indexes the `candidates` it was chosen from. Indices are
/// not stable across recomputation, so a new snapshot must go through
/// [`SelectionState::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    candidates: Vec<Task>,
    active: Option<usize>,
}

impl SelectionState {
    pub fn new(candidates: Vec<Task>, active: Option<usize>) -> Self {
        let active = active.filter(|&i| i < candidates.len());
        Self { candidates, active }
    }

    pub fn candidates(&self) -> &[Task] {
        &self.candidates
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.and_then(|i| self.candidates.get(i))
    }

    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index.filter(|&i| i < self.candidates.len());
    }

    /// Replace the candidate set, re-deriving the active index by task kind.
    ///
    /// Returns `true` when the previously active task survived.
    pub fn reconcile(&mut self, candidates: Vec<Task>) -> bool {
        let previous = self.active_task().map(|t| t.kind);
        self.active = previous.and_then(|kind| candidates.iter().position(|t| t.kind == kind));
        self.candidates = candidates;
        self.active.is_some()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.active = None;
    }
}
