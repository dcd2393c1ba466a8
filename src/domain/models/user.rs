//! User models: the in-session summary and the fetched extended profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user options resident in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserOption {
    /// The user opted out of new-user tips.
    pub skip_new_user_tips: bool,
}

/// A chat channel the user belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatChannel {
    pub id: u64,
    pub title: String,
}

/// Chat channel membership, split the way the forum reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatChannels {
    pub public_channels: Vec<ChatChannel>,
}

/// Coarse user flags already resident in the host session.
///
/// Owned by the host; the engine reads it and never persists it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSummary {
    pub username: String,
    pub name: Option<String>,
    pub trust_level: u8,
    pub read_faq: bool,
    pub second_factor_enabled: bool,
    /// Avatar URL pattern, e.g. `/letter_avatar_proxy/v4/letter/a/8c91f0/{size}.png`.
    pub avatar_template: String,
    pub can_chat: bool,
    pub has_joinable_public_channels: bool,
    pub chat_channels: ChatChannels,
    pub user_option: UserOption,
    pub sidebar_category_ids: Vec<u64>,
    pub sidebar_tags: Vec<String>,
    pub custom_sidebar_sections_enabled: bool,
    pub sidebar_sections: Vec<serde_json::Value>,
}

impl UserSummary {
    /// Create a summary with only the username set.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Whether the avatar is still the generated letter placeholder.
    pub fn has_letter_avatar(&self) -> bool {
        self.avatar_template.contains("/letter/")
    }

    /// Whether the user has tuned their sidebar away from the defaults.
    pub fn has_customized_sidebar(&self) -> bool {
        !self.sidebar_category_ids.is_empty()
            || !self.sidebar_tags.is_empty()
            || (self.custom_sidebar_sections_enabled && !self.sidebar_sections.is_empty())
    }

    /// Whether the user opted out of tips.
    pub fn skips_tips(&self) -> bool {
        self.user_option.skip_new_user_tips
    }
}

/// Full profile fetched on demand from the forum.
///
/// Replaced wholesale on every successful fetch or edit, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedProfile {
    pub username: String,
    pub name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub bio_raw: Option<String>,
    pub can_edit_name: bool,
    pub can_change_bio: bool,
    pub can_pick_avatar: bool,
    pub email: Option<String>,
    pub trust_level: u8,
    pub avatar_template: String,
    pub user_option: UserOption,
}

impl ExtendedProfile {
    /// Whether a non-blank name is set.
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Whether a non-blank bio is set.
    pub fn has_bio(&self) -> bool {
        self.bio_raw.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}

/// Partial profile update; unset fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_upload_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_new_user_tips: Option<bool>,
}

impl ProfileUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn bio(bio: impl Into<String>) -> Self {
        Self {
            bio_raw: Some(bio.into()),
            ..Default::default()
        }
    }

    pub fn avatar(upload_id: u64) -> Self {
        Self {
            avatar_upload_id: Some(upload_id),
            ..Default::default()
        }
    }

    pub fn skip_tips() -> Self {
        Self {
            skip_new_user_tips: Some(true),
            ..Default::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
