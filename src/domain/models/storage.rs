//! Persisted record formats for the device-local key-value store.

use serde::{Deserialize, Serialize};

/// Logical storage slots, one of each per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    FullProfile,
    DismissalStatus,
}

impl StorageKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::FullProfile => "fullProfile",
            Self::DismissalStatus => "onboardingDismissalStatus",
        }
    }

    /// Storage key for `username`, e.g. `fullProfile_alice`.
    pub fn key(&self, username: &str) -> String {
        format!("{}_{username}", self.prefix())
    }
}

/// A cached payload stamped with the time it was stored.
///
/// Fresh while `now - stored_at_epoch_ms < ttl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    #[serde(alias = "userData")]
    pub payload: T,
    #[serde(alias = "timestamp")]
    pub stored_at_epoch_ms: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, stored_at_epoch_ms: i64) -> Self {
        Self {
            payload,
            stored_at_epoch_ms,
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.stored_at_epoch_ms
    }

    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        self.age_ms(now_ms) < ttl_ms
    }
}

/// "Dismissed until" record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalRecord {
    #[serde(alias = "isDismissed")]
    pub dismissed: bool,
    #[serde(alias = "expirationTime")]
    pub expires_at_epoch_ms: i64,
}

impl DismissalRecord {
    pub fn until(expires_at_epoch_ms: i64) -> Self {
        Self {
            dismissed: true,
            expires_at_epoch_ms,
        }
    }

    pub fn is_active(&self, now_ms: i64) -> bool {
        self.dismissed && now_ms < self.expires_at_epoch_ms
    }
}

/// Result of a dismissal check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DismissalStatus {
    pub dismissed: bool,
    pub expires_at: Option<i64>,
}

impl DismissalStatus {
    pub fn not_dismissed() -> Self {
        Self::default()
    }

    pub fn until(expires_at: i64) -> Self {
        Self {
            dismissed: true,
            expires_at: Some(expires_at),
        }
    }
}
