//! Durable "dismissed until" records.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DismissalRecord, DismissalStatus, StorageKind};
use crate::domain::ports::{Clock, KeyValueStore};

/// Per-user "dismissed until" records in a [`KeyValueStore`].
pub struct DismissalStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl DismissalStore {
    /// Expiry is judged against `clock`.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current dismissal status. Expired or unreadable records are cleared
    /// as a side effect and reported as not dismissed.
    pub async fn check_status(&self, username: &str) -> DomainResult<DismissalStatus> {
        let key = StorageKind::DismissalStatus.key(username);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(DismissalStatus::not_dismissed());
        };

        let record: DismissalRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                let corruption = DomainError::StorageCorruption {
                    key: key.clone(),
                    reason: err.to_string(),
                };
                warn!(error = %corruption, "discarding dismissal record");
                self.store.remove(&key).await?;
                return Ok(DismissalStatus::not_dismissed());
            }
        };

        if record.is_active(self.clock.now_ms()) {
            Ok(DismissalStatus::until(record.expires_at_epoch_ms))
        } else {
            debug!(username, "dismissal expired");
            self.clear(username).await?;
            Ok(DismissalStatus::not_dismissed())
        }
    }

    /// Suppress the banner for `duration` from now.
    pub async fn dismiss(&self, username: &str, duration: Duration) -> DomainResult<DismissalRecord> {
        let record = DismissalRecord::until(self.clock.now_ms() + duration.num_milliseconds());
        let json = serde_json::to_string(&record)?;
        self.store
            .set(&StorageKind::DismissalStatus.key(username), &json)
            .await?;
        debug!(username, expires_at = record.expires_at_epoch_ms, "banner dismissed");
        Ok(record)
    }

    /// Remove any dismissal record.
    pub async fn clear(&self, username: &str) -> DomainResult<()> {
        self.store
            .remove(&StorageKind::DismissalStatus.key(username))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKeyValueStore;
    use crate::domain::ports::ManualClock;
    use chrono::{TimeZone, Utc};

    fn fixture() -> (DismissalStore, Arc<InMemoryKeyValueStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ));
        (DismissalStore::new(store.clone(), clock.clone()), store, clock)
    }

    #[tokio::test]
    async fn test_no_record_means_not_dismissed() {
        let (dismissals, _, _) = fixture();
        assert_eq!(
            dismissals.check_status("alice").await.unwrap(),
            DismissalStatus::not_dismissed()
        );
    }

    #[tokio::test]
    async fn test_dismiss_then_check() {
        let (dismissals, _, clock) = fixture();
        let record = dismissals.dismiss("alice", Duration::hours(24)).await.unwrap();
        assert_eq!(record.expires_at_epoch_ms, clock.now_ms() + 86_400_000);

        let status = dismissals.check_status("alice").await.unwrap();
        assert!(status.dismissed);
        assert_eq!(status.expires_at, Some(record.expires_at_epoch_ms));
    }

    #[tokio::test]
    async fn test_expired_record_is_cleared() {
        let (dismissals, store, clock) = fixture();
        dismissals.dismiss("alice", Duration::hours(1)).await.unwrap();
        clock.advance(Duration::hours(1));

        assert!(!dismissals.check_status("alice").await.unwrap().dismissed);
        assert!(store
            .get("onboardingDismissalStatus_alice")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_record() {
        let (dismissals, _, _) = fixture();
        dismissals.dismiss("alice", Duration::hours(24)).await.unwrap();
        dismissals.clear("alice").await.unwrap();
        assert!(!dismissals.check_status("alice").await.unwrap().dismissed);
    }

    #[tokio::test]
    async fn test_corrupted_record_is_discarded() {
        let (dismissals, store, _) = fixture();
        store
            .set("onboardingDismissalStatus_alice", "dismissed=yes")
            .await
            .unwrap();
        assert!(!dismissals.check_status("alice").await.unwrap().dismissed);
        assert!(store
            .get("onboardingDismissalStatus_alice")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_legacy_record_is_honored() {
        let (dismissals, store, clock) = fixture();
        let json = format!(
            r#"{{"isDismissed": true, "expirationTime": {}}}"#,
            clock.now_ms() + 1_000
        );
        store.set("onboardingDismissalStatus_alice", &json).await.unwrap();
        assert!(dismissals.check_status("alice").await.unwrap().dismissed);
    }
}
