//! Device-local storage on a real `SQLite` file: records written by one
//! session are read back by the next.

mod common;

use chrono::Duration;
use std::sync::Arc;

use common::{now, settled_profile, FakeProfileClient};
use onboarding_tips::adapters::sqlite::{database_url, initialize_database, SqliteKeyValueStore};
use onboarding_tips::domain::models::{CacheEntry, DismissalRecord, ExtendedProfile, StorageKind};
use onboarding_tips::domain::ports::{KeyValueStore, ManualClock};
use onboarding_tips::services::{DismissalStore, ProfileCache};

async fn open(path: &std::path::Path) -> Arc<SqliteKeyValueStore> {
    let pool = initialize_database(&database_url(&path.to_string_lossy()))
        .await
        .unwrap();
    Arc::new(SqliteKeyValueStore::new(pool))
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_storage.db");
    let clock = Arc::new(ManualClock::new(now()));

    {
        let store = open(&path).await;
        let client = Arc::new(FakeProfileClient::new(settled_profile("alice")));
        let profiles = ProfileCache::new(store.clone(), client, clock.clone());
        assert!(profiles.get("alice").await.is_some());

        let dismissals = DismissalStore::new(store, clock.clone());
        dismissals.dismiss("alice", Duration::hours(24)).await.unwrap();
    }

    let store = open(&path).await;

    let raw = store.get(&StorageKind::FullProfile.key("alice")).await.unwrap().unwrap();
    let entry: CacheEntry<ExtendedProfile> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entry.payload.username, "alice");
    assert_eq!(entry.stored_at_epoch_ms, now().timestamp_millis());

    let raw = store
        .get(&StorageKind::DismissalStatus.key("alice"))
        .await
        .unwrap()
        .unwrap();
    let record: DismissalRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        record,
        DismissalRecord::until((now() + Duration::hours(24)).timestamp_millis())
    );

    let client = Arc::new(FakeProfileClient::new(settled_profile("alice")));
    let profiles = ProfileCache::new(store.clone(), client.clone(), clock.clone());
    assert!(profiles.get("alice").await.is_some());
    assert_eq!(client.fetch_count(), 0, "fresh cache served after reopen");

    let dismissals = DismissalStore::new(store, clock);
    assert!(dismissals.check_status("alice").await.unwrap().dismissed);
}

#[tokio::test]
async fn test_overwrite_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("kv.db")).await;

    store.set("fullProfile_alice", "{\"a\":1}").await.unwrap();
    store.set("fullProfile_alice", "{\"a\":2}").await.unwrap();
    assert_eq!(
        store.get("fullProfile_alice").await.unwrap().as_deref(),
        Some("{\"a\":2}")
    );

    store.remove("fullProfile_alice").await.unwrap();
    store.remove("fullProfile_alice").await.unwrap();
    assert!(store.get("fullProfile_alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_records_are_understood() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("legacy.db")).await;
    let clock = Arc::new(ManualClock::new(now()));
    let expires = (now() + Duration::hours(3)).timestamp_millis();

    store
        .set(
            &StorageKind::DismissalStatus.key("alice"),
            &format!(r#"{{"isDismissed":true,"expirationTime":{expires}}}"#),
        )
        .await
        .unwrap();

    let dismissals = DismissalStore::new(store, clock);
    let status = dismissals.check_status("alice").await.unwrap();
    assert!(status.dismissed);
    assert_eq!(status.expires_at, Some(expires));
}
