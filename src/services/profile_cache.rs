//! Device-local cache of the extended profile with a freshness window.
//!
//! Reads serve the cached copy while it is younger than the TTL and fetch
//! through the [`ProfileClient`] otherwise. Fetch failures fall back to
//! whatever is cached, stale or not; with nothing cached the profile is
//! reported unavailable.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CacheEntry, ExtendedProfile, StorageKind};
use crate::domain::ports::{Clock, KeyValueStore, ProfileClient};

/// Profiles are re-fetched after 12 hours.
pub const PROFILE_TTL_MS: i64 = 12 * 60 * 60 * 1000;

/// Read-through profile cache over a [`KeyValueStore`].
///
/// Each username carries an invalidation epoch. A fetch records the epoch it
/// started under and is not stored once `invalidate` has moved it on.
pub struct ProfileCache {
    store: Arc<dyn KeyValueStore>,
    client: Arc<dyn ProfileClient>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
    epochs: RwLock<HashMap<String, u64>>,
}

impl ProfileCache {
    /// Cache with the default [`PROFILE_TTL_MS`] freshness window.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn ProfileClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_ttl(store, client, clock, PROFILE_TTL_MS)
    }

    /// Cache with a custom freshness window in milliseconds.
    pub fn with_ttl(
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn ProfileClient>,
        clock: Arc<dyn Clock>,
        ttl_ms: i64,
    ) -> Self {
        Self {
            store,
            client,
            clock,
            ttl_ms,
            epochs: RwLock::new(HashMap::new()),
        }
    }

    /// Cached profile if fresh, otherwise a fetched one.
    ///
    /// `None` means no profile could be obtained and nothing was cached.
    pub async fn get(&self, username: &str) -> Option<ExtendedProfile> {
        let cached = self.read_entry(username).await;
        let now = self.clock.now_ms();

        if let Some(entry) = &cached {
            if entry.is_fresh(now, self.ttl_ms) {
                debug!(username, age_ms = entry.age_ms(now), "profile cache hit");
                return Some(entry.payload.clone());
            }
        }

        let requested_at = now;
        let epoch = self.epoch(username).await;
        match self.client.fetch_profile(username).await {
            Ok(profile) => {
                self.store_fetched(username, profile, requested_at, epoch).await
            }
            Err(err) => {
                error!(username, error = %err, "error fetching full profile");
                cached.map(|entry| entry.payload)
            }
        }
    }

    /// Cached entry regardless of age, without fetching.
    pub async fn peek(&self, username: &str) -> Option<CacheEntry<ExtendedProfile>> {
        self.read_entry(username).await
    }

    /// Overwrite the cached profile with a fresh timestamp.
    pub async fn put(&self, username: &str, profile: &ExtendedProfile) -> DomainResult<()> {
        let entry = CacheEntry::new(profile, self.clock.now_ms());
        let json = serde_json::to_string(&entry)?;
        self.store.set(&StorageKind::FullProfile.key(username), &json).await
    }

    /// Drop the cached profile unconditionally.
    ///
    /// Fetches already in flight for `username` will not write their result
    /// back.
    pub async fn invalidate(&self, username: &str) -> DomainResult<()> {
        debug!(username, "invalidating cached profile");
        *self.epochs.write().await.entry(username.to_string()).or_default() += 1;
        self.store.remove(&StorageKind::FullProfile.key(username)).await
    }

    async fn epoch(&self, username: &str) -> u64 {
        self.epochs.read().await.get(username).copied().unwrap_or(0)
    }

    /// Store a fetched profile unless a newer entry landed while the fetch
    /// was in flight; either way return the newest profile.
    ///
    /// A fetch that straddles an invalidation is returned to its caller but
    /// never cached.
    async fn store_fetched(
        &self,
        username: &str,
        profile: ExtendedProfile,
        requested_at: i64,
        epoch: u64,
    ) -> Option<ExtendedProfile> {
        if self.epoch(username).await != epoch {
            debug!(username, "profile invalidated during fetch, not caching it");
            return Some(profile);
        }

        if let Some(current) = self.read_entry(username).await {
            if current.stored_at_epoch_ms >= requested_at {
                debug!(username, "newer profile stored during fetch, keeping it");
                return Some(current.payload);
            }
        }

        if let Err(err) = self.put(username, &profile).await {
            warn!(username, error = %err, "failed to cache fetched profile");
        }
        Some(profile)
    }

    async fn read_entry(&self, username: &str) -> Option<CacheEntry<ExtendedProfile>> {
        let key = StorageKind::FullProfile.key(username);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(username, error = %err, "profile cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                let corruption = DomainError::StorageCorruption {
                    key: key.clone(),
                    reason: err.to_string(),
                };
                warn!(error = %corruption, "discarding cached profile");
                if let Err(err) = self.store.remove(&key).await {
                    warn!(key, error = %err, "failed to remove corrupted entry");
                }
                None
            }
        }
    }
}
