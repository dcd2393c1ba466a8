//! Profile edits behind the task call-to-actions (name, bio, avatar).
//!
//! Every edit is one update call; on success the returned profile replaces
//! the cached one so the next read reflects the edit without a round trip.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ExtendedProfile, ProfileUpdate};
use crate::domain::ports::ProfileClient;
use crate::services::profile_cache::ProfileCache;

/// Sends task edits to the forum and keeps the profile cache in step.
pub struct ProfileEditor {
    client: Arc<dyn ProfileClient>,
    profiles: Arc<ProfileCache>,
}

impl ProfileEditor {
    /// Edits go through `client`; responses land in `profiles`.
    pub fn new(client: Arc<dyn ProfileClient>, profiles: Arc<ProfileCache>) -> Self {
        Self { client, profiles }
    }

    /// Send `update` and cache the profile the forum returns.
    pub async fn apply(&self, username: &str, update: &ProfileUpdate) -> DomainResult<ExtendedProfile> {
        let profile = match self.client.update_profile(username, update).await {
            Ok(profile) => profile,
            Err(err) => {
                error!(username, error = %err, "error updating profile");
                return Err(err);
            }
        };

        if let Err(err) = self.profiles.put(username, &profile).await {
            warn!(username, error = %err, "profile updated but not cached");
        }
        info!(username, "profile updated");
        Ok(profile)
    }

    /// Set the bio (raw markdown).
    pub async fn save_bio(&self, username: &str, bio: &str) -> DomainResult<ExtendedProfile> {
        self.apply(username, &ProfileUpdate::bio(bio)).await
    }

    /// Set the display name.
    pub async fn save_name(&self, username: &str, name: &str) -> DomainResult<ExtendedProfile> {
        self.apply(username, &ProfileUpdate::name(name)).await
    }

    /// Select a previously uploaded avatar by upload id.
    pub async fn pick_avatar(&self, username: &str, upload_id: u64) -> DomainResult<ExtendedProfile> {
        self.apply(username, &ProfileUpdate::avatar(upload_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKeyValueStore;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::SystemClock;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoClient {
        fail: bool,
        sent: Mutex<Vec<ProfileUpdate>>,
    }

    #[async_trait]
    impl ProfileClient for EchoClient {
        async fn fetch_profile(&self, username: &str) -> DomainResult<ExtendedProfile> {
            Err(DomainError::fetch_failure(username, "not expected"))
        }

        async fn update_profile(
            &self,
            username: &str,
            update: &ProfileUpdate,
        ) -> DomainResult<ExtendedProfile> {
            self.sent.lock().unwrap().push(update.clone());
            if self.fail {
                return Err(DomainError::fetch_failure(username, "422"));
            }
            Ok(ExtendedProfile {
                username: username.to_string(),
                name: update.name.clone(),
                bio_raw: update.bio_raw.clone(),
                ..Default::default()
            })
        }
    }

    fn editor(client: Arc<EchoClient>) -> (ProfileEditor, Arc<ProfileCache>) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let profiles = Arc::new(ProfileCache::new(store, client.clone(), Arc::new(SystemClock)));
        (ProfileEditor::new(client, profiles.clone()), profiles)
    }

    #[tokio::test]
    async fn test_save_bio_caches_response() {
        let client = Arc::new(EchoClient::default());
        let (editor, profiles) = editor(client.clone());

        editor.save_bio("alice", "I like Rust").await.unwrap();

        let cached = profiles.peek("alice").await.unwrap();
        assert_eq!(cached.payload.bio_raw.as_deref(), Some("I like Rust"));
        assert_eq!(client.sent.lock().unwrap()[0], ProfileUpdate::bio("I like Rust"));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_cache_untouched() {
        let client = Arc::new(EchoClient {
            fail: true,
            ..Default::default()
        });
        let (editor, profiles) = editor(client);

        let result = editor.save_name("alice", "Alice").await;
        assert!(matches!(result, Err(DomainError::FetchFailure { .. })));
        assert!(profiles.peek("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_pick_avatar_sends_upload_id() {
        let client = Arc::new(EchoClient::default());
        let (editor, _) = editor(client.clone());
        editor.pick_avatar("alice", 42).await.unwrap();
        assert_eq!(client.sent.lock().unwrap()[0].avatar_upload_id, Some(42));
    }
}
