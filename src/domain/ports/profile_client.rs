//! Forum profile client port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ExtendedProfile, ProfileUpdate};

/// Read and write access to a user's profile on the forum.
///
/// Both calls may fail with a transport error, reported as
/// [`DomainError::FetchFailure`](crate::domain::errors::DomainError::FetchFailure).
#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// Fetch the full profile of `username`.
    async fn fetch_profile(&self, username: &str) -> DomainResult<ExtendedProfile>;

    /// Apply a partial update and return the profile as stored after the edit.
    async fn update_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> DomainResult<ExtendedProfile>;
}
