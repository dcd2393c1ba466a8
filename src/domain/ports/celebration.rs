//! Completion celebration port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Host visual effect shown once every task is done.
///
/// Implementations may load their resources lazily on the first call.
#[async_trait]
pub trait Celebration: Send + Sync {
    /// Start the effect.
    async fn celebrate(&self) -> DomainResult<()>;

    /// Tear the effect down. Safe to call when nothing is running.
    async fn stop(&self);
}
