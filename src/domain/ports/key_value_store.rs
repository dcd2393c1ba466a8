//! Durable key-value storage port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Device-local string storage, the backing of the profile cache and the
/// dismissal store. Values are JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`.
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> DomainResult<()>;
}
