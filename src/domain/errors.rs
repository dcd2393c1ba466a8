//! Domain errors for the onboarding engine.

use thiserror::Error;

/// Domain-level errors that can occur in the onboarding engine.
///
/// None of these are ever surfaced to the end user as a hard failure: the
/// visibility controller degrades every one of them toward a hidden banner.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Profile request failed for {username}: {reason}")]
    FetchFailure { username: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Corrupted storage entry {key}: {reason}")]
    StorageCorruption { key: String, reason: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("No active user session")]
    NoActiveUser,
}

impl DomainError {
    /// Build a fetch failure for `username` from any displayable cause.
    pub fn fetch_failure(username: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::FetchFailure {
            username: username.into(),
            reason: reason.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_message() {
        let err = DomainError::fetch_failure("alice", "connection refused");
        assert_eq!(
            err.to_string(),
            "Profile request failed for alice: connection refused"
        );
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: DomainError = parse.unwrap_err().into();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }
}
