use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors that can occur when talking to the forum's user endpoints
#[derive(Error, Debug)]
pub enum ForumApiError {
    /// Rejected update, e.g. a name that fails server validation (HTTP 400/422)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid credentials (HTTP 401)
    #[error("Not authenticated")]
    Unauthorized,

    /// The current user may not read or edit this profile (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No such user (HTTP 404)
    #[error("User not found")]
    NotFound,

    /// Too many requests (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server-side failure (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unknown or unexpected status
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl ForumApiError {
    /// Classify a non-success status and its body.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, body),
            status => Self::UnknownError(status, body),
        }
    }

    /// Returns true if this error is transient and a later attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::NetworkError(_)
        )
    }

    /// Returns true if retrying cannot help
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::Unauthorized | Self::Forbidden(_) | Self::NotFound
        )
    }

    /// Wrap as the domain-level fetch failure for `username`.
    pub fn into_domain(self, username: &str) -> DomainError {
        DomainError::fetch_failure(username, self)
    }
}
