//! HTTP implementation of the `ProfileClient` port against the forum's
//! `/u/{username}.json` endpoint.

use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::errors::ForumApiError;
use crate::domain::errors::DomainResult;
use crate::domain::models::{ExtendedProfile, ForumConfig, ProfileUpdate};
use crate::domain::ports::ProfileClient;

/// The forum wraps user payloads as `{"user": {...}}`.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: ExtendedProfile,
}

pub struct ForumClient {
    http_client: ReqwestClient,
    base_url: String,
}

impl ForumClient {
    /// Build a client from the `forum` configuration section.
    ///
    /// API credentials, when configured, are sent on every request.
    pub fn new(config: &ForumConfig) -> Result<Self, ForumApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            headers.insert(
                "Api-Key",
                header::HeaderValue::from_str(api_key)
                    .map_err(|e| ForumApiError::InvalidRequest(format!("Invalid API key: {e}")))?,
            );
        }
        if let Some(api_username) = &config.api_username {
            headers.insert(
                "Api-Username",
                header::HeaderValue::from_str(api_username)
                    .map_err(|e| ForumApiError::InvalidRequest(format!("Invalid API username: {e}")))?,
            );
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_url(&self, username: &str) -> String {
        format!("{}/u/{username}.json", self.base_url)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> Result<ExtendedProfile, ForumApiError> {
        let url = self.user_url(username);
        debug!(%url, "GET");
        let response = self.http_client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, update))]
    pub async fn put_user(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> Result<ExtendedProfile, ForumApiError> {
        let url = self.user_url(username);
        debug!(%url, "PUT");
        let response = self.http_client.put(&url).json(update).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<ExtendedProfile, ForumApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            warn!(%status, %body, "forum API error");
            return Err(ForumApiError::from_status(status, body));
        }

        let body = response.text().await?;
        let envelope: UserEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.user)
    }
}

#[async_trait]
impl ProfileClient for ForumClient {
    async fn fetch_profile(&self, username: &str) -> DomainResult<ExtendedProfile> {
        self.get_user(username)
            .await
            .map_err(|e| e.into_domain(username))
    }

    async fn update_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> DomainResult<ExtendedProfile> {
        self.put_user(username, update)
            .await
            .map_err(|e| e.into_domain(username))
    }
}
