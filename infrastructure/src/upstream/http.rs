//! reqwest-based [`UpstreamClient`].
//!
//! Base URLs are configured per provider and may contain a `{subdomain}`
//! placeholder filled from the auth context. The auth token is sent as a
//! bearer token, the account id as `X-Account-Id`, and a continuation
//! cursor as the `cursor` query parameter.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_application::ports::upstream::{UpstreamClient, UpstreamError, UpstreamRequest};
use switchboard_domain::{AuthContext, Provider};
use tracing::debug;

/// Placeholder substituted with the caller's subdomain
pub const SUBDOMAIN_PLACEHOLDER: &str = "{subdomain}";

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_urls: HashMap<Provider, String>,
}

impl HttpUpstreamClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| UpstreamError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_urls: HashMap::new(),
        })
    }

    pub fn with_base_url(mut self, provider: Provider, base_url: impl Into<String>) -> Self {
        self.base_urls.insert(provider, base_url.into());
        self
    }

    fn base_url(&self, provider: Provider, auth: &AuthContext) -> Result<String, UpstreamError> {
        let base = self.base_urls.get(&provider).ok_or_else(|| {
            UpstreamError::Configuration(format!("no base URL for provider {}", provider))
        })?;

        if !base.contains(SUBDOMAIN_PLACEHOLDER) {
            return Ok(base.clone());
        }
        let subdomain = auth.subdomain().ok_or_else(|| {
            UpstreamError::Configuration(format!(
                "base URL for {} needs a subdomain",
                provider
            ))
        })?;
        Ok(base.replace(SUBDOMAIN_PLACEHOLDER, subdomain))
    }

    fn url(&self, request: &UpstreamRequest, auth: &AuthContext) -> Result<String, UpstreamError> {
        let base = self.base_url(request.provider, auth)?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            request.path.trim_start_matches('/')
        ))
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn get_json(
        &self,
        request: &UpstreamRequest,
        auth: &AuthContext,
    ) -> Result<Value, UpstreamError> {
        let url = self.url(request, auth)?;
        debug!(
            "GET {} (cursor: {})",
            url,
            request.cursor.as_ref().map_or("-", |c| c.as_str())
        );

        let mut builder = self.client.get(&url).query(&request.query);
        if let Some(cursor) = &request.cursor {
            builder = builder.query(&[("cursor", cursor.as_str())]);
        }
        if let Some(token) = auth.auth_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(account_id) = auth.account_id() {
            builder = builder.header("X-Account-Id", account_id);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                message.truncate(message.floor_char_boundary(MAX_ERROR_BODY));
            }
            if message.is_empty() {
                message = status.canonical_reason().unwrap_or("Unknown").to_string();
            }
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
