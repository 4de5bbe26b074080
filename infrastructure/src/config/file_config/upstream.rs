//! Upstream HTTP configuration from TOML (`[upstream]` section)
//!
//! ```toml
//! [upstream]
//! timeout_seconds = 30
//!
//! [upstream.base_urls]
//! drive = "https://drive.example.com/api/v1"
//! tickets = "https://{subdomain}.tickets.example.com/api/v2"
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_application::UpstreamError;
use switchboard_domain::Provider;

use super::ConfigValidationError;
use crate::upstream::HttpUpstreamClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUpstreamConfig {
    /// Per-request timeout (default: 30)
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Provider name -> base URL
    pub base_urls: BTreeMap<String, String>,
}

impl Default for FileUpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("switchboard/{}", env!("CARGO_PKG_VERSION")),
            base_urls: BTreeMap::new(),
        }
    }
}

impl FileUpstreamConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroValue("upstream.timeout_seconds"));
        }
        self.providers().map(|_| ())
    }

    /// Base URLs keyed by provider
    pub fn providers(&self) -> Result<Vec<(Provider, &str)>, ConfigValidationError> {
        self.base_urls
            .iter()
            .map(|(name, url)| {
                let provider = name
                    .parse::<Provider>()
                    .map_err(|_| ConfigValidationError::UnknownProvider(name.clone()))?;
                if url.trim().is_empty() {
                    return Err(ConfigValidationError::EmptyBaseUrl(name.clone()));
                }
                Ok((provider, url.as_str()))
            })
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build the HTTP client for the configured providers.
    ///
    /// Entries that fail [`validate`](Self::validate) are skipped here, so
    /// callers should validate first.
    pub fn build_client(&self) -> Result<HttpUpstreamClient, UpstreamError> {
        let mut client = HttpUpstreamClient::new(self.timeout(), &self.user_agent)?;
        for (provider, url) in self.providers().unwrap_or_default() {
            client = client.with_base_url(provider, url);
        }
        Ok(client)
    }
}
