//! Upstream client port
//!
//! The transport seam between action handlers and the remote provider
//! APIs. Handlers describe *what* to fetch with an [`UpstreamRequest`];
//! the adapter in the infrastructure layer owns base URLs, auth headers
//! and the wire format.

use async_trait::async_trait;
use serde_json::Value;
use switchboard_domain::{ActionError, AuthContext, Page, PageCursor, Provider};
use thiserror::Error;

/// Errors from the upstream transport
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("undecodable upstream response: {0}")]
    Decode(String),

    #[error("upstream not configured: {0}")]
    Configuration(String),
}

impl From<UpstreamError> for ActionError {
    fn from(err: UpstreamError) -> Self {
        ActionError::upstream(err.to_string())
    }
}

/// A read request against one provider
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub provider: Provider,
    /// Path relative to the provider's base URL
    pub path: String,
    pub query: Vec<(String, String)>,
    pub cursor: Option<PageCursor>,
}

impl UpstreamRequest {
    pub fn new(provider: Provider, path: impl Into<String>) -> Self {
        Self {
            provider,
            path: path.into(),
            query: Vec::new(),
            cursor: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_cursor(mut self, cursor: Option<&PageCursor>) -> Self {
        self.cursor = cursor.cloned();
        self
    }
}

/// Port for reading from provider APIs
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get_json(
        &self,
        request: &UpstreamRequest,
        auth: &AuthContext,
    ) -> Result<Value, UpstreamError>;

    /// Fetch one page of a listing endpoint.
    ///
    /// Default implementation expects `{"items": [...], "nextCursor": "..."}`.
    async fn get_page(
        &self,
        request: &UpstreamRequest,
        auth: &AuthContext,
    ) -> Result<Page<Value>, UpstreamError> {
        let body = self.get_json(request, auth).await?;
        parse_page(body)
    }
}

/// Decode a listing response body into a [`Page`].
///
/// A missing, null or empty `nextCursor` marks the last page.
pub fn parse_page(body: Value) -> Result<Page<Value>, UpstreamError> {
    let Value::Object(mut map) = body else {
        return Err(UpstreamError::Decode(
            "listing response is not an object".to_string(),
        ));
    };

    let items = match map.remove("items") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(UpstreamError::Decode(format!(
                "items is not an array: {}",
                other
            )));
        }
        None => return Err(UpstreamError::Decode("missing items".to_string())),
    };

    let next_cursor = match map.get("nextCursor") {
        Some(Value::String(token)) => PageCursor::from_token(Some(token)),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(UpstreamError::Decode(format!(
                "nextCursor is not a string: {}",
                other
            )));
        }
    };

    Ok(Page { items, next_cursor })
}
