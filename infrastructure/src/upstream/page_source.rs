//! Adapter from an [`UpstreamClient`] listing endpoint to a [`PageSource`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_application::ports::page_source::PageSource;
use switchboard_application::ports::upstream::{UpstreamClient, UpstreamError, UpstreamRequest};
use switchboard_domain::{ActionError, AggregationItem, AuthContext, Page, PageCursor, SourceDescriptor};
use tracing::warn;

type Decoder<T> = Arc<dyn Fn(Value) -> Result<T, UpstreamError> + Send + Sync>;

/// One listing endpoint, re-requested with each continuation cursor.
pub struct UpstreamPageSource<T> {
    label: String,
    client: Arc<dyn UpstreamClient>,
    request: UpstreamRequest,
    auth: AuthContext,
    decode: Decoder<T>,
}

impl<T> UpstreamPageSource<T> {
    pub fn new(
        label: impl Into<String>,
        client: Arc<dyn UpstreamClient>,
        request: UpstreamRequest,
        auth: AuthContext,
        decode: impl Fn(Value) -> Result<T, UpstreamError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            client,
            request,
            auth,
            decode: Arc::new(decode),
        }
    }
}

impl UpstreamPageSource<AggregationItem> {
    /// Items keyed by `key_field` (string or number)
    pub fn items(
        label: impl Into<String>,
        client: Arc<dyn UpstreamClient>,
        request: UpstreamRequest,
        auth: AuthContext,
        key_field: &'static str,
    ) -> Self {
        Self::new(label, client, request, auth, move |value| {
            AggregationItem::from_value(value, key_field).ok_or_else(|| {
                UpstreamError::Decode(format!("listing item without usable {}", key_field))
            })
        })
    }
}

impl UpstreamPageSource<SourceDescriptor> {
    /// Shard listing; each item must carry `id` and `name`
    pub fn shards(
        label: impl Into<String>,
        client: Arc<dyn UpstreamClient>,
        request: UpstreamRequest,
        auth: AuthContext,
    ) -> Self {
        Self::new(label, client, request, auth, |value| {
            serde_json::from_value(value).map_err(|e| UpstreamError::Decode(e.to_string()))
        })
    }
}

#[async_trait]
impl<T: Send + 'static> PageSource<T> for UpstreamPageSource<T> {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn fetch_page(&self, cursor: Option<&PageCursor>) -> Result<Page<T>, ActionError> {
        let request = self.request.clone().with_cursor(cursor);
        let page = self.client.get_page(&request, &self.auth).await?;

        let items = page
            .items
            .into_iter()
            .filter_map(|item| match (self.decode)(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("Source {} skipped an undecodable item: {}", self.label, e);
                    None
                }
            })
            .collect();

        Ok(Page {
            items,
            next_cursor: page.next_cursor,
        })
    }
}
