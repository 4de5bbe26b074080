//! Page source port
//!
//! One paginated upstream collection (a scope, a shard, or the shard
//! listing itself). The aggregation engine drives it cursor by cursor.

use async_trait::async_trait;
use switchboard_domain::{ActionError, Page, PageCursor};

#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    /// Name for logs and branch failure reports
    fn label(&self) -> String;

    /// Fetch one page. `None` requests the first page.
    async fn fetch_page(&self, cursor: Option<&PageCursor>) -> Result<Page<T>, ActionError>;
}
