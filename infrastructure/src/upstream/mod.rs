//! Upstream transport adapters
//!
//! - [`HttpUpstreamClient`]: reqwest implementation of the `UpstreamClient` port
//! - [`UpstreamPageSource`]: turns a listing endpoint into a `PageSource`

mod http;
mod page_source;

pub use http::{HttpUpstreamClient, SUBDOMAIN_PLACEHOLDER};
pub use page_source::UpstreamPageSource;
