//! File storage provider (`drive`)
//!
//! Listing endpoints return `{items, nextCursor}`. Files are searched with
//! `GET files?q=<query>&corpora=<scope>`; shared drives are listed with
//! `GET drives`.

mod get_file;
mod search_by_keywords;
mod search_files;

pub use get_file::GetFile;
pub use search_by_keywords::SearchByKeywords;
pub use search_files::SearchFiles;

use std::sync::Arc;

use switchboard_application::{ActionDescriptor, UpstreamClient, UpstreamRequest};
use switchboard_domain::{AggregationItem, DomainError, Provider, SchemaNode};

/// Folder entries carry no content and are excluded from searches
pub const FOLDER_MIME_TYPE: &str = "application/vnd.folder";

/// Identity key of a file across stores
pub(crate) const FILE_KEY: &str = "id";

pub fn descriptors(client: Arc<dyn UpstreamClient>) -> Result<Vec<ActionDescriptor>, DomainError> {
    Ok(vec![
        ActionDescriptor::new(
            search_files::definition()?,
            Arc::new(SearchFiles::new(Arc::clone(&client))),
        ),
        ActionDescriptor::new(
            search_by_keywords::definition()?,
            Arc::new(SearchByKeywords::new(Arc::clone(&client))),
        ),
        ActionDescriptor::new(get_file::definition()?, Arc::new(GetFile::new(client))),
    ])
}

pub(crate) fn file_schema() -> SchemaNode {
    SchemaNode::object()
        .required_property("id", SchemaNode::string())
        .required_property("name", SchemaNode::string())
        .property("mimeType", SchemaNode::string())
        .property(
            "driveId",
            SchemaNode::string()
                .nullable()
                .describe("Shared drive holding the file; absent for the personal store"),
        )
        .property("modifiedTime", SchemaNode::string())
}

pub(crate) fn file_search(query: &str, corpora: &str) -> UpstreamRequest {
    UpstreamRequest::new(Provider::Drive, "files")
        .with_query("q", query)
        .with_query("corpora", corpora)
}

pub(crate) fn is_content(item: &AggregationItem) -> bool {
    item.get_str("mimeType") != Some(FOLDER_MIME_TYPE)
}
