//! `drive.search_files`: name search over the personal store and every
//! shared drive (per-shard topology).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use switchboard_application::{
    ActionHandler, AggregateOptions, InvocationContext, PageSource, UpstreamClient,
    UpstreamRequest,
};
use switchboard_domain::{
    ActionDefinition, ActionError, ActionId, AggregationItem, CredentialRequirement, DomainError,
    Provider, SchemaNode, SourceDescriptor,
};

use super::{FILE_KEY, file_schema, file_search, is_content};
use crate::providers::{limit, limit_schema, merged_output, merged_output_schema, required_str};
use crate::upstream::UpstreamPageSource;

pub const ACTION: &str = "search_files";

pub fn definition() -> Result<ActionDefinition, DomainError> {
    Ok(ActionDefinition::new(
        ActionId::new(Provider::Drive, ACTION)?,
        "Search files by name across the personal store and all shared drives",
    )
    .with_input(
        SchemaNode::object()
            .required_property(
                "query",
                SchemaNode::string().describe("Text matched against file names"),
            )
            .property("limit", limit_schema())
            .closed(),
    )
    .with_output(merged_output_schema("files", file_schema()).required_property(
        "searchedDrives",
        SchemaNode::integer()
            .min(0.0)
            .describe("Shared drives fanned out to"),
    ))
    .with_credentials(CredentialRequirement::token()))
}

pub struct SearchFiles {
    client: Arc<dyn UpstreamClient>,
}

impl SearchFiles {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionHandler for SearchFiles {
    async fn invoke(&self, ctx: &InvocationContext, params: &Value) -> Result<Value, ActionError> {
        let query = required_str(params, "query")?;
        let auth = ctx.auth().clone();

        let personal: Arc<dyn PageSource<AggregationItem>> = Arc::new(UpstreamPageSource::items(
            "personal",
            Arc::clone(&self.client),
            file_search(query, "user"),
            auth.clone(),
            FILE_KEY,
        ));
        let discovery = UpstreamPageSource::shards(
            "shared drives",
            Arc::clone(&self.client),
            UpstreamRequest::new(Provider::Drive, "drives"),
            auth.clone(),
        );

        let client = Arc::clone(&self.client);
        let in_drive = file_search(query, "drive");
        let shard_source = move |drive: &SourceDescriptor| -> Arc<dyn PageSource<AggregationItem>> {
            Arc::new(UpstreamPageSource::items(
                format!("drive {}", drive.name),
                Arc::clone(&client),
                in_drive.clone().with_query("driveId", drive.id.clone()),
                auth.clone(),
                FILE_KEY,
            ))
        };

        let options = AggregateOptions::new()
            .with_limit(limit(params))
            .with_filter(is_content);
        let sharded = ctx
            .aggregation_engine()
            .per_shard(&discovery, vec![personal], shard_source, options)
            .await?;

        let mut output = merged_output(sharded.report, "files");
        output["searchedDrives"] = json!(sharded.shards.len());
        Ok(output)
    }
}
