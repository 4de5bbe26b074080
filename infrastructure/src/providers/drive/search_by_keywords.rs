//! `drive.search_by_keywords`: keyword search over the `shared` and
//! `organization` scopes (broad-query topology).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_application::{
    ActionHandler, AggregateOptions, InvocationContext, PageSource, UpstreamClient,
};
use switchboard_domain::{
    ActionDefinition, ActionError, ActionId, AggregationItem, CredentialRequirement, DomainError,
    Provider, SchemaNode,
};

use super::{FILE_KEY, file_schema, file_search};
use crate::providers::{limit, limit_schema, merged_output, merged_output_schema};
use crate::upstream::UpstreamPageSource;

pub const ACTION: &str = "search_by_keywords";

/// Scopes queried, in merge order
pub const SCOPES: [&str; 2] = ["shared", "organization"];

pub fn definition() -> Result<ActionDefinition, DomainError> {
    Ok(ActionDefinition::new(
        ActionId::new(Provider::Drive, ACTION)?,
        "Search file contents for all keywords in shared and organization-wide files",
    )
    .with_input(
        SchemaNode::object()
            .required_property(
                "keywords",
                SchemaNode::array(SchemaNode::string()).describe("Every keyword must match"),
            )
            .property("limit", limit_schema())
            .closed(),
    )
    .with_output(merged_output_schema("files", file_schema()))
    .with_credentials(CredentialRequirement::token()))
}

pub struct SearchByKeywords {
    client: Arc<dyn UpstreamClient>,
}

impl SearchByKeywords {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self { client }
    }
}

fn keyword_query(params: &Value) -> String {
    params
        .get("keywords")
        .and_then(Value::as_array)
        .map(|keywords| {
            keywords
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

#[async_trait]
impl ActionHandler for SearchByKeywords {
    async fn invoke(&self, ctx: &InvocationContext, params: &Value) -> Result<Value, ActionError> {
        let query = keyword_query(params);

        let scopes: Vec<Arc<dyn PageSource<AggregationItem>>> = SCOPES
            .iter()
            .map(|scope| -> Arc<dyn PageSource<AggregationItem>> {
                Arc::new(UpstreamPageSource::items(
                    *scope,
                    Arc::clone(&self.client),
                    file_search(&query, scope),
                    ctx.auth().clone(),
                    FILE_KEY,
                ))
            })
            .collect();

        let report = ctx
            .aggregation_engine()
            .broad_query(scopes, AggregateOptions::new().with_limit(limit(params)))
            .await?;

        Ok(merged_output(report, "files"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{ScriptedClient, token_ctx as ctx};
    use serde_json::json;
    use switchboard_domain::ContractValidator;

    #[test]
    fn test_keyword_query_joins_non_empty() {
        let params = json!({"keywords": ["quarterly", " ", " report "]});
        assert_eq!(keyword_query(&params), "quarterly report");
    }

    #[tokio::test]
    async fn test_shared_wins_over_organization() {
        let client = Arc::new(
            ScriptedClient::new()
                .on(
                    "files",
                    &[("corpora", "shared"), ("q", "q3 budget")],
                    None,
                    json!({"items": [{"id": "42", "name": "from shared"}]}),
                )
                .on(
                    "files",
                    &[("corpora", "organization")],
                    None,
                    json!({"items": [{"id": "42", "name": "from org"}, {"id": "7", "name": "other"}]}),
                ),
        );

        let output = SearchByKeywords::new(client)
            .invoke(&ctx(), &json!({"keywords": ["q3", "budget"]}))
            .await
            .unwrap();

        let files = output["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["name"], "from shared");
        assert_eq!(files[1]["id"], "7");
        assert_eq!(output["partial"], false);
    }

    #[tokio::test]
    async fn test_one_scope_failing_is_partial() {
        let client = Arc::new(ScriptedClient::new().on(
            "files",
            &[("corpora", "organization")],
            None,
            json!({"items": [{"id": "7", "name": "other"}]}),
        ));

        let output = SearchByKeywords::new(client)
            .invoke(&ctx(), &json!({"keywords": ["x"]}))
            .await
            .unwrap();

        assert_eq!(output["files"].as_array().unwrap().len(), 1);
        assert_eq!(output["failedSources"], json!(["shared"]));
    }

    #[tokio::test]
    async fn test_whole_float_limit_truncates() {
        let params = json!({"keywords": ["q"], "limit": 1.0});
        assert!(
            switchboard_domain::DefaultContractValidator
                .validate(&definition().unwrap().input, &params)
                .is_ok()
        );

        let client = Arc::new(
            ScriptedClient::new()
                .on(
                    "files",
                    &[("corpora", "shared")],
                    None,
                    json!({"items": [{"id": "1", "name": "a"}, {"id": "2", "name": "b"}]}),
                )
                .on(
                    "files",
                    &[("corpora", "organization")],
                    None,
                    json!({"items": [{"id": "3", "name": "c"}]}),
                ),
        );

        let output = SearchByKeywords::new(client)
            .invoke(&ctx(), &params)
            .await
            .unwrap();

        assert_eq!(output["files"].as_array().unwrap().len(), 1);
        assert_eq!(output["files"][0]["id"], "1");
    }
}
