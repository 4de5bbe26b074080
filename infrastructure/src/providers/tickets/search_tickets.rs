//! `tickets.search_tickets`: tickets assigned to or requested by the
//! caller (broad-query topology), optionally narrowed by exactly one of a
//! status filter or a priority filter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_application::{
    ActionHandler, AggregateOptions, InvocationContext, PageSource, UpstreamClient,
    UpstreamRequest,
};
use switchboard_domain::{
    ActionDefinition, ActionError, ActionId, AggregationItem, DomainError, Provider, SchemaNode,
};

use super::{PRIORITIES, STATUSES, TICKET_KEY, tenant_credentials, ticket_schema};
use crate::providers::{limit, limit_schema, merged_output, merged_output_schema, optional_str};
use crate::upstream::UpstreamPageSource;

pub const ACTION: &str = "search_tickets";

/// Scopes queried, in merge order
pub const SCOPES: [&str; 2] = ["assigned", "requested"];

fn filter_schema() -> SchemaNode {
    SchemaNode::one_of([
        SchemaNode::object()
            .required_property("status", SchemaNode::string().enum_of(STATUSES))
            .closed(),
        SchemaNode::object()
            .required_property("priority", SchemaNode::string().enum_of(PRIORITIES))
            .closed(),
    ])
    .describe("Either a status filter or a priority filter")
}

pub fn definition() -> Result<ActionDefinition, DomainError> {
    Ok(ActionDefinition::new(
        ActionId::new(Provider::Tickets, ACTION)?,
        "Search tickets assigned to or requested by the caller",
    )
    .with_input(
        SchemaNode::object()
            .property("query", SchemaNode::string())
            .property("filter", filter_schema())
            .property("limit", limit_schema())
            .closed(),
    )
    .with_output(merged_output_schema("tickets", ticket_schema()))
    .with_credentials(tenant_credentials()))
}

pub struct SearchTickets {
    client: Arc<dyn UpstreamClient>,
}

impl SearchTickets {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self { client }
    }
}

fn scoped_search(scope: &str, params: &Value) -> UpstreamRequest {
    let mut request =
        UpstreamRequest::new(Provider::Tickets, "tickets/search").with_query("scope", scope);

    if let Some(query) = optional_str(params, "query") {
        request = request.with_query("query", query);
    }
    if let Some(filter) = params.get("filter") {
        for key in ["status", "priority"] {
            if let Some(value) = optional_str(filter, key) {
                request = request.with_query(key, value);
            }
        }
    }
    request
}

#[async_trait]
impl ActionHandler for SearchTickets {
    async fn invoke(&self, ctx: &InvocationContext, params: &Value) -> Result<Value, ActionError> {
        let scopes: Vec<Arc<dyn PageSource<AggregationItem>>> = SCOPES
            .iter()
            .map(|scope| -> Arc<dyn PageSource<AggregationItem>> {
                Arc::new(UpstreamPageSource::items(
                    *scope,
                    Arc::clone(&self.client),
                    scoped_search(scope, params),
                    ctx.auth().clone(),
                    TICKET_KEY,
                ))
            })
            .collect();

        let report = ctx
            .aggregation_engine()
            .broad_query(scopes, AggregateOptions::new().with_limit(limit(params)))
            .await?;

        Ok(merged_output(report, "tickets"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{ScriptedClient, token_ctx};
    use serde_json::json;
    use switchboard_domain::{ContractValidator, DefaultContractValidator, ViolationKind};

    #[test]
    fn test_filter_accepts_exactly_one_variant() {
        let input = definition().unwrap().input;
        let validator = DefaultContractValidator;

        assert!(
            validator
                .validate(&input, &json!({"filter": {"status": "open"}}))
                .is_ok()
        );
        assert!(
            validator
                .validate(&input, &json!({"filter": {"priority": "urgent"}}))
                .is_ok()
        );

        let both = validator
            .validate(
                &input,
                &json!({"filter": {"status": "open", "priority": "high"}}),
            )
            .unwrap_err();
        assert_eq!(both.field, "filter");
        assert!(matches!(both.kind, ViolationKind::NoVariantMatched { .. }));

        assert!(
            validator
                .validate(&input, &json!({"filter": {"status": "lost"}}))
                .is_err()
        );
    }

    #[test]
    fn test_scoped_search_query() {
        let request = scoped_search(
            "assigned",
            &json!({"query": "printer", "filter": {"priority": "high"}}),
        );
        assert_eq!(
            request.query,
            vec![
                ("scope".to_string(), "assigned".to_string()),
                ("query".to_string(), "printer".to_string()),
                ("priority".to_string(), "high".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_numeric_ids_dedup_across_scopes() {
        let client = Arc::new(
            ScriptedClient::new()
                .on(
                    "tickets/search",
                    &[("scope", "assigned"), ("status", "open")],
                    None,
                    json!({"items": [{"id": 1, "subject": "a"}, {"id": 2, "subject": "b"}], "nextCursor": "n"}),
                )
                .on(
                    "tickets/search",
                    &[("scope", "assigned")],
                    Some("n"),
                    json!({"items": [{"id": 3, "subject": "c"}]}),
                )
                .on(
                    "tickets/search",
                    &[("scope", "requested")],
                    None,
                    json!({"items": [{"id": 2, "subject": "b again"}, {"id": 4, "subject": "d"}]}),
                ),
        );

        let output = SearchTickets::new(client.clone())
            .invoke(&token_ctx(), &json!({"filter": {"status": "open"}}))
            .await
            .unwrap();

        let ids: Vec<_> = output["tickets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(output["tickets"][1]["subject"], "b");
        assert_eq!(client.calls(), 3);
    }
}
