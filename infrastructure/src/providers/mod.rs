//! Bundled provider bindings
//!
//! Each binding is an [`ActionDefinition`](switchboard_domain::ActionDefinition)
//! plus an [`ActionHandler`](switchboard_application::ActionHandler) that
//! talks to its provider through the `UpstreamClient` port. Aggregating
//! bindings hand their branches to the invocation's `AggregationEngine`.
//!
//! | Action | Topology | Credentials |
//! |--------|----------|-------------|
//! | `drive.search_files` | per-shard (personal + shared drives) | token |
//! | `drive.search_by_keywords` | broad-query (`shared`, `organization`) | token |
//! | `drive.get_file` | single call | token |
//! | `tickets.get_ticket` | single call | token, subdomain |
//! | `tickets.search_tickets` | broad-query (`assigned`, `requested`) | token, subdomain |

pub mod drive;
pub mod tickets;

use std::sync::Arc;

use serde_json::{Map, Value};
use switchboard_application::{ActionDescriptor, UpstreamClient};
use switchboard_domain::{ActionError, AggregationItem, DomainError, MergeReport, SchemaNode};

/// Every bundled action, in registration order
pub fn builtin_descriptors(
    client: Arc<dyn UpstreamClient>,
) -> Result<Vec<ActionDescriptor>, DomainError> {
    let mut descriptors = drive::descriptors(Arc::clone(&client))?;
    descriptors.extend(tickets::descriptors(client)?);
    Ok(descriptors)
}

/// Params reaching a handler already satisfy the input contract, so a
/// missing field here means the contract and the handler disagree.
pub(crate) fn required_str<'a>(params: &'a Value, field: &str) -> Result<&'a str, ActionError> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ActionError::internal(format!("handler expected string param {}", field)))
}

pub(crate) fn optional_str<'a>(params: &'a Value, field: &str) -> Option<&'a str> {
    params.get(field).and_then(Value::as_str)
}

/// Non-negative integer param. The contract's `integer` type admits
/// whole-number floats such as `2.0`, so those are read too.
pub(crate) fn integer_param(params: &Value, field: &str) -> Option<u64> {
    let value = params.get(field)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

pub(crate) fn limit(params: &Value) -> Option<usize> {
    integer_param(params, "limit").map(|n| n as usize)
}

pub(crate) fn limit_schema() -> SchemaNode {
    SchemaNode::integer()
        .min(1.0)
        .describe("Maximum number of results after merging")
}

/// `{<collection>: [...], partial, failedSources}`
pub(crate) fn merged_output(report: MergeReport<AggregationItem>, collection: &str) -> Value {
    let partial = report.is_partial();
    let failed: Vec<Value> = report
        .failed
        .into_iter()
        .map(|f| Value::String(f.label))
        .collect();
    let items: Vec<Value> = report
        .items
        .into_iter()
        .map(AggregationItem::into_value)
        .collect();

    let mut output = Map::new();
    output.insert(collection.to_string(), Value::Array(items));
    output.insert("partial".to_string(), Value::Bool(partial));
    output.insert("failedSources".to_string(), Value::Array(failed));
    Value::Object(output)
}

pub(crate) fn merged_output_schema(collection: &str, item: SchemaNode) -> SchemaNode {
    SchemaNode::object()
        .required_property(collection, SchemaNode::array(item))
        .required_property(
            "partial",
            SchemaNode::boolean().describe("Whether some sources failed and were left out"),
        )
        .required_property("failedSources", SchemaNode::array(SchemaNode::string()))
}
