//! Output formatter trait

use serde_json::{Value, json};
use switchboard_domain::{ActionDefinition, ResultEnvelope};

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;

/// Trait for rendering gateway results and the action catalog
pub trait OutputFormatter {
    /// Format the envelope of one invocation
    fn format_envelope(&self, envelope: &ResultEnvelope<Value>) -> String;

    /// Format a listing of registered actions
    fn format_actions(&self, definitions: &[&ActionDefinition]) -> String;

    /// Format the contracts of one action
    fn format_contracts(&self, definition: &ActionDefinition) -> String;
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Pretty => Box::new(ConsoleFormatter),
    }
}

/// Pretty-printed JSON; stdout stays machine-readable
pub struct JsonFormatter;

impl JsonFormatter {
    pub(crate) fn contracts_value(definition: &ActionDefinition) -> Value {
        json!({
            "id": definition.id.to_string(),
            "description": definition.description,
            "credentials": definition.credentials,
            "input": definition.input,
            "output": definition.output,
        })
    }

    fn render(value: &impl serde::Serialize) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_envelope(&self, envelope: &ResultEnvelope<Value>) -> String {
        Self::render(envelope)
    }

    fn format_actions(&self, definitions: &[&ActionDefinition]) -> String {
        let listing: Vec<Value> = definitions
            .iter()
            .map(|d| {
                json!({
                    "id": d.id.to_string(),
                    "description": d.description,
                    "credentials": d.credentials,
                })
            })
            .collect();
        Self::render(&listing)
    }

    fn format_contracts(&self, definition: &ActionDefinition) -> String {
        Self::render(&Self::contracts_value(definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::{ActionError, ActionId, CredentialRequirement, Provider, SchemaNode};

    fn definition() -> ActionDefinition {
        ActionDefinition::new(
            ActionId::new(Provider::Drive, "get_file").unwrap(),
            "Fetch metadata for a single file",
        )
        .with_input(SchemaNode::object().required_property("fileId", SchemaNode::string()))
        .with_credentials(CredentialRequirement::token())
    }

    #[test]
    fn test_json_envelope_shapes() {
        let ok = ResultEnvelope::ok(json!({"id": "f1"}));
        let parsed: Value = serde_json::from_str(&JsonFormatter.format_envelope(&ok)).unwrap();
        assert_eq!(parsed, json!({"success": true, "data": {"id": "f1"}}));

        let failed: ResultEnvelope<Value> =
            Err(ActionError::MissingCredential(switchboard_domain::CredentialField::AuthToken))
                .into();
        let parsed: Value =
            serde_json::from_str(&JsonFormatter.format_envelope(&failed)).unwrap();
        assert_eq!(parsed, json!({"success": false, "error": "MISSING_AUTH_TOKEN"}));
    }

    #[test]
    fn test_json_actions_listing() {
        let definition = definition();
        let parsed: Value =
            serde_json::from_str(&JsonFormatter.format_actions(&[&definition])).unwrap();

        assert_eq!(parsed[0]["id"], "drive.get_file");
        assert_eq!(parsed[0]["credentials"], json!(["authToken"]));
        assert!(parsed[0].get("input").is_none());
    }

    #[test]
    fn test_json_contracts() {
        let parsed: Value =
            serde_json::from_str(&JsonFormatter.format_contracts(&definition())).unwrap();
        assert_eq!(parsed["input"]["required"], json!(["fileId"]));
        assert_eq!(parsed["input"]["properties"]["fileId"]["type"], "string");
    }
}
