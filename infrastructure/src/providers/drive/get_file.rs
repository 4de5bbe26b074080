//! `drive.get_file`: metadata of one file.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_application::{ActionHandler, InvocationContext, UpstreamClient, UpstreamRequest};
use switchboard_domain::{
    ActionDefinition, ActionError, ActionId, CredentialRequirement, DomainError, Provider,
    SchemaNode,
};

use super::file_schema;
use crate::providers::required_str;

pub const ACTION: &str = "get_file";

pub fn definition() -> Result<ActionDefinition, DomainError> {
    Ok(ActionDefinition::new(
        ActionId::new(Provider::Drive, ACTION)?,
        "Fetch metadata for a single file",
    )
    .with_input(
        SchemaNode::object()
            .required_property("fileId", SchemaNode::string())
            .closed(),
    )
    .with_output(file_schema())
    .with_credentials(CredentialRequirement::token()))
}

pub struct GetFile {
    client: Arc<dyn UpstreamClient>,
}

impl GetFile {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionHandler for GetFile {
    async fn invoke(&self, ctx: &InvocationContext, params: &Value) -> Result<Value, ActionError> {
        let file_id = required_str(params, "fileId")?;
        let request = UpstreamRequest::new(Provider::Drive, format!("files/{}", file_id));

        Ok(self.client.get_json(&request, ctx.auth()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{ScriptedClient, token_ctx as ctx};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_file() {
        let client = Arc::new(ScriptedClient::new().on(
            "files/f1",
            &[],
            None,
            json!({"id": "f1", "name": "a.txt"}),
        ));

        let file = GetFile::new(client)
            .invoke(&ctx(), &json!({"fileId": "f1"}))
            .await
            .unwrap();

        assert_eq!(file["name"], "a.txt");
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream_error() {
        let client = Arc::new(ScriptedClient::new());

        let err = GetFile::new(client)
            .invoke(&ctx(), &json!({"fileId": "nope"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Upstream(_)));
        assert!(err.to_string().contains("404"));
    }
}
