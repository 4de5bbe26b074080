//! `tickets.get_ticket`: one ticket by numeric id.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_application::{ActionHandler, InvocationContext, UpstreamClient, UpstreamRequest};
use switchboard_domain::{
    ActionDefinition, ActionError, ActionId, DomainError, Provider, SchemaNode,
};

use super::{tenant_credentials, ticket_schema};
use crate::providers::integer_param;

pub const ACTION: &str = "get_ticket";

pub fn definition() -> Result<ActionDefinition, DomainError> {
    Ok(ActionDefinition::new(
        ActionId::new(Provider::Tickets, ACTION)?,
        "Fetch a single ticket",
    )
    .with_input(
        SchemaNode::object()
            .required_property("ticketId", SchemaNode::integer().min(1.0))
            .closed(),
    )
    .with_output(ticket_schema())
    .with_credentials(tenant_credentials()))
}

pub struct GetTicket {
    client: Arc<dyn UpstreamClient>,
}

impl GetTicket {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionHandler for GetTicket {
    async fn invoke(&self, ctx: &InvocationContext, params: &Value) -> Result<Value, ActionError> {
        let ticket_id = integer_param(params, "ticketId")
            .ok_or_else(|| ActionError::internal("handler expected integer param ticketId"))?;
        let request = UpstreamRequest::new(Provider::Tickets, format!("tickets/{}", ticket_id));

        let mut body = self.client.get_json(&request, ctx.auth()).await?;
        // Listing and single endpoints differ only by this wrapper
        Ok(match body.get_mut("ticket") {
            Some(ticket) => ticket.take(),
            None => body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{ScriptedClient, token_ctx};
    use serde_json::json;
    use switchboard_domain::ContractValidator;

    #[tokio::test]
    async fn test_unwraps_ticket() {
        let client = Arc::new(ScriptedClient::new().on(
            "tickets/35",
            &[],
            None,
            json!({"ticket": {"id": 35, "subject": "Printer on fire", "status": "open"}}),
        ));

        let ticket = GetTicket::new(client)
            .invoke(&token_ctx(), &json!({"ticketId": 35}))
            .await
            .unwrap();

        assert_eq!(ticket["subject"], "Printer on fire");
    }

    #[tokio::test]
    async fn test_whole_float_ticket_id() {
        let params = json!({"ticketId": 35.0});
        let definition = definition().unwrap();
        assert!(
            switchboard_domain::DefaultContractValidator
                .validate(&definition.input, &params)
                .is_ok()
        );

        let client = Arc::new(ScriptedClient::new().on(
            "tickets/35",
            &[],
            None,
            json!({"ticket": {"id": 35, "subject": "Printer on fire"}}),
        ));
        let ticket = GetTicket::new(client)
            .invoke(&token_ctx(), &params)
            .await
            .unwrap();

        assert_eq!(ticket["id"], 35);
    }

    #[test]
    fn test_requires_subdomain() {
        let definition = definition().unwrap();
        let err = definition
            .credentials
            .check(&switchboard_domain::AuthContext::new().with_auth_token("t"))
            .unwrap_err();
        assert_eq!(err.to_string(), "MISSING_SUBDOMAIN");
    }
}
