//! Ticketing provider (`tickets`)
//!
//! Per-tenant: the base URL carries a `{subdomain}` placeholder, so every
//! ticket action requires both the token and the subdomain.

mod get_ticket;
mod search_tickets;

pub use get_ticket::GetTicket;
pub use search_tickets::SearchTickets;

use std::sync::Arc;

use switchboard_application::{ActionDescriptor, UpstreamClient};
use switchboard_domain::{CredentialField, CredentialRequirement, DomainError, SchemaNode};

pub(crate) const TICKET_KEY: &str = "id";

pub const STATUSES: [&str; 5] = ["new", "open", "pending", "solved", "closed"];
pub const PRIORITIES: [&str; 4] = ["low", "normal", "high", "urgent"];

pub fn descriptors(client: Arc<dyn UpstreamClient>) -> Result<Vec<ActionDescriptor>, DomainError> {
    Ok(vec![
        ActionDescriptor::new(
            get_ticket::definition()?,
            Arc::new(GetTicket::new(Arc::clone(&client))),
        ),
        ActionDescriptor::new(
            search_tickets::definition()?,
            Arc::new(SearchTickets::new(client)),
        ),
    ])
}

pub(crate) fn tenant_credentials() -> CredentialRequirement {
    CredentialRequirement::of([CredentialField::AuthToken, CredentialField::Subdomain])
}

pub(crate) fn ticket_schema() -> SchemaNode {
    SchemaNode::object()
        .required_property("id", SchemaNode::integer())
        .required_property("subject", SchemaNode::string())
        .property("status", SchemaNode::string().enum_of(STATUSES))
        .property(
            "priority",
            SchemaNode::string().enum_of(PRIORITIES).nullable(),
        )
}
