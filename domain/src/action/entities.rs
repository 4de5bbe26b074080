//! Action domain entities

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::auth::CredentialRequirement;
use crate::contract::SchemaNode;
use crate::core::error::DomainError;

/// A named external service family
///
/// The set of providers is closed: every binding the registry can hold
/// belongs to one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// File storage (personal store plus shared drives)
    Drive,
    /// Ticketing system scoped to a customer subdomain
    Tickets,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Drive, Provider::Tickets];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Drive => "drive",
            Provider::Tickets => "tickets",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownProvider(s.to_string()))
    }
}

/// Identity of one action: `(provider, action)`
///
/// Action keys are snake_case identifiers (e.g. `search_files`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId {
    pub provider: Provider,
    pub action: String,
}

impl ActionId {
    /// Create an id, checking the action key shape.
    pub fn new(provider: Provider, action: impl Into<String>) -> Result<Self, DomainError> {
        let action = action.into();
        let valid = !action.is_empty()
            && action
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(DomainError::InvalidActionKey(action));
        }
        Ok(Self { provider, action })
    }

    /// Parse a `(provider, action)` pair supplied as strings by a caller.
    pub fn parse(provider: &str, action: &str) -> Result<Self, DomainError> {
        let provider = provider.parse::<Provider>()?;
        Self::new(provider, action.trim())
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.provider, self.action)
    }
}

impl FromStr for ActionId {
    type Err = DomainError;

    /// Parses the dotted form `provider.action`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((provider, action)) => Self::parse(provider, action),
            None => Err(DomainError::InvalidActionKey(s.to_string())),
        }
    }
}

/// Declarative description of an action: identity, contracts and the
/// credentials that must be present before it may run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: ActionId,
    pub description: String,
    pub input: SchemaNode,
    pub output: SchemaNode,
    #[serde(default)]
    pub credentials: CredentialRequirement,
}

impl ActionDefinition {
    pub fn new(id: ActionId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            input: SchemaNode::object(),
            output: SchemaNode::any(),
            credentials: CredentialRequirement::none(),
        }
    }

    pub fn with_input(mut self, input: SchemaNode) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: SchemaNode) -> Self {
        self.output = output;
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialRequirement) -> Self {
        self.credentials = credentials;
        self
    }
}
