//! Per-call credentials and the credential requirements actions declare.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::error::ActionError;

/// Credentials supplied by the caller for a single invocation.
///
/// Never persisted and never mutated by the core; implementations only get
/// a shared reference. `Debug` output redacts every value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subdomain: Option<String>,
    /// Provider-specific credential fields beyond the common three.
    /// Only string values are credentials; other values are ignored.
    #[serde(default, flatten, deserialize_with = "string_fields")]
    extra: BTreeMap<String, String>,
}

fn string_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let fields = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(value) => Some((name, value)),
            _ => None,
        })
        .collect())
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Value of a credential field; blank values count as absent.
    pub fn get(&self, field: &CredentialField) -> Option<&str> {
        let value = match field {
            CredentialField::AuthToken => self.auth_token.as_deref(),
            CredentialField::AccountId => self.account_id.as_deref(),
            CredentialField::Subdomain => self.subdomain.as_deref(),
            CredentialField::Extra(name) => self.extra.get(name).map(String::as_str),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn has(&self, field: &CredentialField) -> bool {
        self.get(field).is_some()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.get(&CredentialField::AuthToken)
    }

    pub fn account_id(&self) -> Option<&str> {
        self.get(&CredentialField::AccountId)
    }

    pub fn subdomain(&self) -> Option<&str> {
        self.get(&CredentialField::Subdomain)
    }

    /// Names of the fields that carry a value, for diagnostics.
    pub fn present_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = [
            CredentialField::AuthToken,
            CredentialField::AccountId,
            CredentialField::Subdomain,
        ]
        .into_iter()
        .filter(|f| self.has(f))
        .map(|f| f.to_string())
        .collect();
        fields.extend(
            self.extra
                .iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, _)| k.clone()),
        );
        fields
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("present", &self.present_fields())
            .finish()
    }
}

/// One credential field an action can require
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CredentialField {
    AuthToken,
    AccountId,
    Subdomain,
    Extra(String),
}

impl CredentialField {
    pub fn as_str(&self) -> &str {
        match self {
            CredentialField::AuthToken => "authToken",
            CredentialField::AccountId => "accountId",
            CredentialField::Subdomain => "subdomain",
            CredentialField::Extra(name) => name,
        }
    }

    /// Fixed error string used when the field is absent.
    pub fn sentinel(&self) -> String {
        match self {
            CredentialField::AuthToken => "MISSING_AUTH_TOKEN".to_string(),
            CredentialField::AccountId => "MISSING_ACCOUNT_ID".to_string(),
            CredentialField::Subdomain => "MISSING_SUBDOMAIN".to_string(),
            CredentialField::Extra(name) => format!("MISSING_CREDENTIAL:{name}"),
        }
    }
}

impl std::fmt::Display for CredentialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for CredentialField {
    fn from(s: String) -> Self {
        match s.as_str() {
            "authToken" => CredentialField::AuthToken,
            "accountId" => CredentialField::AccountId,
            "subdomain" => CredentialField::Subdomain,
            _ => CredentialField::Extra(s),
        }
    }
}

impl From<CredentialField> for String {
    fn from(field: CredentialField) -> Self {
        field.as_str().to_string()
    }
}

/// The credential fields an action declares it needs, checked in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRequirement(Vec<CredentialField>);

impl CredentialRequirement {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// The common case: a bearer token and nothing else.
    pub fn token() -> Self {
        Self(vec![CredentialField::AuthToken])
    }

    pub fn of(fields: impl IntoIterator<Item = CredentialField>) -> Self {
        let mut out: Vec<CredentialField> = Vec::new();
        for field in fields {
            if !out.contains(&field) {
                out.push(field);
            }
        }
        Self(out)
    }

    pub fn fields(&self) -> &[CredentialField] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First declared field the context lacks, in declaration order.
    pub fn first_missing(&self, auth: &AuthContext) -> Option<&CredentialField> {
        self.0.iter().find(|field| !auth.has(field))
    }

    /// Presence check only; validity is left to the upstream.
    pub fn check(&self, auth: &AuthContext) -> Result<(), ActionError> {
        match self.first_missing(auth) {
            Some(field) => Err(ActionError::MissingCredential(field.clone())),
            None => Ok(()),
        }
    }
}
