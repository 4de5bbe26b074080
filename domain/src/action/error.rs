//! Action error taxonomy
//!
//! Every failure an invocation can end in is one [`ActionError`] variant.
//! [`ErrorClass`] groups them for logs and the invocation event log, so
//! operators can tell "caller's fault" from "implementation's fault".
//!
//! | Variant | Class | Fatal to |
//! |---------|-------|----------|
//! | `MissingCredential` | `credential` | the invocation (no upstream call made) |
//! | `Validation` | `client` | the invocation |
//! | `Upstream` | `upstream` | a simple action, or only one aggregation branch |
//! | `Discovery` | `discovery` | the whole aggregation call |
//! | `Internal` | `internal` | the invocation (schema drift, a defect) |
//! | `NotFound` | `not_found` | the invocation |
//! | `Fault` | `fault` | the invocation (caught panic) |
//! | `Cancelled` / `DeadlineExceeded` | `cancelled` / `timeout` | the invocation or one branch |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::CredentialField;
use crate::contract::ContractViolation;

/// Error produced while resolving, validating or running an action
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    /// A credential the action declares is absent from the auth context.
    /// Displays as the field's fixed sentinel (e.g. `MISSING_AUTH_TOKEN`).
    #[error("{}", .0.sentinel())]
    MissingCredential(CredentialField),

    #[error("{0}")]
    Validation(ContractViolation),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Action not found: {0}")]
    NotFound(String),

    #[error("Action faulted: {0}")]
    Fault(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

/// Coarse classification of an [`ActionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Credential,
    Client,
    Upstream,
    Discovery,
    Internal,
    NotFound,
    Fault,
    Cancelled,
    Timeout,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Credential => "credential",
            ErrorClass::Client => "client",
            ErrorClass::Upstream => "upstream",
            ErrorClass::Discovery => "discovery",
            ErrorClass::Internal => "internal",
            ErrorClass::NotFound => "not_found",
            ErrorClass::Fault => "fault",
            ErrorClass::Cancelled => "cancelled",
            ErrorClass::Timeout => "timeout",
        }
    }

    /// Whether the caller (rather than an implementation or upstream) must
    /// change something for the call to succeed.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            ErrorClass::Credential | ErrorClass::Client | ErrorClass::NotFound
        )
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ActionError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ActionError::MissingCredential(_) => ErrorClass::Credential,
            ActionError::Validation(_) => ErrorClass::Client,
            ActionError::Upstream(_) => ErrorClass::Upstream,
            ActionError::Discovery(_) => ErrorClass::Discovery,
            ActionError::Internal(_) => ErrorClass::Internal,
            ActionError::NotFound(_) => ErrorClass::NotFound,
            ActionError::Fault(_) => ErrorClass::Fault,
            ActionError::Cancelled => ErrorClass::Cancelled,
            ActionError::DeadlineExceeded(_) => ErrorClass::Timeout,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ActionError::Cancelled)
    }
}

impl From<ContractViolation> for ActionError {
    fn from(violation: ContractViolation) -> Self {
        ActionError::Validation(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ViolationKind;

    #[test]
    fn test_missing_credential_displays_sentinel() {
        let err = ActionError::MissingCredential(CredentialField::AuthToken);
        assert_eq!(err.to_string(), "MISSING_AUTH_TOKEN");
        assert_eq!(err.class(), ErrorClass::Credential);
    }

    #[test]
    fn test_validation_displays_field_and_violation() {
        let err: ActionError = ContractViolation::new("query", ViolationKind::MissingRequired).into();
        assert_eq!(err.to_string(), "query: missing required field");
        assert!(err.class().is_caller_fault());
    }

    #[test]
    fn test_internal_is_not_caller_fault() {
        let err = ActionError::internal("output drifted");
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(!err.class().is_caller_fault());
    }
}
