//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while parsing caller-supplied identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid action key: {0}")]
    InvalidActionKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DomainError::UnknownProvider("mail".to_string()).to_string(),
            "Unknown provider: mail"
        );
        assert_eq!(
            DomainError::InvalidActionKey("Bad Key".to_string()).to_string(),
            "Invalid action key: Bad Key"
        );
    }
}
