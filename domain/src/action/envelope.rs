//! Uniform result envelope returned by every invocation.
//!
//! Serialized shape: `{ "success": bool, "data"?: T, "error"?: string }`.
//! Fields are private so the only way to build an envelope is through
//! [`ResultEnvelope::ok`] and [`ResultEnvelope::failure`]; deserialization rejects combinations that
//! break `success == error.is_none()`.

use serde::{Deserialize, Serialize};

use super::error::ActionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResultEnvelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> TryFrom<RawEnvelope<T>> for ResultEnvelope<T> {
    type Error = String;

    fn try_from(raw: RawEnvelope<T>) -> Result<Self, Self::Error> {
        match (raw.success, raw.data, raw.error) {
            (true, data, None) => Ok(Self {
                success: true,
                data,
                error: None,
            }),
            (false, None, Some(error)) => Ok(Self::failure(error)),
            (true, _, Some(_)) => Err("successful envelope must not carry an error".to_string()),
            (false, _, None) => Err("failed envelope must carry an error".to_string()),
            (false, Some(_), Some(_)) => Err("failed envelope must not carry data".to_string()),
        }
    }
}

impl<T> ResultEnvelope<T> {
    /// Successful envelope carrying data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

}

impl<T> From<Result<T, ActionError>> for ResultEnvelope<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialField;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_serialization() {
        let envelope = ResultEnvelope::ok(json!({"id": "42"}));
        assert!(envelope.is_success());
        assert!(envelope.error().is_none());

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"id": "42"}}));
    }

    #[test]
    fn test_failure_envelope_serialization() {
        let envelope: ResultEnvelope<serde_json::Value> =
            Err(ActionError::MissingCredential(CredentialField::AuthToken)).into();
        assert!(!envelope.is_success());
        assert_eq!(envelope.error(), Some("MISSING_AUTH_TOKEN"));
        assert!(envelope.data().is_none());

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"success": false, "error": "MISSING_AUTH_TOKEN"}));
    }

    #[test]
    fn test_deserialize_generic_payload_without_data() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct File {
            id: String,
        }

        let ok: ResultEnvelope<File> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(ok.is_success());
        assert!(ok.data().is_none());

        let with_data: ResultEnvelope<File> =
            serde_json::from_value(json!({"success": true, "data": {"id": "f1"}})).unwrap();
        assert_eq!(with_data.data(), Some(&File { id: "f1".to_string() }));
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_envelopes() {
        let bad = [
            json!({"success": true, "error": "boom"}),
            json!({"success": false}),
            json!({"success": false, "data": 1, "error": "boom"}),
        ];
        for value in bad {
            assert!(
                serde_json::from_value::<ResultEnvelope<serde_json::Value>>(value.clone()).is_err(),
                "accepted {value}"
            );
        }

        let good: ResultEnvelope<serde_json::Value> =
            serde_json::from_value(json!({"success": false, "error": "boom"})).unwrap();
        assert_eq!(good.error(), Some("boom"));
    }
}
