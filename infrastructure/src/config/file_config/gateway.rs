//! Gateway configuration from TOML (`[gateway]` section)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_application::GatewayParams;

use super::ConfigValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Check handler output against the output contract
    pub validate_output: bool,
    /// Upper bound on a single invocation (unset: unbounded)
    pub invocation_timeout_seconds: Option<u64>,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            validate_output: true,
            invocation_timeout_seconds: None,
        }
    }
}

impl FileGatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.invocation_timeout_seconds == Some(0) {
            return Err(ConfigValidationError::ZeroValue(
                "gateway.invocation_timeout_seconds",
            ));
        }
        Ok(())
    }

    pub fn to_params(&self) -> GatewayParams {
        GatewayParams::default()
            .with_validate_output(self.validate_output)
            .with_invocation_timeout(self.invocation_timeout_seconds.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_section() {
        let toml_str = r#"
[gateway]
validate_output = false
invocation_timeout_seconds = 20
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let params = config.gateway.to_params();
        assert!(!params.validate_output);
        assert_eq!(params.invocation_timeout, Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = FileGatewayConfig {
            invocation_timeout_seconds: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue("gateway.invocation_timeout_seconds"))
        ));
    }
}
