//! Gateway parameters: invocation boundary control.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls how [`InvokeActionUseCase`](crate::use_cases::invoke_action::InvokeActionUseCase)
/// treats a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayParams {
    /// Check produced data against the output contract (schema drift detection)
    pub validate_output: bool,
    /// Upper bound for one invocation, including any aggregation it runs
    pub invocation_timeout: Option<Duration>,
}

impl Default for GatewayParams {
    fn default() -> Self {
        Self {
            validate_output: true,
            invocation_timeout: None,
        }
    }
}

impl GatewayParams {
    pub fn with_validate_output(mut self, enabled: bool) -> Self {
        self.validate_output = enabled;
        self
    }

    pub fn with_invocation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invocation_timeout = timeout;
        self
    }
}
