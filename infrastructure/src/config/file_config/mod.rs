//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Each section converts into the application-layer parameters it feeds.

mod aggregation;
mod gateway;
mod logging;
mod upstream;

pub use aggregation::FileAggregationConfig;
pub use gateway::FileGatewayConfig;
pub use logging::FileLoggingConfig;
pub use upstream::FileUpstreamConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("upstream.base_urls: unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("upstream.base_urls.{0} cannot be empty")]
    EmptyBaseUrl(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub gateway: FileGatewayConfig,
    pub aggregation: FileAggregationConfig,
    pub upstream: FileUpstreamConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate every section, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.gateway.validate()?;
        self.aggregation.validate()?;
        self.upstream.validate()?;
        Ok(())
    }
}
