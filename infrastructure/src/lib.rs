//! Infrastructure layer for switchboard
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the action registry, the bundled provider bindings,
//! the HTTP upstream client, configuration file loading and the JSONL
//! invocation log.

pub mod actions;
pub mod config;
pub mod logging;
pub mod providers;
pub mod upstream;

// Re-export commonly used types
pub use actions::{ActionRegistry, RegistryError};
pub use config::{
    ConfigLoader, ConfigValidationError, FileAggregationConfig, FileConfig, FileGatewayConfig,
    FileLoggingConfig, FileUpstreamConfig,
};
pub use logging::JsonlInvocationLogger;
pub use upstream::{HttpUpstreamClient, SUBDOMAIN_PLACEHOLDER, UpstreamPageSource};
