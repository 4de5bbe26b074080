//! Application layer for switchboard
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AggregationParams, GatewayParams};
pub use ports::{
    action_catalog::{ActionCatalog, ActionDescriptor},
    action_handler::{ActionHandler, InvocationContext},
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    page_source::PageSource,
    upstream::{UpstreamClient, UpstreamError, UpstreamRequest, parse_page},
};
pub use use_cases::aggregate::{AggregateOptions, AggregationEngine, ItemFilter, ShardedReport};
pub use use_cases::invoke_action::{InvokeActionInput, InvokeActionUseCase};
