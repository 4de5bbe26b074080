//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod action_catalog;
pub mod action_handler;
pub mod invocation_logger;
pub mod page_source;
pub mod upstream;
