//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`GatewayParams`]: output validation and the per-invocation timeout
//! - [`AggregationParams`]: shard, page, concurrency and deadline bounds

pub mod aggregation_params;
pub mod gateway_params;

pub use aggregation_params::AggregationParams;
pub use gateway_params::GatewayParams;
