//! Action handler port
//!
//! An [`ActionHandler`] is the executable half of an action. It receives
//! parameters that already satisfy the input contract and an
//! [`InvocationContext`] carrying credentials, cancellation and the
//! aggregation bounds for this call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchboard_domain::{ActionError, AuthContext};
use tokio_util::sync::CancellationToken;

use crate::config::AggregationParams;
use crate::use_cases::aggregate::AggregationEngine;

/// Per-invocation context handed to an action handler.
///
/// Cloning is cheap; the credentials are shared read-only.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    auth: Arc<AuthContext>,
    cancellation: CancellationToken,
    aggregation: AggregationParams,
}

impl InvocationContext {
    pub fn new(auth: AuthContext, cancellation: CancellationToken) -> Self {
        Self {
            auth: Arc::new(auth),
            cancellation,
            aggregation: AggregationParams::default(),
        }
    }

    pub fn with_aggregation(mut self, params: AggregationParams) -> Self {
        self.aggregation = params;
        self
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn aggregation_params(&self) -> &AggregationParams {
        &self.aggregation
    }

    /// Engine bound to this invocation's cancellation token and aggregation bounds.
    pub fn aggregation_engine(&self) -> AggregationEngine {
        AggregationEngine::new(self.aggregation.clone())
            .with_cancellation(self.cancellation.clone())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Executable behavior behind an action definition.
///
/// Implementations must not mutate the context's credentials and must
/// treat params as already validated against the input contract.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn invoke(&self, ctx: &InvocationContext, params: &Value) -> Result<Value, ActionError>;
}
