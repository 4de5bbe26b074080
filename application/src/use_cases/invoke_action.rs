//! Invoke Action use case
//!
//! The validation gateway. Every invocation goes through the same steps and
//! always ends in a [`ResultEnvelope`]:
//!
//! 1. Resolve `(provider, action)` in the catalog
//! 2. Check declared credentials (no handler call, hence no upstream call, when one is missing)
//! 3. Validate params against the input contract
//! 4. Invoke the handler, catching panics and bounding it by timeout and cancellation
//! 5. Validate the produced data against the output contract

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde_json::Value;
use switchboard_domain::{
    ActionError, ActionId, AuthContext, ContractValidator, DefaultContractValidator, ErrorClass,
    ResultEnvelope,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::shared::panic_message;
use crate::config::{AggregationParams, GatewayParams};
use crate::ports::action_catalog::{ActionCatalog, ActionDescriptor};
use crate::ports::action_handler::InvocationContext;
use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger};

/// Input for the InvokeAction use case
#[derive(Debug, Clone)]
pub struct InvokeActionInput {
    pub provider: String,
    pub action: String,
    pub params: Value,
    pub auth: AuthContext,
}

impl InvokeActionInput {
    pub fn new(provider: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            action: action.into(),
            params: Value::Object(Default::default()),
            auth: AuthContext::default(),
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    fn action_label(&self) -> String {
        format!("{}.{}", self.provider, self.action)
    }
}

/// Use case for invoking one registered action
pub struct InvokeActionUseCase<C: ActionCatalog + 'static> {
    catalog: Arc<C>,
    validator: Arc<dyn ContractValidator>,
    gateway: GatewayParams,
    aggregation: AggregationParams,
    logger: Arc<dyn InvocationLogger>,
    cancellation_token: CancellationToken,
}

impl<C: ActionCatalog + 'static> InvokeActionUseCase<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            validator: Arc::new(DefaultContractValidator),
            gateway: GatewayParams::default(),
            aggregation: AggregationParams::default(),
            logger: Arc::new(NoInvocationLogger),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn ContractValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_gateway_params(mut self, params: GatewayParams) -> Self {
        self.gateway = params;
        self
    }

    pub fn with_aggregation_params(mut self, params: AggregationParams) -> Self {
        self.aggregation = params;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Execute the use case. Never panics and never returns a raw error.
    pub async fn execute(&self, input: InvokeActionInput) -> ResultEnvelope<Value> {
        let started = Instant::now();
        let label = input.action_label();

        let result = self.run(&input).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!("Action {} succeeded in {}ms", label, duration_ms),
            Err(e) => match e.class() {
                ErrorClass::Internal | ErrorClass::Fault => {
                    error!("Action {} failed ({}): {}", label, e.class().as_str(), e)
                }
                class if class.is_caller_fault() => {
                    debug!("Action {} rejected ({}): {}", label, class.as_str(), e)
                }
                class => warn!("Action {} failed ({}): {}", label, class.as_str(), e),
            },
        }

        self.logger.log(InvocationEvent::new(
            "action_invoked",
            serde_json::json!({
                "action": label,
                "success": result.is_ok(),
                "error_class": result.as_ref().err().map(|e| e.class().as_str()),
                "duration_ms": duration_ms,
            }),
        ));

        ResultEnvelope::from(result)
    }

    async fn run(&self, input: &InvokeActionInput) -> Result<Value, ActionError> {
        let id = ActionId::parse(&input.provider, &input.action)
            .map_err(|_| ActionError::NotFound(input.action_label()))?;

        let Some(descriptor) = self.catalog.lookup(&id) else {
            debug!("No action registered for {}", id);
            return Err(ActionError::NotFound(id.to_string()));
        };
        let definition = descriptor.definition();

        definition.credentials.check(&input.auth)?;
        self.validator.validate(&definition.input, &input.params)?;

        let ctx = InvocationContext::new(input.auth.clone(), self.cancellation_token.child_token())
            .with_aggregation(self.aggregation.clone());

        let data = self.invoke_guarded(descriptor, &ctx, &input.params).await;
        // Stop anything the handler left running
        ctx.cancellation().cancel();
        let data = data?;

        if self.gateway.validate_output
            && let Err(violation) = self.validator.validate(&definition.output, &data)
        {
            error!("Output of {} violates its contract: {}", id, violation);
            return Err(ActionError::internal(format!(
                "output contract violated: {}",
                violation
            )));
        }

        Ok(data)
    }

    async fn invoke_guarded(
        &self,
        descriptor: &ActionDescriptor,
        ctx: &InvocationContext,
        params: &Value,
    ) -> Result<Value, ActionError> {
        let guarded = async {
            match AssertUnwindSafe(descriptor.handler().invoke(ctx, params))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => Err(ActionError::Fault(panic_message(payload))),
            }
        };

        let timed = async {
            match self.gateway.invocation_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, guarded).await {
                    Ok(result) => result,
                    Err(_) => Err(ActionError::DeadlineExceeded(format!(
                        "invocation timed out after {}s",
                        timeout.as_secs()
                    ))),
                },
                None => guarded.await,
            }
        };

        tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => Err(ActionError::Cancelled),
            result = timed => result,
        }
    }
}
