//! Shared utilities for use cases.

use std::any::Any;

use switchboard_domain::ActionError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), ActionError> {
    if token.is_cancelled() {
        return Err(ActionError::Cancelled);
    }
    Ok(())
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "implementation panicked".to_string()
    }
}
