//! Shared utilities for use cases.
//!
//! Cancellation checking and the cancellable model-call helper used by
//! every stage of the pipeline.

use crate::ports::{InvokeOptions, ModelClient, ModelClientError};
use ensemble_domain::ChatMessage;
use tokio_util::sync::CancellationToken;

/// Why a model call did not return text.
#[derive(Debug)]
pub(crate) enum CallError {
    /// The request was cancelled while the call was in flight.
    Cancelled,
    /// The client gave up after its retry policy.
    Client(ModelClientError),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Cancelled => write!(f, "cancelled"),
            CallError::Client(e) => write!(f, "{}", e),
        }
    }
}

/// Invoke a model, racing the call against cancellation.
///
/// Dropping the in-flight future aborts the underlying request, so
/// cancellation propagates within one suspension point.
pub(crate) async fn invoke_cancellable(
    client: &dyn ModelClient,
    token: &CancellationToken,
    model: &str,
    messages: &[ChatMessage],
    options: InvokeOptions,
) -> Result<String, CallError> {
    if token.is_cancelled() {
        return Err(CallError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(CallError::Cancelled),
        result = client.invoke(model, messages, options) => {
            result.map_err(CallError::Client)
        }
    }
}
