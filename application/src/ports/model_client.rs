//! Model client port.
//!
//! Defines the capability the pipeline consumes to invoke upstream
//! models. Implementations (adapters) live in the infrastructure layer
//! and own retries, timeouts, and the in-flight limiter; callers treat
//! `invoke` as the single suspension point of the whole pipeline.

use async_trait::async_trait;
use ensemble_domain::ChatMessage;
use thiserror::Error;

/// Errors surfaced by a model client after its internal retry policy is
/// exhausted.
#[derive(Error, Debug, Clone)]
pub enum ModelClientError {
    #[error("Upstream unavailable after retries: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream call timed out")]
    Timeout,

    #[error("Upstream rejected the call with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
}

/// Per-call options forwarded to the upstream model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InvokeOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl InvokeOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Capability to invoke a named upstream model with a message list.
///
/// Model names are opaque strings the adapter resolves against its own
/// configuration. The returned text is the complete assistant message.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: InvokeOptions,
    ) -> Result<String, ModelClientError>;
}
