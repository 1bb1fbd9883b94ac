//! Reqwest adapter for the model client port.
//!
//! One shared HTTP connection pool per process, constructed at startup
//! and injected here. All upstream calls flow through a shared semaphore
//! so the total number of in-flight calls stays bounded regardless of
//! how many requests are fanning out; permits are held for the duration
//! of the HTTP exchange and released during backoff sleeps.

use super::retry::{CallFailure, RetryPolicy};
use super::wire::{ChatRequest, ChatResponse, WireMessage};
use async_trait::async_trait;
use ensemble_application::ports::{InvokeOptions, ModelClient, ModelClientError};
use ensemble_domain::ChatMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Model client speaking the OpenAI chat-completions protocol.
pub struct OpenAiModelClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    call_timeout: Duration,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl OpenAiModelClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        call_timeout: Duration,
        max_in_flight: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            call_timeout,
            limiter: Arc::new(Semaphore::new(max_in_flight)),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One HTTP attempt, permit held for its duration.
    async fn call_once(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &InvokeOptions,
    ) -> Result<String, CallFailure> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| CallFailure::Transport("limiter closed".to_string()))?;

        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .timeout(self.call_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallFailure::Timeout
                } else {
                    CallFailure::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CallFailure::Timeout
            } else {
                CallFailure::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(CallFailure::Status {
                code: status.as_u16(),
                body: snippet,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| CallFailure::Malformed(e.to_string()))?;

        if let Some(usage) = parsed.usage {
            debug!(
                "Model {} used {} tokens ({} prompt / {} completion)",
                model, usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .content()
            .map(str::to_string)
            .ok_or_else(|| CallFailure::Malformed("response carried no content".to_string()))
    }

    fn into_client_error(failure: CallFailure) -> ModelClientError {
        match failure {
            CallFailure::Timeout => ModelClientError::Timeout,
            CallFailure::Transport(e) => ModelClientError::UpstreamUnavailable(e),
            CallFailure::Status { code, body } if code == 429 || code >= 500 => {
                ModelClientError::UpstreamUnavailable(format!("HTTP {}: {}", code, body))
            }
            CallFailure::Status { code, body } => ModelClientError::Rejected { status: code, body },
            CallFailure::Malformed(e) => ModelClientError::MalformedResponse(e),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: InvokeOptions,
    ) -> Result<String, ModelClientError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.call_once(model, messages, &options).await {
                Ok(text) => {
                    debug!(
                        "Model {} answered on attempt {} ({} bytes)",
                        model,
                        attempt,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(failure) => {
                    let retryable = self.retry.is_retryable(&failure);
                    if !retryable || attempt >= self.retry.max_attempts {
                        warn!(
                            "Model {} failed after {} attempt(s): {}",
                            model, attempt, failure
                        );
                        return Err(Self::into_client_error(failure));
                    }
                    let delay = self.retry.delay_before(attempt);
                    warn!(
                        "Model {} attempt {} failed ({}), retrying in {:?}",
                        model, attempt, failure, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_in_flight: usize) -> OpenAiModelClient {
        OpenAiModelClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:0/v1/chat/completions",
            "test-key",
            Duration::from_secs(1),
            max_in_flight,
        )
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            OpenAiModelClient::into_client_error(CallFailure::Timeout),
            ModelClientError::Timeout
        ));
        assert!(matches!(
            OpenAiModelClient::into_client_error(CallFailure::Status {
                code: 503,
                body: String::new()
            }),
            ModelClientError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            OpenAiModelClient::into_client_error(CallFailure::Status {
                code: 400,
                body: String::new()
            }),
            ModelClientError::Rejected { status: 400, .. }
        ));
        assert!(matches!(
            OpenAiModelClient::into_client_error(CallFailure::Malformed("x".to_string())),
            ModelClientError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_limiter_capacity_matches_config() {
        let c = client(7);
        assert_eq!(c.limiter.available_permits(), 7);
    }
}
