//! OpenAI-compatible API shapes.
//!
//! The request mirrors the chat-completions body plus the gateway's
//! extension fields (`x_threads`, `x_validate`, `x_fusion`,
//! `x_max_steps`). Unknown fields are tolerated — OpenAI clients send
//! plenty of knobs this gateway does not act on.

use crate::api::error::ApiError;
use ensemble_application::{RequestOverrides, RunEnsembleInput};
use ensemble_domain::{ChatMessage, FusionStrategy, UsageMeta};
use serde::{Deserialize, Serialize};

/// Bounds for the extension fields.
const MAX_THREADS: u32 = 8;
const MAX_STEPS: u32 = 50;

/// A chat message on the API surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiChatMessage {
    pub role: String,
    pub content: String,
}

impl ApiChatMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request for chat completion (OpenAI compatible)
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ApiChatMessage>,
    #[serde(default)]
    pub stream: bool,
    // Extension fields honored by the pipeline. Standard OpenAI fields
    // this gateway does not act on (temperature, top_p, ...) are simply
    // ignored at deserialization.
    #[serde(default)]
    pub x_threads: Option<u32>,
    #[serde(default)]
    pub x_validate: Option<bool>,
    #[serde(default)]
    pub x_fusion: Option<String>,
    #[serde(default)]
    pub x_max_steps: Option<u32>,
}

impl ChatCompletionRequest {
    /// Validate the body and convert it into pipeline input.
    pub fn to_input(&self) -> Result<RunEnsembleInput, ApiError> {
        if self.messages.is_empty() {
            return Err(ApiError::bad_request("messages must not be empty"));
        }

        let mut messages = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            let converted = match message.role.as_str() {
                "system" => ChatMessage::system(&message.content),
                "user" => ChatMessage::user(&message.content),
                "assistant" => ChatMessage::assistant(&message.content),
                other => {
                    return Err(ApiError::bad_request(format!(
                        "unsupported message role '{}'",
                        other
                    )));
                }
            };
            messages.push(converted);
        }

        let mut overrides = RequestOverrides::default();

        if let Some(threads) = self.x_threads {
            if !(1..=MAX_THREADS).contains(&threads) {
                return Err(ApiError::bad_request(format!(
                    "x_threads must be between 1 and {}",
                    MAX_THREADS
                )));
            }
            overrides = overrides.with_threads(threads as usize);
        }

        if let Some(max_steps) = self.x_max_steps {
            if !(1..=MAX_STEPS).contains(&max_steps) {
                return Err(ApiError::bad_request(format!(
                    "x_max_steps must be between 1 and {}",
                    MAX_STEPS
                )));
            }
            overrides = overrides.with_max_steps(max_steps as usize);
        }

        if let Some(validate) = self.x_validate {
            overrides = overrides.with_validate(validate);
        }

        if let Some(fusion) = &self.x_fusion {
            let strategy: FusionStrategy = fusion
                .parse()
                .map_err(|_| ApiError::bad_request("x_fusion must be 'intelligent' or 'concat'"))?;
            overrides = overrides.with_fusion(strategy);
        }

        Ok(RunEnsembleInput::new(messages).with_overrides(overrides))
    }

    /// Character count of the inbound conversation, for the usage
    /// heuristic.
    pub fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.len()).sum()
    }
}

/// Token usage information (chars/4 heuristic)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl Usage {
    pub fn approximate(prompt_chars: usize, completion_chars: usize) -> Self {
        let prompt_tokens = prompt_chars / 4;
        let completion_tokens = completion_chars / 4;
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A chat completion choice
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionChoice {
    pub index: usize,
    pub message: ApiChatMessage,
    pub finish_reason: &'static str,
}

/// Response for chat completion (OpenAI compatible)
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Usage,
    /// Gateway extension: ensemble statistics.
    pub usage_meta: UsageMeta,
}

impl ChatCompletionResponse {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        content: impl Into<String>,
        usage: Usage,
        usage_meta: UsageMeta,
    ) -> Self {
        Self {
            id: id.into(),
            object: "chat.completion",
            created: chrono::Utc::now().timestamp(),
            model: model.into(),
            choices: vec![ChatCompletionChoice {
                index: 0,
                message: ApiChatMessage::assistant(content),
                finish_reason: "stop",
            }],
            usage,
            usage_meta,
        }
    }
}

/// A streaming chat completion choice
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionStreamChoice {
    pub index: usize,
    pub delta: serde_json::Value,
    pub finish_reason: Option<&'static str>,
}

/// One frame of a streaming chat completion
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionStreamResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatCompletionStreamChoice>,
}

impl ChatCompletionStreamResponse {
    fn frame(id: &str, model: &str, delta: serde_json::Value, finish: Option<&'static str>) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk",
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChatCompletionStreamChoice {
                index: 0,
                delta,
                finish_reason: finish,
            }],
        }
    }

    /// Opening frame announcing the assistant role.
    pub fn role(id: &str, model: &str) -> Self {
        Self::frame(id, model, serde_json::json!({"role": "assistant"}), None)
    }

    /// Content frame carrying one chunk.
    pub fn content(id: &str, model: &str, chunk: &str) -> Self {
        Self::frame(id, model, serde_json::json!({"content": chunk}), None)
    }

    /// Closing frame with the finish reason.
    pub fn stop(id: &str, model: &str) -> Self {
        Self::frame(id, model, serde_json::json!({}), Some("stop"))
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub version: &'static str,
    pub timestamp: i64,
}

impl HealthResponse {
    pub fn healthy(model: impl Into<String>) -> Self {
        Self {
            status: "healthy",
            model: model.into(),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
