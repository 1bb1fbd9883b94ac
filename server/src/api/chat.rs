//! POST /v1/chat/completions

use crate::api::error::ApiError;
use crate::api::stream;
use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse, Usage};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// OpenAI-compatible chat completions endpoint with streaming support.
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let request_id = new_request_id();
    let input = request.to_input()?;

    let model_name = request
        .model
        .clone()
        .unwrap_or_else(|| state.model_name.clone());

    info!(
        "Request {} started ({} messages, stream={})",
        request_id,
        request.messages.len(),
        request.stream
    );

    let token = CancellationToken::new();

    if request.stream {
        return Ok(
            stream::sse_response(state, model_name, request_id, input, token).into_response(),
        );
    }

    // If the client disconnects, this handler future is dropped and the
    // guard cancels everything still in flight.
    let _guard = token.clone().drop_guard();

    let answer = state.orchestrator.execute(input, &token).await?;
    let usage = Usage::approximate(request.prompt_chars(), answer.content.len());

    info!(
        "Request {} complete in {:.1}s ({} bytes, {}/{} threads)",
        request_id,
        started.elapsed().as_secs_f64(),
        answer.content.len(),
        answer.meta.threads_completed,
        answer.meta.threads_completed + answer.meta.threads_failed
    );

    Ok(Json(ChatCompletionResponse::new(
        request_id,
        model_name,
        answer.content,
        usage,
        answer.meta,
    ))
    .into_response())
}

/// `chatcmpl-` plus 12 hex characters.
fn new_request_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("chatcmpl-{}", &hex[..12])
}
