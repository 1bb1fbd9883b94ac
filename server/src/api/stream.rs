//! SSE framing for streaming responses.
//!
//! Frame choreography: one role frame, the content chunks, one closing
//! frame with `finish_reason: "stop"`, then exactly one `[DONE]`
//! sentinel. A pipeline failure becomes an OpenAI-shaped error frame,
//! still followed by `[DONE]` so clients terminate cleanly.

use crate::api::error::ApiError;
use crate::api::types::ChatCompletionStreamResponse;
use crate::state::AppState;
use axum::response::sse::{Event, KeepAlive, Sse};
use ensemble_application::{AnswerEvent, RunEnsembleInput};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Build the SSE response for one streaming request.
pub fn sse_response(
    state: AppState,
    model: String,
    request_id: String,
    input: RunEnsembleInput,
    token: CancellationToken,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.orchestrator.execute_stream(input, token);

    let stream = async_stream::stream! {
        yield frame(&ChatCompletionStreamResponse::role(&request_id, &model));

        while let Some(event) = rx.recv().await {
            match event {
                AnswerEvent::Chunk(chunk) => {
                    yield frame(&ChatCompletionStreamResponse::content(
                        &request_id,
                        &model,
                        &chunk,
                    ));
                }
                AnswerEvent::Completed(answer) => {
                    info!(
                        "Request {} streamed {} bytes ({} threads)",
                        request_id,
                        answer.content.len(),
                        answer.meta.threads_completed
                    );
                    yield frame(&ChatCompletionStreamResponse::stop(&request_id, &model));
                    break;
                }
                AnswerEvent::Failed(error) => {
                    warn!("Request {} failed mid-stream: {}", request_id, error);
                    let api_error: ApiError = error.into();
                    yield frame(&serde_json::json!({
                        "error": {
                            "message": api_error.message,
                            "type": api_error.kind,
                            "code": api_error.kind,
                        }
                    }));
                    break;
                }
            }
        }

        yield Ok(Event::default().data("[DONE]"));
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn frame<T: serde::Serialize>(payload: &T) -> Result<Event, Infallible> {
    let data = serde_json::to_string(payload).unwrap_or_default();
    Ok(Event::default().data(data))
}
