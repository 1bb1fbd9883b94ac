//! API error type with OpenAI-shaped bodies.
//!
//! Every failure that reaches the client is rendered as
//! `{"error": {"message", "type", "code"}}` with a stable `type` string.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ensemble_application::RunEnsembleError;
use serde::Serialize;

/// An error ready to be rendered to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    code: &'a str,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "BadRequest",
            message: message.into(),
        }
    }
}

impl From<RunEnsembleError> for ApiError {
    fn from(error: RunEnsembleError) -> Self {
        let (status, kind) = match &error {
            RunEnsembleError::EmptyRequest => (StatusCode::BAD_REQUEST, "BadRequest"),
            RunEnsembleError::AllThreadsFailed => (StatusCode::BAD_GATEWAY, "AllThreadsFailed"),
            RunEnsembleError::DeadlineExceeded => {
                (StatusCode::GATEWAY_TIMEOUT, "DeadlineExceeded")
            }
            RunEnsembleError::Cancelled => {
                // Non-standard "client closed request"; nobody is usually
                // left to read it.
                (
                    StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_GATEWAY),
                    "Cancelled",
                )
            }
        };
        Self {
            status,
            kind,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                message: &self.message,
                kind: self.kind,
                code: self.kind,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
