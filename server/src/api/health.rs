//! GET /health

use crate::api::types::HealthResponse;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;

/// Liveness endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.model_name.clone()))
}
