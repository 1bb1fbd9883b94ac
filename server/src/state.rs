//! Shared server state.

use ensemble_application::RunEnsembleUseCase;
use std::sync::Arc;

/// State shared by every handler: the orchestrator (owning the one
/// process-wide model client) and the published model id.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RunEnsembleUseCase>,
    pub model_name: String,
}

impl AppState {
    pub fn new(orchestrator: Arc<RunEnsembleUseCase>, model_name: impl Into<String>) -> Self {
        Self {
            orchestrator,
            model_name: model_name.into(),
        }
    }
}
