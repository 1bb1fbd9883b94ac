//! Final answer value object.

use serde::{Deserialize, Serialize};

/// Per-request ensemble statistics, reported alongside the answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMeta {
    /// Threads that reached `completed`.
    pub threads_completed: usize,
    /// Threads that failed before producing a final step.
    pub threads_failed: usize,
    /// Steps across all completed threads whose verdict was flagged.
    pub flagged_steps: usize,
}

/// The fused answer for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// Answer text, emitted once per request.
    pub content: String,
    /// Ensemble statistics.
    pub meta: UsageMeta,
}

impl FinalAnswer {
    pub fn new(content: impl Into<String>, meta: UsageMeta) -> Self {
        Self {
            content: content.into(),
            meta,
        }
    }
}
