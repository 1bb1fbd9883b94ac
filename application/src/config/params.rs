//! Pipeline control parameters.
//!
//! These records group the static knobs that control the step loop, the
//! validation sub-pipeline, fusion, context compression, and per-request
//! limits. They are application-layer concerns; the raw file shapes live
//! in the infrastructure crate.

use ensemble_domain::{FusionStrategy, VoteKeywords};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thinking-thread loop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingParams {
    /// Number of parallel reasoning threads.
    pub threads: usize,
    /// Step cap per thread.
    pub max_steps: usize,
    /// Sentinel substring that marks a final step.
    pub termination_marker: String,
    /// Temperature for thread 0.
    pub base_temperature: f32,
    /// Added per thread id, so threads sample differently.
    pub temperature_spread: f32,
}

impl Default for ThinkingParams {
    fn default() -> Self {
        Self {
            threads: 3,
            max_steps: 15,
            termination_marker: "<END>".to_string(),
            base_temperature: 0.7,
            temperature_spread: 0.0,
        }
    }
}

impl ThinkingParams {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_termination_marker(mut self, marker: impl Into<String>) -> Self {
        self.termination_marker = marker.into();
        self
    }

    pub fn with_temperature_spread(mut self, spread: f32) -> Self {
        self.temperature_spread = spread;
        self
    }

    /// Sampling temperature for a given thread id.
    pub fn temperature_for(&self, thread_id: usize) -> f32 {
        self.base_temperature + self.temperature_spread * thread_id as f32
    }
}

/// Validation sub-pipeline parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationParams {
    pub enabled: bool,
    /// Parallel counterexample generations per step (K).
    pub counterexamples: usize,
    /// Parallel votes per step (V).
    pub votes: usize,
    /// Keyword set the vote parser matches against.
    pub keywords: VoteKeywords,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            enabled: true,
            counterexamples: 3,
            votes: 3,
            keywords: VoteKeywords::default(),
        }
    }
}

impl ValidationParams {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_counterexamples(mut self, k: usize) -> Self {
        self.counterexamples = k;
        self
    }

    pub fn with_votes(mut self, v: usize) -> Self {
        self.votes = v;
        self
    }
}

/// Fusion parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionParams {
    pub strategy: FusionStrategy,
    /// Delimiter between thread answers under the concat strategy.
    pub concat_delimiter: String,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            strategy: FusionStrategy::Intelligent,
            concat_delimiter: "\n\n---\n\n".to_string(),
        }
    }
}

impl FusionParams {
    pub fn with_strategy(mut self, strategy: FusionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_concat_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.concat_delimiter = delimiter.into();
        self
    }
}

/// Context compression parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextParams {
    /// When false, the middle range is passed through verbatim (merged,
    /// but not model-summarized).
    pub summary_enabled: bool,
}

impl Default for ContextParams {
    fn default() -> Self {
        Self {
            summary_enabled: true,
        }
    }
}

/// Per-request limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsParams {
    /// Wall-clock deadline for the whole request.
    pub request_deadline: Option<Duration>,
    /// Chunk budget (bytes, snapped to UTF-8 boundaries) for streaming.
    pub stream_chunk_bytes: usize,
}

impl Default for LimitsParams {
    fn default() -> Self {
        Self {
            request_deadline: Some(Duration::from_secs(600)),
            stream_chunk_bytes: 50,
        }
    }
}

impl LimitsParams {
    pub fn with_request_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.request_deadline = deadline;
        self
    }

    pub fn with_stream_chunk_bytes(mut self, bytes: usize) -> Self {
        self.stream_chunk_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thinking_defaults() {
        let p = ThinkingParams::default();
        assert_eq!(p.threads, 3);
        assert_eq!(p.max_steps, 15);
        assert_eq!(p.termination_marker, "<END>");
    }

    #[test]
    fn test_temperature_for_spreads_by_id() {
        let p = ThinkingParams::default().with_temperature_spread(0.1);
        assert!((p.temperature_for(0) - 0.7).abs() < 1e-6);
        assert!((p.temperature_for(2) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_validation_defaults() {
        let p = ValidationParams::default();
        assert!(p.enabled);
        assert_eq!(p.counterexamples, 3);
        assert_eq!(p.votes, 3);
    }

    #[test]
    fn test_limits_defaults() {
        let p = LimitsParams::default();
        assert_eq!(p.request_deadline, Some(Duration::from_secs(600)));
        assert_eq!(p.stream_chunk_bytes, 50);
    }
}
