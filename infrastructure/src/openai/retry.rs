//! Retry policy for upstream calls.
//!
//! An explicit policy value: attempt count, backoff schedule, and a
//! predicate over failure kinds. Applied around every upstream call
//! inside the client adapter, nowhere else.

use std::time::Duration;

/// Why a single upstream attempt failed.
#[derive(Debug, Clone)]
pub enum CallFailure {
    /// The per-call timeout elapsed.
    Timeout,
    /// Connection-level failure (DNS, TLS, reset, ...).
    Transport(String),
    /// Upstream answered with a non-success status.
    Status { code: u16, body: String },
    /// Upstream answered 200 but the body was not usable.
    Malformed(String),
}

impl std::fmt::Display for CallFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallFailure::Timeout => write!(f, "timeout"),
            CallFailure::Transport(e) => write!(f, "transport error: {}", e),
            CallFailure::Status { code, body } => write!(f, "HTTP {}: {}", code, body),
            CallFailure::Malformed(e) => write!(f, "malformed response: {}", e),
        }
    }
}

/// Retry policy value: max attempts and the delay before each re-attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub schedule: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            schedule: vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ],
        }
    }
}

impl RetryPolicy {
    /// Delay before re-attempt number `attempt` (1-based: the delay
    /// after the first failure is `delay_before(1)`). The schedule's
    /// last entry repeats if attempts outnumber it.
    pub fn delay_before(&self, attempt: usize) -> Duration {
        self.schedule
            .get(attempt.saturating_sub(1))
            .or(self.schedule.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether a failure kind is worth re-attempting.
    ///
    /// Timeouts, transport failures, throttling, and server errors are
    /// transient; client errors and malformed bodies are not.
    pub fn is_retryable(&self, failure: &CallFailure) -> bool {
        match failure {
            CallFailure::Timeout | CallFailure::Transport(_) => true,
            CallFailure::Status { code, .. } => *code == 429 || *code >= 500,
            CallFailure::Malformed(_) => false,
        }
    }
}
