//! Thinking-thread state machine.
//!
//! A [`ThreadState`] is exclusively owned by its thinking thread while
//! running; the orchestrator only sees it once frozen. State transitions
//! are `running -> completed` or `running -> failed`, exactly once.

use super::step::Step;
use crate::core::error::DomainError;
use crate::validation::{ValidationVerdict, VerdictOutcome};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a thinking thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadStatus::Running => write!(f, "running"),
            ThreadStatus::Completed => write!(f, "completed"),
            ThreadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The ordered step history and status of one reasoning thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadState {
    /// Thread id, `0..N-1` within a request.
    pub id: usize,
    /// Emitted steps, indices contiguous from 0.
    pub steps: Vec<Step>,
    /// Current lifecycle status.
    pub status: ThreadStatus,
    /// Failure reason, set iff `status == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ThreadState {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            steps: Vec::new(),
            status: ThreadStatus::Running,
            failure: None,
        }
    }

    /// Append a step. Indices must be contiguous, nothing may follow a
    /// `done` step, and terminal threads accept no more steps.
    pub fn push_step(&mut self, step: Step) -> Result<(), DomainError> {
        if self.status != ThreadStatus::Running {
            return Err(DomainError::ThreadAlreadyTerminal(self.id));
        }
        if step.index != self.steps.len() {
            return Err(DomainError::StepIndexOutOfOrder {
                expected: self.steps.len(),
                got: step.index,
            });
        }
        if self.steps.last().is_some_and(|s| s.done) {
            return Err(DomainError::StepIndexOutOfOrder {
                expected: self.steps.len() - 1,
                got: step.index,
            });
        }
        self.steps.push(step);
        Ok(())
    }

    /// Attach a resolved verdict to the step at `index`.
    ///
    /// Verdicts may land after later steps were produced; that is the
    /// normal case, since validation runs concurrently with stepping.
    pub fn resolve_verdict(&mut self, index: usize, verdict: ValidationVerdict) {
        if let Some(step) = self.steps.get_mut(index) {
            step.resolve_verdict(verdict);
        }
    }

    /// Transition `running -> completed`.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status != ThreadStatus::Running {
            return Err(DomainError::ThreadAlreadyTerminal(self.id));
        }
        self.status = ThreadStatus::Completed;
        Ok(())
    }

    /// Transition `running -> failed` with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        if self.status != ThreadStatus::Running {
            return Err(DomainError::ThreadAlreadyTerminal(self.id));
        }
        self.status = ThreadStatus::Failed;
        self.failure = Some(reason.into());
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == ThreadStatus::Completed
    }

    /// Body of the last step — the thread's final answer, once completed.
    pub fn final_body(&self) -> Option<&str> {
        self.steps.last().map(|s| s.body.as_str())
    }

    /// Number of steps whose verdict resolved to flagged.
    pub fn flagged_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.verdict == VerdictOutcome::Flagged)
            .count()
    }

    /// Number of steps whose verdict has not resolved yet.
    pub fn pending_verdicts(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.verdict == VerdictOutcome::Pending)
            .count()
    }
}
