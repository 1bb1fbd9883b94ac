//! A single reasoning step.

use crate::validation::{ValidationVerdict, VerdictOutcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One unit of model-produced reasoning text within a thread.
///
/// Immutable once emitted, with one exception: the validation verdict may
/// be attached later (validation runs concurrently with the next step).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// 0-based index, contiguous within the owning thread.
    pub index: usize,
    /// The step text, verbatim from the main model.
    pub body: String,
    /// Whether this step carried the termination signal.
    pub done: bool,
    /// Tallied validation outcome for this step.
    pub verdict: VerdictOutcome,
    /// Full validation record, once the verdict resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationVerdict>,
    /// Wall-clock time the main-model call took.
    pub elapsed: Duration,
}

impl Step {
    pub fn new(index: usize, body: impl Into<String>, done: bool, elapsed: Duration) -> Self {
        Self {
            index,
            body: body.into(),
            done,
            verdict: VerdictOutcome::Pending,
            validation: None,
            elapsed,
        }
    }

    /// Attach a resolved verdict. This is the only permitted mutation of
    /// an emitted step.
    pub fn resolve_verdict(&mut self, verdict: ValidationVerdict) {
        self.verdict = verdict.outcome;
        self.validation = Some(verdict);
    }

    /// Mark the step as never having entered validation.
    pub fn skip_verdict(&mut self) {
        self.verdict = VerdictOutcome::Skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::BallotChoice;

    #[test]
    fn test_new_step_is_pending() {
        let step = Step::new(0, "thinking...", false, Duration::from_millis(10));
        assert_eq!(step.verdict, VerdictOutcome::Pending);
        assert!(step.validation.is_none());
        assert!(!step.done);
    }

    #[test]
    fn test_resolve_verdict_sets_outcome() {
        let mut step = Step::new(1, "claim", false, Duration::ZERO);
        let verdict = ValidationVerdict::from_ballots(
            vec!["a counterexample".to_string()],
            vec![BallotChoice::Counter, BallotChoice::Counter, BallotChoice::Main],
        );
        step.resolve_verdict(verdict);
        assert_eq!(step.verdict, VerdictOutcome::Flagged);
        assert_eq!(step.validation.as_ref().unwrap().counter_votes(), 2);
    }

    #[test]
    fn test_skip_verdict() {
        let mut step = Step::new(0, "x", true, Duration::ZERO);
        step.skip_verdict();
        assert_eq!(step.verdict, VerdictOutcome::Skipped);
    }
}
