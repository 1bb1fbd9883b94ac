//! Verdict tallying for step validation.
//!
//! A [`ValidationVerdict`] is the aggregated result of one validation pass
//! over one step: the counterexamples that were raised, the ballots cast,
//! and the tallied [`VerdictOutcome`].

use super::ballot::BallotChoice;
use serde::{Deserialize, Serialize};

/// Tallied outcome of a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictOutcome {
    /// Validation is still in flight (or was never dispatched).
    #[default]
    Pending,
    /// Main votes held: the step stands unchallenged.
    Accepted,
    /// Counter votes won: the step is marked suspect but kept.
    Flagged,
    /// Validation could not produce evidence either way.
    Skipped,
}

impl VerdictOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerdictOutcome::Pending)
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, VerdictOutcome::Flagged)
    }
}

impl std::fmt::Display for VerdictOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictOutcome::Pending => write!(f, "pending"),
            VerdictOutcome::Accepted => write!(f, "accepted"),
            VerdictOutcome::Flagged => write!(f, "flagged"),
            VerdictOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Aggregated result of validating a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// Counterexamples raised against the step (failed generator calls
    /// leave empty entries so the ballot count stays honest).
    pub counterexamples: Vec<String>,
    /// Ballots cast by the vote models.
    pub ballots: Vec<BallotChoice>,
    /// Tallied outcome.
    pub outcome: VerdictOutcome,
}

impl ValidationVerdict {
    /// Tally ballots into a verdict.
    ///
    /// Accepted iff `count(main) >= count(counter)`: abstentions do not
    /// count, and an exact tie favours the producing thread.
    pub fn from_ballots(counterexamples: Vec<String>, ballots: Vec<BallotChoice>) -> Self {
        let main = ballots
            .iter()
            .filter(|b| matches!(b, BallotChoice::Main))
            .count();
        let counter = ballots
            .iter()
            .filter(|b| matches!(b, BallotChoice::Counter))
            .count();

        let outcome = if main >= counter {
            VerdictOutcome::Accepted
        } else {
            VerdictOutcome::Flagged
        };

        Self {
            counterexamples,
            ballots,
            outcome,
        }
    }

    /// Verdict for a pass that produced no usable evidence (all
    /// counterexample calls failed, or all vote calls failed).
    pub fn skipped() -> Self {
        Self {
            counterexamples: Vec::new(),
            ballots: Vec::new(),
            outcome: VerdictOutcome::Skipped,
        }
    }

    pub fn main_votes(&self) -> usize {
        self.ballots
            .iter()
            .filter(|b| matches!(b, BallotChoice::Main))
            .count()
    }

    pub fn counter_votes(&self) -> usize {
        self.ballots
            .iter()
            .filter(|b| matches!(b, BallotChoice::Counter))
            .count()
    }

    pub fn abstentions(&self) -> usize {
        self.ballots
            .iter()
            .filter(|b| matches!(b, BallotChoice::Abstain))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BallotChoice::{Abstain, Counter, Main};

    #[test]
    fn test_all_main_accepts() {
        let v = ValidationVerdict::from_ballots(vec![], vec![Main, Main, Main]);
        assert_eq!(v.outcome, VerdictOutcome::Accepted);
        assert_eq!(v.main_votes(), 3);
    }

    #[test]
    fn test_all_counter_flags() {
        let v = ValidationVerdict::from_ballots(vec![], vec![Counter, Counter, Counter]);
        assert_eq!(v.outcome, VerdictOutcome::Flagged);
        assert_eq!(v.counter_votes(), 3);
    }

    #[test]
    fn test_exact_tie_accepts() {
        let v = ValidationVerdict::from_ballots(vec![], vec![Main, Counter, Abstain]);
        assert_eq!(v.outcome, VerdictOutcome::Accepted);
    }

    #[test]
    fn test_abstentions_do_not_count() {
        // One counter against zero main: flagged even with many abstentions
        let v = ValidationVerdict::from_ballots(vec![], vec![Abstain, Abstain, Counter]);
        assert_eq!(v.outcome, VerdictOutcome::Flagged);
        assert_eq!(v.abstentions(), 2);
    }

    #[test]
    fn test_all_abstain_accepts() {
        // 0 >= 0: ambiguous evidence does not interrupt the thread
        let v = ValidationVerdict::from_ballots(vec![], vec![Abstain, Abstain, Abstain]);
        assert_eq!(v.outcome, VerdictOutcome::Accepted);
    }

    #[test]
    fn test_skipped_verdict() {
        let v = ValidationVerdict::skipped();
        assert_eq!(v.outcome, VerdictOutcome::Skipped);
        assert!(v.ballots.is_empty());
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(!VerdictOutcome::Pending.is_terminal());
        assert!(VerdictOutcome::Skipped.is_terminal());
        assert!(VerdictOutcome::Flagged.is_flagged());
        assert!(!VerdictOutcome::Accepted.is_flagged());
    }
}
