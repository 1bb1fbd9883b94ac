//! Ballot parsing for step validation.
//!
//! These functions extract a structured ballot from a free-form vote-model
//! response. They are pure domain logic — no I/O, no session management,
//! just text pattern matching.
//!
//! Parsing is deterministic and conservative: a response that names both
//! sides, or neither, is coerced to [`BallotChoice::Abstain`] rather than
//! guessed at.

use serde::{Deserialize, Serialize};

/// One ballot cast by a vote model when judging a step against its
/// counterexamples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallotChoice {
    /// The step's reasoning holds up against the counterexamples.
    Main,
    /// At least one counterexample defeats the step.
    Counter,
    /// No usable judgment (ambiguous, unparseable, or a failed call).
    Abstain,
}

impl std::fmt::Display for BallotChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotChoice::Main => write!(f, "main"),
            BallotChoice::Counter => write!(f, "counter"),
            BallotChoice::Abstain => write!(f, "abstain"),
        }
    }
}

/// Keyword set the vote prompt instructs models to answer with.
///
/// Configurable because the exact wording is prompt-dependent; the
/// defaults match the built-in vote prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteKeywords {
    pub main: String,
    pub counter: String,
}

impl Default for VoteKeywords {
    fn default() -> Self {
        Self {
            main: "MAIN".to_string(),
            counter: "COUNTER".to_string(),
        }
    }
}

impl VoteKeywords {
    pub fn new(main: impl Into<String>, counter: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            counter: counter.into(),
        }
    }
}

/// Parse a vote-model response into a ballot.
///
/// Case-insensitive keyword scan: exactly one of the two keywords must
/// appear for the ballot to count; anything else abstains.
pub fn parse_ballot(response: &str, keywords: &VoteKeywords) -> BallotChoice {
    let response_upper = response.to_uppercase();

    let has_main = response_upper.contains(&keywords.main.to_uppercase());
    let has_counter = response_upper.contains(&keywords.counter.to_uppercase());

    match (has_main, has_counter) {
        (true, false) => BallotChoice::Main,
        (false, true) => BallotChoice::Counter,
        _ => BallotChoice::Abstain,
    }
}
