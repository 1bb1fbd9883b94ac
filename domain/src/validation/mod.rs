//! Adversarial validation primitives: ballots, keywords, and verdicts.
//!
//! The validation sub-pipeline challenges every step with generated
//! counterexamples and puts the step to a vote. This module holds the
//! pure half of that pipeline: parsing vote responses and tallying them.

pub mod ballot;
pub mod verdict;

pub use ballot::{BallotChoice, VoteKeywords, parse_ballot};
pub use verdict::{ValidationVerdict, VerdictOutcome};
