//! Fusion strategy selection.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the completed threads are collapsed into one answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionStrategy {
    /// One fusion-model call that merges, reconciles, and deduplicates.
    #[default]
    Intelligent,
    /// Deterministic concatenation with a configured delimiter.
    Concat,
}

impl FromStr for FusionStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intelligent" => Ok(FusionStrategy::Intelligent),
            "concat" => Ok(FusionStrategy::Concat),
            other => Err(DomainError::InvalidFusionStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Display for FusionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionStrategy::Intelligent => write!(f, "intelligent"),
            FusionStrategy::Concat => write!(f, "concat"),
        }
    }
}
