//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Step index out of order: expected {expected}, got {got}")]
    StepIndexOutOfOrder { expected: usize, got: usize },

    #[error("Thread {0} is already terminal")]
    ThreadAlreadyTerminal(usize),

    #[error("Invalid fusion strategy: {0}")]
    InvalidFusionStrategy(String),
}
