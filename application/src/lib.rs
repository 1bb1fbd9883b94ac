//! Application layer for the ensemble reasoning gateway.
//!
//! This crate contains the use cases, port definitions, and pipeline
//! configuration. It depends only on the domain layer; adapters for its
//! ports live in the infrastructure crate.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{
    ContextParams, EnsembleConfig, FusionParams, LimitsParams, ModelRoles, RequestOverrides,
    ThinkingParams, ValidationParams,
};
pub use ports::{InvokeOptions, ModelClient, ModelClientError};
pub use use_cases::{
    AnswerEvent, ContextBuilder, RunEnsembleError, RunEnsembleInput, RunEnsembleUseCase,
    StepValidator, ThinkingThread, ThreadFusion,
};
