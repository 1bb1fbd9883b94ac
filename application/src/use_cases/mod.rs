//! Use cases: the reasoning pipeline's moving parts.

pub mod build_context;
pub mod fuse_threads;
pub mod run_ensemble;
mod shared;
pub mod thinking_thread;
pub mod validate_step;

pub use build_context::ContextBuilder;
pub use fuse_threads::ThreadFusion;
pub use run_ensemble::{
    AnswerEvent, RunEnsembleError, RunEnsembleInput, RunEnsembleUseCase,
};
pub use thinking_thread::{ThinkingThread, is_terminal};
pub use validate_step::StepValidator;
