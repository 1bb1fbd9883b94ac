//! Context-window planning for thread prompts.

pub mod window;

pub use window::{WindowPlan, assemble, plan_window};
