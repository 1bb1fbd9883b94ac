//! OpenAI-wire adapter for the model client port.

pub mod client;
pub mod retry;
pub mod wire;

pub use client::OpenAiModelClient;
pub use retry::RetryPolicy;
