//! Ports consumed by the application layer.

pub mod model_client;

pub use model_client::{InvokeOptions, ModelClient, ModelClientError};
