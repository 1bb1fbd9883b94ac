//! Session types exchanged with upstream models.

pub mod message;

pub use message::{ChatMessage, Role};
