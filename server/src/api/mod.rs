//! HTTP API surface: handlers, shapes, and error rendering.

pub mod chat;
pub mod error;
pub mod health;
pub mod models;
pub mod stream;
pub mod types;
