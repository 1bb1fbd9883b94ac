//! Prompt templates for every model role.

pub mod template;

pub use template::PromptTemplate;
