//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// Any of these at startup is fatal: the process reports the error and
/// exits non-zero.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("models.{0} is required")]
    MissingModel(&'static str),

    #[error("upstream.base_url is required")]
    MissingBaseUrl,

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
