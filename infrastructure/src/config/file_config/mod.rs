//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Unknown keys are rejected at deserialization time, so a typo in the
//! document fails startup instead of being silently ignored.

mod fusion;
mod models;
mod runtime;
mod service;
mod thinking;
mod upstream;
mod validation;

pub use fusion::FileFusionConfig;
pub use models::FileModelsConfig;
pub use runtime::{FileConcurrencyConfig, FileContextConfig, FileLimitsConfig};
pub use service::FileServiceConfig;
pub use thinking::FileThinkingConfig;
pub use upstream::{FileUpstreamConfig, UpstreamSettings};
pub use validation::FileValidationConfig;

use crate::config::error::ConfigError;
use ensemble_application::EnsembleConfig;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Published model id and listen address
    pub service: FileServiceConfig,
    /// Role-based model selection
    pub models: FileModelsConfig,
    /// Upstream endpoint settings
    pub upstream: FileUpstreamConfig,
    /// Thinking-thread settings
    pub thinking: FileThinkingConfig,
    /// Validation sub-pipeline settings
    pub validation: FileValidationConfig,
    /// Fusion settings
    pub fusion: FileFusionConfig,
    /// Context compression settings
    pub context: FileContextConfig,
    /// Process-wide concurrency bound
    pub concurrency: FileConcurrencyConfig,
    /// Per-request limits
    pub limits: FileLimitsConfig,
}

/// Everything the binary needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub service: FileServiceConfig,
    pub upstream: UpstreamSettings,
    pub max_in_flight: usize,
    pub ensemble: EnsembleConfig,
}

impl FileConfig {
    /// Validate and resolve the raw file into runtime settings.
    pub fn into_loaded(self) -> Result<LoadedConfig, ConfigError> {
        let roles = self.models.to_roles()?;
        let upstream = self.upstream.to_settings()?;
        let max_in_flight = self.concurrency.to_limit()?;

        let ensemble = EnsembleConfig::new(
            roles,
            self.thinking.to_params()?,
            self.validation.to_params()?,
            self.fusion.to_params()?,
            self.context.to_params(),
            self.limits.to_params()?,
        );

        Ok(LoadedConfig {
            service: self.service,
            upstream,
            max_in_flight,
            ensemble,
        })
    }
}
