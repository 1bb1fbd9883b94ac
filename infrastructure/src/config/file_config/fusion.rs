//! Fusion settings (`[fusion]` section)

use crate::config::error::ConfigError;
use ensemble_application::FusionParams;
use ensemble_domain::FusionStrategy;
use serde::{Deserialize, Serialize};

/// Fusion settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileFusionConfig {
    /// `intelligent` or `concat`.
    pub strategy: String,
    pub concat_delimiter: String,
}

impl Default for FileFusionConfig {
    fn default() -> Self {
        let params = FusionParams::default();
        Self {
            strategy: params.strategy.to_string(),
            concat_delimiter: params.concat_delimiter,
        }
    }
}

impl FileFusionConfig {
    pub fn to_params(&self) -> Result<FusionParams, ConfigError> {
        let strategy: FusionStrategy = self
            .strategy
            .parse()
            .map_err(|e| ConfigError::invalid("fusion.strategy", format!("{}", e)))?;

        Ok(FusionParams {
            strategy,
            concat_delimiter: self.concat_delimiter.clone(),
        })
    }
}
