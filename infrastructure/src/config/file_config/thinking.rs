//! Thinking-thread settings (`[thinking]` section)

use crate::config::error::ConfigError;
use ensemble_application::ThinkingParams;
use serde::{Deserialize, Serialize};

/// Thinking settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileThinkingConfig {
    pub threads: usize,
    pub max_steps: usize,
    pub termination_marker: String,
    pub base_temperature: f32,
    pub temperature_spread: f32,
}

impl Default for FileThinkingConfig {
    fn default() -> Self {
        let params = ThinkingParams::default();
        Self {
            threads: params.threads,
            max_steps: params.max_steps,
            termination_marker: params.termination_marker,
            base_temperature: params.base_temperature,
            temperature_spread: params.temperature_spread,
        }
    }
}

impl FileThinkingConfig {
    pub fn to_params(&self) -> Result<ThinkingParams, ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::invalid("thinking.threads", "must be positive"));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::invalid(
                "thinking.max_steps",
                "must be positive",
            ));
        }
        if self.termination_marker.trim().is_empty() {
            return Err(ConfigError::invalid(
                "thinking.termination_marker",
                "must not be blank",
            ));
        }

        Ok(ThinkingParams {
            threads: self.threads,
            max_steps: self.max_steps,
            termination_marker: self.termination_marker.clone(),
            base_temperature: self.base_temperature,
            temperature_spread: self.temperature_spread,
        })
    }
}
