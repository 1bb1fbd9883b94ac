//! Runtime sections: `[context]`, `[concurrency]`, and `[limits]`

use crate::config::error::ConfigError;
use ensemble_application::{ContextParams, LimitsParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Context compression settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileContextConfig {
    pub summary_enabled: bool,
}

impl Default for FileContextConfig {
    fn default() -> Self {
        Self {
            summary_enabled: true,
        }
    }
}

impl FileContextConfig {
    pub fn to_params(&self) -> ContextParams {
        ContextParams {
            summary_enabled: self.summary_enabled,
        }
    }
}

/// Concurrency settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConcurrencyConfig {
    /// Upper bound on in-flight upstream calls across the process.
    pub max_in_flight: usize,
}

impl Default for FileConcurrencyConfig {
    fn default() -> Self {
        Self { max_in_flight: 32 }
    }
}

impl FileConcurrencyConfig {
    pub fn to_limit(&self) -> Result<usize, ConfigError> {
        if self.max_in_flight == 0 {
            return Err(ConfigError::invalid(
                "concurrency.max_in_flight",
                "must be positive",
            ));
        }
        Ok(self.max_in_flight)
    }
}

/// Per-request limit settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLimitsConfig {
    /// Per-request wall-clock deadline in seconds; 0 disables it.
    pub request_deadline_secs: u64,
    /// Streaming chunk budget in bytes.
    pub stream_chunk_bytes: usize,
}

impl Default for FileLimitsConfig {
    fn default() -> Self {
        Self {
            request_deadline_secs: 600,
            stream_chunk_bytes: 50,
        }
    }
}

impl FileLimitsConfig {
    pub fn to_params(&self) -> Result<LimitsParams, ConfigError> {
        if self.stream_chunk_bytes == 0 {
            return Err(ConfigError::invalid(
                "limits.stream_chunk_bytes",
                "must be positive",
            ));
        }

        let request_deadline = match self.request_deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(LimitsParams {
            request_deadline,
            stream_chunk_bytes: self.stream_chunk_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_defaults_round_trip() {
        let params = FileLimitsConfig::default().to_params().unwrap();
        assert_eq!(params, LimitsParams::default());
    }

    #[test]
    fn test_zero_deadline_disables_it() {
        let config = FileLimitsConfig {
            request_deadline_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.to_params().unwrap().request_deadline, None);
    }

    #[test]
    fn test_zero_chunk_budget_rejected() {
        let config = FileLimitsConfig {
            stream_chunk_bytes: 0,
            ..Default::default()
        };
        assert!(config.to_params().is_err());
    }

    #[test]
    fn test_zero_in_flight_rejected() {
        let config = FileConcurrencyConfig { max_in_flight: 0 };
        assert!(config.to_limit().is_err());
    }
}
