//! Upstream endpoint settings (`[upstream]` section)
//!
//! The API key is deliberately absent here: secrets come from the
//! process environment (`ENSEMBLE_UPSTREAM_API_KEY`), never from the
//! configuration document.

use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream endpoint configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileUpstreamConfig {
    /// Chat-completions endpoint URL.
    pub base_url: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FileUpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 120,
        }
    }
}

/// Resolved upstream settings
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub call_timeout: Duration,
}

impl FileUpstreamConfig {
    pub fn to_settings(&self) -> Result<UpstreamSettings, ConfigError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "upstream.timeout_secs",
                "must be positive",
            ));
        }

        Ok(UpstreamSettings {
            base_url: base_url.to_string(),
            call_timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_base_url_is_an_error() {
        assert!(matches!(
            FileUpstreamConfig::default().to_settings(),
            Err(ConfigError::MissingBaseUrl)
        ));
    }

    #[test]
    fn test_resolution() {
        let config = FileUpstreamConfig {
            base_url: Some("https://api.example.com/v1/chat/completions".to_string()),
            timeout_secs: 60,
        };
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.call_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_timeout_is_an_error() {
        let config = FileUpstreamConfig {
            base_url: Some("https://api.example.com".to_string()),
            timeout_secs: 0,
        };
        assert!(config.to_settings().is_err());
    }
}
