//! Validation settings (`[validation]` section)

use crate::config::error::ConfigError;
use ensemble_application::ValidationParams;
use ensemble_domain::VoteKeywords;
use serde::{Deserialize, Serialize};

/// Validation settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileValidationConfig {
    pub enabled: bool,
    pub counterexamples: usize,
    pub votes: usize,
    /// Keyword the vote prompt uses for "the step survives".
    pub main_keyword: String,
    /// Keyword the vote prompt uses for "a counterexample wins".
    pub counter_keyword: String,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        let keywords = VoteKeywords::default();
        Self {
            enabled: true,
            counterexamples: 3,
            votes: 3,
            main_keyword: keywords.main,
            counter_keyword: keywords.counter,
        }
    }
}

impl FileValidationConfig {
    pub fn to_params(&self) -> Result<ValidationParams, ConfigError> {
        if self.counterexamples == 0 {
            return Err(ConfigError::invalid(
                "validation.counterexamples",
                "must be positive",
            ));
        }
        if self.votes == 0 {
            return Err(ConfigError::invalid("validation.votes", "must be positive"));
        }
        if self.main_keyword.trim().is_empty() || self.counter_keyword.trim().is_empty() {
            return Err(ConfigError::invalid(
                "validation.main_keyword / counter_keyword",
                "must not be blank",
            ));
        }
        if self.main_keyword.eq_ignore_ascii_case(&self.counter_keyword) {
            return Err(ConfigError::invalid(
                "validation.counter_keyword",
                "must differ from main_keyword",
            ));
        }

        Ok(ValidationParams {
            enabled: self.enabled,
            counterexamples: self.counterexamples,
            votes: self.votes,
            keywords: VoteKeywords::new(&self.main_keyword, &self.counter_keyword),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let params = FileValidationConfig::default().to_params().unwrap();
        assert_eq!(params, ValidationParams::default());
    }

    #[test]
    fn test_identical_keywords_rejected() {
        let config = FileValidationConfig {
            counter_keyword: "main".to_string(),
            ..Default::default()
        };
        assert!(config.to_params().is_err());
    }

    #[test]
    fn test_zero_votes_rejected() {
        let config = FileValidationConfig {
            votes: 0,
            ..Default::default()
        };
        assert!(config.to_params().is_err());
    }
}
