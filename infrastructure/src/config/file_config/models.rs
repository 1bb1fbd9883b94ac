//! Role-based model selection from TOML (`[models]` section)
//!
//! # Example
//!
//! ```toml
//! [models]
//! main = "deepseek-chat"              # thinking steps
//! fusion = "deepseek-reasoner"        # final merge
//! summary = "deepseek-chat"           # middle-range compression
//! counterexample = "deepseek-chat"    # adversarial critiques
//! vote = "deepseek-chat"              # step voting
//! ```
//!
//! Only `main` is required; every other role falls back to it.

use crate::config::error::ConfigError;
use ensemble_application::ModelRoles;
use serde::{Deserialize, Serialize};

/// Role-based model configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileModelsConfig {
    pub main: Option<String>,
    pub fusion: Option<String>,
    pub summary: Option<String>,
    pub counterexample: Option<String>,
    pub vote: Option<String>,
}

impl FileModelsConfig {
    /// Resolve into [`ModelRoles`], defaulting absent roles to `main`.
    pub fn to_roles(&self) -> Result<ModelRoles, ConfigError> {
        let main = self
            .main
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingModel("main"))?;

        let pick = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(main)
                .to_string()
        };

        Ok(ModelRoles {
            main: main.to_string(),
            fusion: pick(&self.fusion),
            summary: pick(&self.summary),
            counterexample: pick(&self.counterexample),
            vote: pick(&self.vote),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_main_is_an_error() {
        let config = FileModelsConfig::default();
        assert!(matches!(
            config.to_roles(),
            Err(ConfigError::MissingModel("main"))
        ));
    }

    #[test]
    fn test_absent_roles_fall_back_to_main() {
        let config = FileModelsConfig {
            main: Some("base-model".to_string()),
            fusion: Some("big-model".to_string()),
            ..Default::default()
        };
        let roles = config.to_roles().unwrap();
        assert_eq!(roles.main, "base-model");
        assert_eq!(roles.fusion, "big-model");
        assert_eq!(roles.summary, "base-model");
        assert_eq!(roles.vote, "base-model");
    }

    #[test]
    fn test_blank_main_is_an_error() {
        let config = FileModelsConfig {
            main: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.to_roles().is_err());
    }
}
