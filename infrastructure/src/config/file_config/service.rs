//! Service identity and listen address (`[service]` section)

use serde::{Deserialize, Serialize};

/// Service settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileServiceConfig {
    /// Model id this gateway publishes to its own clients.
    pub model_name: String,
    pub host: String,
    pub port: u16,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            model_name: "ensemble-reasoner".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
