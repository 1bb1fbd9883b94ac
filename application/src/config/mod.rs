//! Application-layer configuration records.

pub mod ensemble_config;
pub mod params;
pub mod roles;

pub use ensemble_config::{EnsembleConfig, RequestOverrides};
pub use params::{ContextParams, FusionParams, LimitsParams, ThinkingParams, ValidationParams};
pub use roles::ModelRoles;
