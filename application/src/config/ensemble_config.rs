//! Ensemble configuration container.
//!
//! [`EnsembleConfig`] groups the split parameter types into the single
//! container the orchestrator holds, and applies per-request overrides
//! to produce the effective configuration for one request.

use super::params::{ContextParams, FusionParams, LimitsParams, ThinkingParams, ValidationParams};
use super::roles::ModelRoles;
use ensemble_domain::FusionStrategy;

/// Per-request overrides carried by the inbound request's extension
/// fields. Range checking happens at the ingress; by the time overrides
/// reach the pipeline they are trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    pub threads: Option<usize>,
    pub validate: Option<bool>,
    pub fusion: Option<FusionStrategy>,
    pub max_steps: Option<usize>,
}

impl RequestOverrides {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn with_fusion(mut self, strategy: FusionStrategy) -> Self {
        self.fusion = Some(strategy);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// Configuration container for the reasoning pipeline.
#[derive(Debug, Clone, Default)]
pub struct EnsembleConfig {
    roles: ModelRoles,
    thinking: ThinkingParams,
    validation: ValidationParams,
    fusion: FusionParams,
    context: ContextParams,
    limits: LimitsParams,
}

impl EnsembleConfig {
    pub fn new(
        roles: ModelRoles,
        thinking: ThinkingParams,
        validation: ValidationParams,
        fusion: FusionParams,
        context: ContextParams,
        limits: LimitsParams,
    ) -> Self {
        Self {
            roles,
            thinking,
            validation,
            fusion,
            context,
            limits,
        }
    }

    // ==================== Accessors ====================

    pub fn roles(&self) -> &ModelRoles {
        &self.roles
    }

    pub fn thinking(&self) -> &ThinkingParams {
        &self.thinking
    }

    pub fn validation(&self) -> &ValidationParams {
        &self.validation
    }

    pub fn fusion(&self) -> &FusionParams {
        &self.fusion
    }

    pub fn context(&self) -> &ContextParams {
        &self.context
    }

    pub fn limits(&self) -> &LimitsParams {
        &self.limits
    }

    // ==================== Builder Methods ====================

    pub fn with_roles(mut self, roles: ModelRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_thinking(mut self, thinking: ThinkingParams) -> Self {
        self.thinking = thinking;
        self
    }

    pub fn with_validation(mut self, validation: ValidationParams) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_fusion(mut self, fusion: FusionParams) -> Self {
        self.fusion = fusion;
        self
    }

    pub fn with_context(mut self, context: ContextParams) -> Self {
        self.context = context;
        self
    }

    pub fn with_limits(mut self, limits: LimitsParams) -> Self {
        self.limits = limits;
        self
    }

    // ==================== Override Application ====================

    /// Clone this configuration with per-request overrides applied.
    pub fn effective(&self, overrides: &RequestOverrides) -> Self {
        let mut config = self.clone();
        if let Some(threads) = overrides.threads {
            config.thinking.threads = threads;
        }
        if let Some(max_steps) = overrides.max_steps {
            config.thinking.max_steps = max_steps;
        }
        if let Some(validate) = overrides.validate {
            config.validation.enabled = validate;
        }
        if let Some(strategy) = overrides.fusion {
            config.fusion.strategy = strategy;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_without_overrides_is_identity() {
        let config = EnsembleConfig::default();
        let effective = config.effective(&RequestOverrides::default());
        assert_eq!(effective.thinking(), config.thinking());
        assert_eq!(effective.validation(), config.validation());
        assert_eq!(effective.fusion(), config.fusion());
    }

    #[test]
    fn test_effective_applies_overrides() {
        let config = EnsembleConfig::default();
        let overrides = RequestOverrides::default()
            .with_threads(5)
            .with_validate(false)
            .with_fusion(FusionStrategy::Concat)
            .with_max_steps(7);

        let effective = config.effective(&overrides);
        assert_eq!(effective.thinking().threads, 5);
        assert_eq!(effective.thinking().max_steps, 7);
        assert!(!effective.validation().enabled);
        assert_eq!(effective.fusion().strategy, FusionStrategy::Concat);
        // Untouched knobs keep their configured values
        assert_eq!(
            effective.thinking().termination_marker,
            config.thinking().termination_marker
        );
    }
}
