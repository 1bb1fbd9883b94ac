//! Role-based model selection.
//!
//! Every pipeline stage can run on a different upstream model; this
//! record maps the five roles to opaque model names resolved by the
//! model client adapter.

use serde::{Deserialize, Serialize};

/// Model names per pipeline role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoles {
    /// Thinking steps.
    pub main: String,
    /// Intelligent fusion.
    pub fusion: String,
    /// Middle-range summarization.
    pub summary: String,
    /// Counterexample generation.
    pub counterexample: String,
    /// Step voting.
    pub vote: String,
}

impl Default for ModelRoles {
    fn default() -> Self {
        ModelRoles::uniform("gpt-4o-mini")
    }
}

impl ModelRoles {
    /// Use one model name for every role.
    pub fn uniform(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            main: model.clone(),
            fusion: model.clone(),
            summary: model.clone(),
            counterexample: model.clone(),
            vote: model,
        }
    }

    pub fn with_main(mut self, model: impl Into<String>) -> Self {
        self.main = model.into();
        self
    }

    pub fn with_fusion(mut self, model: impl Into<String>) -> Self {
        self.fusion = model.into();
        self
    }

    pub fn with_summary(mut self, model: impl Into<String>) -> Self {
        self.summary = model.into();
        self
    }

    pub fn with_counterexample(mut self, model: impl Into<String>) -> Self {
        self.counterexample = model.into();
        self
    }

    pub fn with_vote(mut self, model: impl Into<String>) -> Self {
        self.vote = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_and_builders() {
        let roles = ModelRoles::uniform("base").with_fusion("big");
        assert_eq!(roles.main, "base");
        assert_eq!(roles.vote, "base");
        assert_eq!(roles.fusion, "big");
    }
}
