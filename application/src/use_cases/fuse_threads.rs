//! Fusion of completed threads into one answer.
//!
//! The intelligent strategy makes one fusion-model call over the
//! threads' final step bodies (thread-id order, for reproducibility).
//! Any failure there falls back to deterministic concatenation, which
//! cannot fail — so fusion as a whole cannot fail either.

use crate::config::FusionParams;
use crate::ports::{InvokeOptions, ModelClient};
use crate::use_cases::shared::invoke_cancellable;
use ensemble_domain::{ChatMessage, FusionStrategy, PromptTemplate, ThreadState, concat_final_bodies};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Collapses the completed subset of threads into the final answer text.
pub struct ThreadFusion {
    client: Arc<dyn ModelClient>,
    model: String,
    params: FusionParams,
}

impl ThreadFusion {
    pub fn new(client: Arc<dyn ModelClient>, model: impl Into<String>, params: FusionParams) -> Self {
        Self {
            client,
            model: model.into(),
            params,
        }
    }

    /// Fuse `completed` (at least one thread) under the configured
    /// strategy.
    pub async fn fuse(
        &self,
        token: &CancellationToken,
        question: &str,
        completed: &[&ThreadState],
    ) -> String {
        match self.params.strategy {
            FusionStrategy::Concat => self.concat(completed),
            FusionStrategy::Intelligent => self.intelligent(token, question, completed).await,
        }
    }

    fn concat(&self, completed: &[&ThreadState]) -> String {
        concat_final_bodies(completed, &self.params.concat_delimiter)
    }

    async fn intelligent(
        &self,
        token: &CancellationToken,
        question: &str,
        completed: &[&ThreadState],
    ) -> String {
        let mut finals: Vec<(usize, String)> = completed
            .iter()
            .filter_map(|t| t.final_body().map(|b| (t.id, b.to_string())))
            .collect();
        finals.sort_by_key(|(id, _)| *id);

        let messages = vec![
            ChatMessage::system(PromptTemplate::fusion_system()),
            ChatMessage::user(PromptTemplate::fusion_user(question, &finals)),
        ];

        match invoke_cancellable(
            self.client.as_ref(),
            token,
            &self.model,
            &messages,
            InvokeOptions::default(),
        )
        .await
        {
            Ok(text) => {
                info!("Fused {} threads into {} bytes", finals.len(), text.len());
                text
            }
            Err(e) => {
                warn!("Intelligent fusion failed ({}), falling back to concat", e);
                self.concat(completed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ModelClientError;
    use async_trait::async_trait;
    use ensemble_domain::Step;
    use std::time::Duration;

    struct FusionClient {
        response: Result<String, ModelClientError>,
    }

    #[async_trait]
    impl ModelClient for FusionClient {
        async fn invoke(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: InvokeOptions,
        ) -> Result<String, ModelClientError> {
            self.response.clone()
        }
    }

    fn completed(id: usize, body: &str) -> ThreadState {
        let mut t = ThreadState::new(id);
        t.push_step(Step::new(0, body, true, Duration::ZERO)).unwrap();
        t.complete().unwrap();
        t
    }

    fn fusion(response: Result<&str, ModelClientError>, params: FusionParams) -> ThreadFusion {
        ThreadFusion::new(
            Arc::new(FusionClient {
                response: response.map(str::to_string),
            }),
            "fusion-model",
            params,
        )
    }

    #[tokio::test]
    async fn test_concat_strategy_joins_final_bodies() {
        let f = fusion(
            Ok("unused"),
            FusionParams::default()
                .with_strategy(FusionStrategy::Concat)
                .with_concat_delimiter("\n\n---\n\n"),
        );
        let (a, b) = (completed(1, "X<END>"), completed(2, "Y<END>"));
        let out = f.fuse(&CancellationToken::new(), "q", &[&a, &b]).await;
        assert_eq!(out, "X<END>\n\n---\n\nY<END>");
    }

    #[tokio::test]
    async fn test_intelligent_strategy_returns_model_text_verbatim() {
        let f = fusion(Ok("ABC"), FusionParams::default());
        let (a, b, c) = (completed(0, "A<END>"), completed(1, "B<END>"), completed(2, "C<END>"));
        let out = f.fuse(&CancellationToken::new(), "q", &[&a, &b, &c]).await;
        assert_eq!(out, "ABC");
    }

    #[tokio::test]
    async fn test_intelligent_failure_falls_back_to_concat() {
        let f = fusion(
            Err(ModelClientError::UpstreamUnavailable("down".to_string())),
            FusionParams::default().with_concat_delimiter(" / "),
        );
        let (a, b) = (completed(0, "first"), completed(1, "second"));
        let out = f.fuse(&CancellationToken::new(), "q", &[&a, &b]).await;
        assert_eq!(out, "first / second");
    }
}
