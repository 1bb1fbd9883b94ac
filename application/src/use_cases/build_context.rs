//! Per-thread context builder.
//!
//! Assembles the message list for each step from the thread's history,
//! compressing the middle of long histories through the summary model.
//! Summaries are memoized for the lifetime of the thread, keyed by the
//! identity of the middle range (index span plus a content hash), so an
//! unchanged range never triggers a second summarization call.
//!
//! Summarization failure is absorbed: the middle range is then merged
//! verbatim instead, which keeps the window shape identical.

use crate::config::ContextParams;
use crate::ports::{InvokeOptions, ModelClient};
use crate::use_cases::shared::invoke_cancellable;
use ensemble_domain::{ChatMessage, PromptTemplate, Step, WindowPlan, assemble, plan_window};
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Identity of a summarized middle range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SummaryKey {
    start: usize,
    end: usize,
    digest: u64,
}

impl SummaryKey {
    fn of(start: usize, end: usize, steps: &[Step]) -> Self {
        let mut hasher = DefaultHasher::new();
        for step in &steps[start..end] {
            step.body.hash(&mut hasher);
        }
        Self {
            start,
            end,
            digest: hasher.finish(),
        }
    }
}

/// Builds the message list fed into each thinking step.
pub struct ContextBuilder {
    summary_model: String,
    params: ContextParams,
    question: String,
    memo: HashMap<SummaryKey, String>,
}

impl ContextBuilder {
    pub fn new(
        summary_model: impl Into<String>,
        params: ContextParams,
        question: impl Into<String>,
    ) -> Self {
        Self {
            summary_model: summary_model.into(),
            params,
            question: question.into(),
            memo: HashMap::new(),
        }
    }

    /// Build the message list for the step following `steps`.
    ///
    /// `base_messages` is the request's message list (with the thinking
    /// system prompt prepended); history is appended as assistant turns,
    /// compressed per the window plan.
    pub async fn build(
        &mut self,
        client: &dyn ModelClient,
        token: &CancellationToken,
        base_messages: &[ChatMessage],
        steps: &[Step],
    ) -> Vec<ChatMessage> {
        let plan = plan_window(steps.len());

        let summary = match &plan {
            WindowPlan::Literal { .. } => None,
            WindowPlan::Compressed { middle, .. } => {
                Some(self.summarize(client, token, steps, middle.start, middle.end).await)
            }
        };

        assemble(base_messages, steps, &plan, summary.as_deref())
    }

    /// Summarize the middle range, hitting the memo when the range is
    /// unchanged since the last build.
    async fn summarize(
        &mut self,
        client: &dyn ModelClient,
        token: &CancellationToken,
        steps: &[Step],
        start: usize,
        end: usize,
    ) -> String {
        if start >= end {
            return String::new();
        }

        let key = SummaryKey::of(start, end, steps);
        if let Some(cached) = self.memo.get(&key) {
            debug!("Context summary memo hit for steps {}..{}", start, end);
            return cached.clone();
        }

        let bodies: Vec<String> = steps[start..end].iter().map(|s| s.body.clone()).collect();
        let merged_len: usize = bodies.iter().map(|b| b.len()).sum();

        let summary = if self.params.summary_enabled {
            let messages = vec![
                ChatMessage::system(PromptTemplate::summary_system()),
                ChatMessage::user(PromptTemplate::summary_user(&self.question, &bodies)),
            ];
            match invoke_cancellable(
                client,
                token,
                &self.summary_model,
                &messages,
                InvokeOptions::default(),
            )
            .await
            {
                Ok(text) => {
                    debug!(
                        "Summarized steps {}..{}: {} -> {} bytes",
                        start,
                        end,
                        merged_len,
                        text.len()
                    );
                    text
                }
                Err(e) => {
                    warn!(
                        "Summarization of steps {}..{} failed ({}), merging verbatim",
                        start, end, e
                    );
                    bodies.join("\n\n")
                }
            }
        } else {
            bodies.join("\n\n")
        };

        self.memo.insert(key, summary.clone());
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ModelClientError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedClient {
        response: Result<String, ModelClientError>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(ModelClientError::UpstreamUnavailable("down".to_string())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn invoke(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: InvokeOptions,
        ) -> Result<String, ModelClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn steps(n: usize) -> Vec<Step> {
        (0..n)
            .map(|i| Step::new(i, format!("step {}", i), false, Duration::ZERO))
            .collect()
    }

    fn base() -> Vec<ChatMessage> {
        vec![ChatMessage::user("the question")]
    }

    fn builder() -> ContextBuilder {
        ContextBuilder::new("summarizer", ContextParams::default(), "the question")
    }

    #[tokio::test]
    async fn test_short_history_makes_no_summary_call() {
        let client = ScriptedClient::ok("unused");
        let token = CancellationToken::new();
        let mut ctx = builder();

        for k in 0..3 {
            let msgs = ctx.build(&client, &token, &base(), &steps(k)).await;
            assert_eq!(msgs.len(), 1 + k);
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_middle_makes_no_summary_call() {
        // k == 3 compresses an empty range
        let client = ScriptedClient::ok("unused");
        let token = CancellationToken::new();
        let mut ctx = builder();

        let msgs = ctx.build(&client, &token, &base(), &steps(3)).await;
        assert_eq!(msgs.len(), 1 + 4);
        assert_eq!(msgs[2].content, "");
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_history_summarizes_middle() {
        let client = ScriptedClient::ok("the gist");
        let token = CancellationToken::new();
        let mut ctx = builder();

        let msgs = ctx.build(&client, &token, &base(), &steps(6)).await;
        assert_eq!(msgs.len(), 1 + 4);
        assert_eq!(msgs[1].content, "step 0");
        assert_eq!(msgs[2].content, "the gist");
        assert_eq!(msgs[3].content, "step 4");
        assert_eq!(msgs[4].content, "step 5");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unchanged_range_hits_memo() {
        let client = ScriptedClient::ok("the gist");
        let token = CancellationToken::new();
        let mut ctx = builder();
        let s = steps(6);

        ctx.build(&client, &token, &base(), &s).await;
        ctx.build(&client, &token, &base(), &s).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_grown_range_summarizes_again() {
        let client = ScriptedClient::ok("the gist");
        let token = CancellationToken::new();
        let mut ctx = builder();

        ctx.build(&client, &token, &base(), &steps(6)).await;
        ctx.build(&client, &token, &base(), &steps(7)).await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_summary_failure_merges_verbatim() {
        let client = ScriptedClient::failing();
        let token = CancellationToken::new();
        let mut ctx = builder();

        let msgs = ctx.build(&client, &token, &base(), &steps(6)).await;
        // Window shape is preserved; the merged message carries the raw bodies
        assert_eq!(msgs.len(), 1 + 4);
        assert!(msgs[2].content.contains("step 1"));
        assert!(msgs[2].content.contains("step 3"));
    }

    #[tokio::test]
    async fn test_summary_disabled_merges_verbatim_without_calls() {
        let client = ScriptedClient::ok("unused");
        let token = CancellationToken::new();
        let mut ctx = ContextBuilder::new(
            "summarizer",
            ContextParams {
                summary_enabled: false,
            },
            "q",
        );

        let msgs = ctx.build(&client, &token, &base(), &steps(6)).await;
        assert!(msgs[2].content.contains("step 2"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
