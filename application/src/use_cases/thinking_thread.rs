//! A single reasoning thread's step loop.
//!
//! Each iteration builds the context window, calls the main model, and
//! appends the resulting step. Validation of a step is dispatched
//! concurrently with the next step's main call; its verdict attaches
//! whenever it resolves. The loop ends when a step carries the
//! termination signal or the step cap is reached.
//!
//! Threads are independent: no cross-thread communication happens here,
//! and diversity comes only from upstream sampling (each thread gets its
//! own temperature).

use crate::config::EnsembleConfig;
use crate::ports::{InvokeOptions, ModelClient};
use crate::use_cases::build_context::ContextBuilder;
use crate::use_cases::shared::{CallError, invoke_cancellable};
use crate::use_cases::validate_step::StepValidator;
use ensemble_domain::{ChatMessage, Step, ThreadState, ValidationVerdict};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Termination predicate over a step body: the configured sentinel
/// marker, or an empty continuation.
pub fn is_terminal(body: &str, marker: &str) -> bool {
    body.contains(marker) || body.trim().is_empty()
}

/// One reasoning thread.
pub struct ThinkingThread {
    id: usize,
    client: Arc<dyn ModelClient>,
    config: EnsembleConfig,
}

impl ThinkingThread {
    pub fn new(id: usize, client: Arc<dyn ModelClient>, config: EnsembleConfig) -> Self {
        Self { id, client, config }
    }

    /// Run the step loop to a frozen [`ThreadState`].
    ///
    /// `base_messages` is the request message list with the thinking
    /// system prompt prepended; `question` is the last user message,
    /// quoted in validation and summary prompts.
    pub async fn run(
        &self,
        token: &CancellationToken,
        base_messages: &[ChatMessage],
        question: &str,
    ) -> ThreadState {
        let thinking = self.config.thinking();
        let roles = self.config.roles();

        info!("Thread {} starting (max {} steps)", self.id, thinking.max_steps);

        let mut state = ThreadState::new(self.id);
        let mut context = ContextBuilder::new(
            roles.summary.clone(),
            self.config.context().clone(),
            question,
        );
        let validator = self.config.validation().enabled.then(|| {
            StepValidator::new(
                Arc::clone(&self.client),
                roles.counterexample.clone(),
                roles.vote.clone(),
                self.config.validation().clone(),
                question,
            )
        });
        let mut validations: JoinSet<(usize, ValidationVerdict)> = JoinSet::new();

        for index in 0..thinking.max_steps {
            // Attach verdicts that resolved while earlier steps ran
            while let Some(Ok((i, verdict))) = validations.try_join_next() {
                state.resolve_verdict(i, verdict);
            }

            let messages = context
                .build(self.client.as_ref(), token, base_messages, &state.steps)
                .await;
            let options =
                InvokeOptions::default().with_temperature(thinking.temperature_for(self.id));

            let started = Instant::now();
            let body = match invoke_cancellable(
                self.client.as_ref(),
                token,
                &roles.main,
                &messages,
                options,
            )
            .await
            {
                Ok(body) => body,
                Err(CallError::Cancelled) => {
                    debug!("Thread {} cancelled at step {}", self.id, index);
                    let _ = state.fail("cancelled");
                    validations.shutdown().await;
                    return state;
                }
                Err(CallError::Client(e)) => {
                    warn!("Thread {} main call failed at step {}: {}", self.id, index, e);
                    let _ = state.fail(e.to_string());
                    validations.shutdown().await;
                    return state;
                }
            };

            let done = is_terminal(&body, &thinking.termination_marker);
            let mut step = Step::new(index, body, done, started.elapsed());

            // The final step has no concurrent successor to validate
            // alongside, so it never enters validation.
            if done || validator.is_none() {
                step.skip_verdict();
            }

            debug!(
                "Thread {} step {} complete ({} bytes, done={})",
                self.id,
                index,
                step.body.len(),
                done
            );

            if let Err(e) = state.push_step(step) {
                warn!("Thread {} dropped a step: {}", self.id, e);
                let _ = state.fail(e.to_string());
                validations.shutdown().await;
                return state;
            }

            if done {
                break;
            }

            if let Some(validator) = &validator {
                let validator = validator.clone();
                let token = token.clone();
                let body = state.steps[index].body.clone();
                validations.spawn(async move {
                    let verdict = validator.validate(&token, &body).await;
                    (index, verdict)
                });
            }
        }

        // Resolve every outstanding verdict before freezing the thread
        while let Some(result) = validations.join_next().await {
            match result {
                Ok((i, verdict)) => state.resolve_verdict(i, verdict),
                Err(e) => warn!("Thread {} validation task join error: {}", self.id, e),
            }
        }

        let _ = state.complete();
        info!(
            "Thread {} completed with {} steps ({} flagged)",
            self.id,
            state.steps.len(),
            state.flagged_steps()
        );
        state
    }
}
