//! Run Ensemble use case.
//!
//! The orchestrator: fans out N independent thinking threads, waits for
//! all of them to terminate, fuses the completed subset, and reports the
//! answer — in one piece, or chunked for streaming.
//!
//! Failure policy: a thread failure is logged and absorbed as long as at
//! least one thread completes; fusion cannot fail (it falls back to
//! concat); only `AllThreadsFailed`, `DeadlineExceeded`, and
//! cancellation reach the caller.

use crate::config::{EnsembleConfig, RequestOverrides};
use crate::ports::ModelClient;
use crate::use_cases::fuse_threads::ThreadFusion;
use crate::use_cases::thinking_thread::ThinkingThread;
use ensemble_domain::{
    ChatMessage, FinalAnswer, PromptTemplate, Role, ThreadState, UsageMeta, chunk_text,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can surface from a full ensemble run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunEnsembleError {
    #[error("Request contains no user message")]
    EmptyRequest,

    #[error("All reasoning threads failed")]
    AllThreadsFailed,

    #[error("Request deadline elapsed before any thread completed")]
    DeadlineExceeded,

    #[error("Request was cancelled")]
    Cancelled,
}

/// Input for one ensemble run
#[derive(Debug, Clone)]
pub struct RunEnsembleInput {
    /// The inbound conversation, in request order.
    pub messages: Vec<ChatMessage>,
    /// Per-request overrides from the extension fields.
    pub overrides: RequestOverrides,
}

impl RunEnsembleInput {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            overrides: RequestOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: RequestOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Events emitted on the streaming path.
#[derive(Debug, Clone)]
pub enum AnswerEvent {
    /// One chunk of the final answer text.
    Chunk(String),
    /// The full answer, after all chunks were emitted.
    Completed(FinalAnswer),
    /// The run failed; no further events follow.
    Failed(RunEnsembleError),
}

/// Use case for running the full ensemble pipeline
#[derive(Clone)]
pub struct RunEnsembleUseCase {
    client: Arc<dyn ModelClient>,
    config: EnsembleConfig,
}

impl RunEnsembleUseCase {
    pub fn new(client: Arc<dyn ModelClient>, config: EnsembleConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Execute the pipeline and return the fused answer.
    pub async fn execute(
        &self,
        input: RunEnsembleInput,
        token: &CancellationToken,
    ) -> Result<FinalAnswer, RunEnsembleError> {
        let config = self.config.effective(&input.overrides);
        let thinking = config.thinking();

        let question = input
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .ok_or(RunEnsembleError::EmptyRequest)?;

        let mut base_messages = Vec::with_capacity(input.messages.len() + 1);
        base_messages.push(ChatMessage::system(PromptTemplate::thinking_system(
            &thinking.termination_marker,
        )));
        base_messages.extend(input.messages);

        let n = thinking.threads;
        info!("Starting ensemble with {} threads", n);

        // Child token: the deadline cancels our threads without touching
        // the caller's token.
        let work_token = token.child_token();

        let mut join_set = JoinSet::new();
        for id in 0..n {
            let thread = ThinkingThread::new(id, Arc::clone(&self.client), config.clone());
            let work_token = work_token.clone();
            let base_messages = base_messages.clone();
            let question = question.clone();

            join_set.spawn(async move {
                thread.run(&work_token, &base_messages, &question).await
            });
        }

        let (states, deadline_hit) = self
            .collect_threads(&mut join_set, &work_token, config.limits().request_deadline)
            .await;

        if token.is_cancelled() {
            info!("Ensemble cancelled by caller, discarding {} threads", states.len());
            return Err(RunEnsembleError::Cancelled);
        }

        let completed: Vec<&ThreadState> = states.iter().filter(|s| s.is_completed()).collect();
        for state in states.iter().filter(|s| !s.is_completed()) {
            warn!(
                "Thread {} failed: {}",
                state.id,
                state.failure.as_deref().unwrap_or("unknown")
            );
        }

        if completed.is_empty() {
            return Err(if deadline_hit {
                RunEnsembleError::DeadlineExceeded
            } else {
                RunEnsembleError::AllThreadsFailed
            });
        }

        let fusion = ThreadFusion::new(
            Arc::clone(&self.client),
            config.roles().fusion.clone(),
            config.fusion().clone(),
        );
        let content = fusion.fuse(&work_token, &question, &completed).await;

        let meta = UsageMeta {
            threads_completed: completed.len(),
            threads_failed: n - completed.len(),
            flagged_steps: completed.iter().map(|t| t.flagged_steps()).sum(),
        };
        info!(
            "Ensemble complete: {}/{} threads, {} flagged steps, {} bytes",
            meta.threads_completed,
            n,
            meta.flagged_steps,
            content.len()
        );

        Ok(FinalAnswer::new(content, meta))
    }

    /// Execute the pipeline, emitting the answer as chunk events
    /// followed by a completion event.
    ///
    /// Dropping the receiver cancels the run.
    pub fn execute_stream(
        &self,
        input: RunEnsembleInput,
        token: CancellationToken,
    ) -> mpsc::Receiver<AnswerEvent> {
        let (tx, rx) = mpsc::channel(32);
        let this = self.clone();

        tokio::spawn(async move {
            let chunk_bytes = this
                .config
                .effective(&input.overrides)
                .limits()
                .stream_chunk_bytes;

            // Race the pipeline against receiver drop: a caller that
            // disconnects mid-run must cancel the in-flight work now,
            // not after the answer is computed.
            let result = tokio::select! {
                biased;
                _ = tx.closed() => {
                    token.cancel();
                    return;
                }
                result = this.execute(input, &token) => result,
            };

            match result {
                Ok(answer) => {
                    for chunk in chunk_text(&answer.content, chunk_bytes) {
                        if tx.send(AnswerEvent::Chunk(chunk.to_string())).await.is_err() {
                            // Receiver is gone: the caller disconnected
                            token.cancel();
                            return;
                        }
                    }
                    let _ = tx.send(AnswerEvent::Completed(answer)).await;
                }
                Err(e) => {
                    let _ = tx.send(AnswerEvent::Failed(e)).await;
                }
            }
        });

        rx
    }

    /// Wait for every thread to terminate, enforcing the deadline.
    ///
    /// On deadline the work token is cancelled and the remaining threads
    /// drain promptly; whatever completed before the deadline is kept
    /// for best-effort fusion.
    async fn collect_threads(
        &self,
        join_set: &mut JoinSet<ThreadState>,
        work_token: &CancellationToken,
        deadline: Option<std::time::Duration>,
    ) -> (Vec<ThreadState>, bool) {
        let mut states = Vec::new();
        let mut deadline_hit = false;

        if let Some(deadline) = deadline {
            let sleep = tokio::time::sleep(deadline);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    _ = &mut sleep, if !deadline_hit => {
                        warn!("Request deadline elapsed, cancelling in-flight threads");
                        deadline_hit = true;
                        work_token.cancel();
                    }
                    result = join_set.join_next() => {
                        match result {
                            None => break,
                            Some(Ok(state)) => states.push(state),
                            Some(Err(e)) => warn!("Thread task join error: {}", e),
                        }
                    }
                }
            }
        } else {
            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok(state) => states.push(state),
                    Err(e) => warn!("Thread task join error: {}", e),
                }
            }
        }

        (states, deadline_hit)
    }
}
