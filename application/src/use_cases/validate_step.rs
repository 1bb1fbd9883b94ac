//! Adversarial step validation.
//!
//! Two phases, both fan-out: K parallel counterexample generations, then
//! V parallel votes comparing the step against the counterexamples. The
//! tallied verdict is advisory — it never blocks or interrupts the
//! thread that produced the step.
//!
//! Failure absorption: a failed generator call leaves an empty
//! counterexample entry; a failed vote call abstains. Only when an
//! entire phase fails is the verdict `skipped` — absence of evidence is
//! not evidence of error.

use crate::config::ValidationParams;
use crate::ports::{InvokeOptions, ModelClient};
use crate::use_cases::shared::invoke_cancellable;
use ensemble_domain::{BallotChoice, ChatMessage, PromptTemplate, ValidationVerdict, parse_ballot};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs the counterexample-and-vote pipeline for single steps.
#[derive(Clone)]
pub struct StepValidator {
    client: Arc<dyn ModelClient>,
    counterexample_model: String,
    vote_model: String,
    params: ValidationParams,
    question: String,
}

impl StepValidator {
    pub fn new(
        client: Arc<dyn ModelClient>,
        counterexample_model: impl Into<String>,
        vote_model: impl Into<String>,
        params: ValidationParams,
        question: impl Into<String>,
    ) -> Self {
        Self {
            client,
            counterexample_model: counterexample_model.into(),
            vote_model: vote_model.into(),
            params,
            question: question.into(),
        }
    }

    /// Validate one step body, returning the tallied verdict.
    pub async fn validate(&self, token: &CancellationToken, step_text: &str) -> ValidationVerdict {
        let counterexamples = self.generate_counterexamples(token, step_text).await;

        let Some(counterexamples) = counterexamples else {
            warn!("Every counterexample call failed, skipping verdict");
            return ValidationVerdict::skipped();
        };

        let Some(ballots) = self.collect_ballots(token, step_text, &counterexamples).await else {
            warn!("Every vote call failed, skipping verdict");
            return ValidationVerdict::skipped();
        };

        let verdict = ValidationVerdict::from_ballots(counterexamples, ballots);
        debug!(
            "Verdict {}: {} main / {} counter / {} abstain",
            verdict.outcome,
            verdict.main_votes(),
            verdict.counter_votes(),
            verdict.abstentions()
        );
        verdict
    }

    /// Phase 1: K parallel counterexample generations.
    ///
    /// Returns `None` when every call failed. Individual failures keep
    /// an empty entry so the list length stays K.
    async fn generate_counterexamples(
        &self,
        token: &CancellationToken,
        step_text: &str,
    ) -> Option<Vec<String>> {
        let messages = vec![
            ChatMessage::system(PromptTemplate::counterexample_system()),
            ChatMessage::user(PromptTemplate::counterexample_user(&self.question, step_text)),
        ];

        let mut join_set = JoinSet::new();
        for i in 0..self.params.counterexamples {
            let client = Arc::clone(&self.client);
            let token = token.clone();
            let model = self.counterexample_model.clone();
            let messages = messages.clone();

            join_set.spawn(async move {
                let result = invoke_cancellable(
                    client.as_ref(),
                    &token,
                    &model,
                    &messages,
                    InvokeOptions::default(),
                )
                .await;
                (i, result)
            });
        }

        let mut texts = vec![String::new(); self.params.counterexamples];
        let mut successes = 0;

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((i, Ok(text))) => {
                    texts[i] = text;
                    successes += 1;
                }
                Ok((i, Err(e))) => {
                    debug!("Counterexample {} failed: {}", i, e);
                }
                Err(e) => {
                    warn!("Counterexample task join error: {}", e);
                }
            }
        }

        (successes > 0).then_some(texts)
    }

    /// Phase 2: V parallel votes. Returns `None` when every call failed.
    async fn collect_ballots(
        &self,
        token: &CancellationToken,
        step_text: &str,
        counterexamples: &[String],
    ) -> Option<Vec<BallotChoice>> {
        let messages = vec![
            ChatMessage::system(PromptTemplate::vote_system(&self.params.keywords)),
            ChatMessage::user(PromptTemplate::vote_user(
                &self.question,
                step_text,
                counterexamples,
            )),
        ];

        let mut join_set = JoinSet::new();
        for i in 0..self.params.votes {
            let client = Arc::clone(&self.client);
            let token = token.clone();
            let model = self.vote_model.clone();
            let messages = messages.clone();

            join_set.spawn(async move {
                let result = invoke_cancellable(
                    client.as_ref(),
                    &token,
                    &model,
                    &messages,
                    InvokeOptions::default(),
                )
                .await;
                (i, result)
            });
        }

        let mut ballots = vec![BallotChoice::Abstain; self.params.votes];
        let mut successes = 0;

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((i, Ok(text))) => {
                    ballots[i] = parse_ballot(&text, &self.params.keywords);
                    successes += 1;
                }
                Ok((i, Err(e))) => {
                    debug!("Vote {} failed: {}", i, e);
                }
                Err(e) => {
                    warn!("Vote task join error: {}", e);
                }
            }
        }

        (successes > 0).then_some(ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ModelClientError;
    use async_trait::async_trait;
    use ensemble_domain::VerdictOutcome;

    /// Scripted client that answers per model name.
    struct RoleClient {
        counterexample: Result<String, ModelClientError>,
        vote: Result<String, ModelClientError>,
    }

    impl RoleClient {
        fn new(
            counterexample: Result<&str, ModelClientError>,
            vote: Result<&str, ModelClientError>,
        ) -> Self {
            Self {
                counterexample: counterexample.map(str::to_string),
                vote: vote.map(str::to_string),
            }
        }
    }

    #[async_trait]
    impl ModelClient for RoleClient {
        async fn invoke(
            &self,
            model: &str,
            _messages: &[ChatMessage],
            _options: InvokeOptions,
        ) -> Result<String, ModelClientError> {
            match model {
                "ce" => self.counterexample.clone(),
                "vote" => self.vote.clone(),
                other => panic!("unexpected model {}", other),
            }
        }
    }

    fn validator(client: RoleClient) -> StepValidator {
        StepValidator::new(
            Arc::new(client),
            "ce",
            "vote",
            ValidationParams::default(),
            "the question",
        )
    }

    #[tokio::test]
    async fn test_all_counter_votes_flag_the_step() {
        let v = validator(RoleClient::new(Ok("a flaw"), Ok("COUNTER, because...")));
        let verdict = v.validate(&CancellationToken::new(), "the step").await;
        assert_eq!(verdict.outcome, VerdictOutcome::Flagged);
        assert_eq!(verdict.counter_votes(), 3);
        assert_eq!(verdict.counterexamples.len(), 3);
    }

    #[tokio::test]
    async fn test_all_main_votes_accept_the_step() {
        let v = validator(RoleClient::new(Ok("weak objection"), Ok("MAIN holds up")));
        let verdict = v.validate(&CancellationToken::new(), "the step").await;
        assert_eq!(verdict.outcome, VerdictOutcome::Accepted);
        assert_eq!(verdict.main_votes(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_votes_abstain_and_accept() {
        let v = validator(RoleClient::new(Ok("objection"), Ok("hard to say")));
        let verdict = v.validate(&CancellationToken::new(), "the step").await;
        // 0 main >= 0 counter
        assert_eq!(verdict.outcome, VerdictOutcome::Accepted);
        assert_eq!(verdict.abstentions(), 3);
    }

    #[tokio::test]
    async fn test_all_counterexample_calls_failing_skips() {
        let v = validator(RoleClient::new(
            Err(ModelClientError::Timeout),
            Ok("COUNTER"),
        ));
        let verdict = v.validate(&CancellationToken::new(), "the step").await;
        assert_eq!(verdict.outcome, VerdictOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_all_vote_calls_failing_skips() {
        let v = validator(RoleClient::new(
            Ok("a flaw"),
            Err(ModelClientError::UpstreamUnavailable("down".to_string())),
        ));
        let verdict = v.validate(&CancellationToken::new(), "the step").await;
        assert_eq!(verdict.outcome, VerdictOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_cancelled_validation_skips() {
        let v = validator(RoleClient::new(Ok("a flaw"), Ok("MAIN")));
        let token = CancellationToken::new();
        token.cancel();
        let verdict = v.validate(&token, "the step").await;
        assert_eq!(verdict.outcome, VerdictOutcome::Skipped);
    }
}
