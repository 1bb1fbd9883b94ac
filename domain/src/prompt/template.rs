//! Prompt templates for the ensemble pipeline.
//!
//! One template pair (system + user) per model role. The configured
//! termination marker and vote keywords are interpolated so the
//! instructions always match what the parsers expect.

use crate::validation::VoteKeywords;

/// Templates for generating prompts at each pipeline stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for thinking steps.
    ///
    /// Instructs the model to reason one step at a time and to include
    /// `marker` in the step that carries its final answer.
    pub fn thinking_system(marker: &str) -> String {
        format!(
            r#"You are one reasoning thread in an ensemble working on a hard question.
Advance the reasoning by exactly one step per reply. Build on your previous
steps, go deeper rather than repeating yourself, and change approach if the
current one stalls.

When a step contains your final, complete answer, include the marker {}
in that step. Until then, end each step without the marker."#,
            marker
        )
    }

    /// System prompt for counterexample generation
    pub fn counterexample_system() -> &'static str {
        r#"You are an adversarial reviewer. Your task is to find the strongest
counterexample to a piece of reasoning: a concrete case, input, or argument
under which the reasoning fails or its conclusion is wrong.
Attack the reasoning itself, not its style. Be specific and concrete.
If the reasoning is genuinely watertight, construct the nearest case that
would break it and explain why it falls short."#
    }

    /// User prompt for counterexample generation
    pub fn counterexample_user(question: &str, step_text: &str) -> String {
        format!(
            r#"Original question: {}

Reasoning step under review:
{}

Produce your single strongest counterexample to this step."#,
            question, step_text
        )
    }

    /// System prompt for voting.
    ///
    /// The keyword set is interpolated so votes stay machine-parseable.
    pub fn vote_system(keywords: &VoteKeywords) -> String {
        format!(
            r#"You are a judge comparing a reasoning step against counterexamples
raised against it. Decide which side is stronger.

Answer with exactly one verdict word on the first line:
- {} if the reasoning step survives the counterexamples
- {} if at least one counterexample genuinely defeats the step
- ABSTAIN if you cannot tell

Then give a one-paragraph justification."#,
            keywords.main, keywords.counter
        )
    }

    /// User prompt for voting
    pub fn vote_user(question: &str, step_text: &str, counterexamples: &[String]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Reasoning step:
{}

Counterexamples:
"#,
            question, step_text
        );

        for (i, ce) in counterexamples.iter().enumerate() {
            prompt.push_str(&format!("\n--- Counterexample {} ---\n{}\n", i + 1, ce));
        }

        prompt.push_str("\nCast your vote.");
        prompt
    }

    /// System prompt for middle-range summarization
    pub fn summary_system() -> &'static str {
        r#"You compress intermediate reasoning steps into a dense summary.
Preserve every conclusion, constraint, and open question; drop restatements
and dead ends. Write the summary as a single compact passage that a later
step can rely on in place of the original text."#
    }

    /// User prompt for middle-range summarization
    pub fn summary_user(question: &str, middle_bodies: &[String]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Intermediate reasoning steps to compress:
"#,
            question
        );

        for (i, body) in middle_bodies.iter().enumerate() {
            prompt.push_str(&format!("\n--- Step {} ---\n{}\n", i + 1, body));
        }

        prompt.push_str("\nWrite the compressed summary.");
        prompt
    }

    /// System prompt for intelligent fusion
    pub fn fusion_system() -> &'static str {
        r#"You are merging the final answers of several independent reasoning
threads into one coherent answer. Extract the conclusions they share,
integrate insights that only one thread found, and resolve contradictions
by favouring the better-supported position. Answer the original question
directly — do not describe the threads or the merging process."#
    }

    /// User prompt for intelligent fusion.
    ///
    /// `finals` is `(thread_id, final_body)` in ascending thread-id order
    /// so the prompt is reproducible across runs.
    pub fn fusion_user(question: &str, finals: &[(usize, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Final answers from the reasoning threads:
"#,
            question
        );

        for (id, body) in finals {
            prompt.push_str(&format!("\n--- Thread {} ---\n{}\n", id, body));
        }

        prompt.push_str("\nProduce the single merged answer.");
        prompt
    }
}
