//! Deterministic concat fusion.
//!
//! The fallback strategy: join each completed thread's final step body
//! with the configured delimiter, in ascending thread-id order. Cannot
//! fail, which is what makes it a safe landing for intelligent-fusion
//! failures.

use crate::thinking::ThreadState;

/// Join the final bodies of `threads` with `delimiter`.
///
/// Callers pass the completed subset already sorted by thread id; this
/// function sorts defensively anyway so the output is reproducible.
pub fn concat_final_bodies(threads: &[&ThreadState], delimiter: &str) -> String {
    let mut ordered: Vec<&&ThreadState> = threads.iter().collect();
    ordered.sort_by_key(|t| t.id);

    ordered
        .iter()
        .filter_map(|t| t.final_body())
        .collect::<Vec<_>>()
        .join(delimiter)
}
