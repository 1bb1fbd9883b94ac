//! Sliding-window compression arithmetic for step context.
//!
//! Pure index math: given how many steps a thread has produced, decide
//! which steps enter the next prompt verbatim and which are collapsed
//! into one summarized message. No I/O here — the summarization call
//! itself happens in the application layer.
//!
//! The window keeps the first step (it frames the problem) and the last
//! two steps (local continuity) verbatim; everything between is lossy.

use crate::session::ChatMessage;
use crate::thinking::Step;
use std::ops::Range;

/// Which steps are summarized and which are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowPlan {
    /// Few enough steps that all of them are sent verbatim.
    Literal { count: usize },
    /// First step verbatim, middle range summarized, last two verbatim.
    Compressed {
        first: usize,
        middle: Range<usize>,
        recent: (usize, usize),
    },
}

/// Plan the context window for the step following `k` existing steps.
pub fn plan_window(k: usize) -> WindowPlan {
    if k < 3 {
        return WindowPlan::Literal { count: k };
    }
    WindowPlan::Compressed {
        first: 0,
        middle: 1..k - 2,
        recent: (k - 2, k - 1),
    }
}

/// Assemble the message list for the next step.
///
/// `summary` must be provided (possibly empty) when the plan is
/// compressed; it replaces the middle range as one merged assistant
/// message, so a compressed window always yields exactly
/// `user_messages.len() + 4` messages.
pub fn assemble(
    user_messages: &[ChatMessage],
    steps: &[Step],
    plan: &WindowPlan,
    summary: Option<&str>,
) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = user_messages.to_vec();

    match plan {
        WindowPlan::Literal { count } => {
            for step in steps.iter().take(*count) {
                messages.push(ChatMessage::assistant(step.body.clone()));
            }
        }
        WindowPlan::Compressed {
            first,
            middle: _,
            recent,
        } => {
            messages.push(ChatMessage::assistant(steps[*first].body.clone()));
            messages.push(ChatMessage::assistant(summary.unwrap_or_default()));
            messages.push(ChatMessage::assistant(steps[recent.0].body.clone()));
            messages.push(ChatMessage::assistant(steps[recent.1].body.clone()));
        }
    }

    messages
}
