//! Per-mode system prompts.
//!
//! Prompt wording is deliberately not part of any external contract; only
//! the request/response shapes the other modules build around it are.

use docreview_shared::Mode;

const PRD_REVIEW: &str = "\
You are a senior product manager reviewing a product requirements document.
Assess completeness of goals and non-goals, clarity of user stories,
measurability of success metrics, edge cases, and scope risks.
Write the review as structured Markdown with concrete, actionable feedback.";

const TRD_REVIEW: &str = "\
You are a principal engineer reviewing a technical requirements document.
Assess architecture soundness, interface contracts, failure modes, capacity
and performance assumptions, security posture, and operational concerns.
Write the review as structured Markdown with concrete, actionable feedback.";

const TC_REVIEW: &str = "\
You are a senior QA engineer reviewing a test case document.
Assess coverage against requirements, boundary and negative cases,
reproducibility of steps, clarity of expected results, and data setup.
Write the review as structured Markdown with concrete, actionable feedback.";

/// System prompt used for every oracle call in a run of the given mode.
pub fn prompt_text(mode: Mode) -> &'static str {
    match mode {
        Mode::PrdReview => PRD_REVIEW,
        Mode::TrdReview => TRD_REVIEW,
        Mode::TcReview => TC_REVIEW,
    }
}
