//! Core review pipeline for docreview.
//!
//! Ties together planning, chunking, per-chunk review, coverage tracking,
//! and final synthesis into the end-to-end [`ReviewService::review`] flow.

pub mod chunk;
pub mod coverage;
pub mod finalize;
pub mod plan;
pub mod prompts;
pub mod reviewer;
pub mod service;

pub use chunk::split_chunks;
pub use coverage::CoverageTracker;
pub use plan::{ChecklistItem, PlanOutcome, parse_plan_response};
pub use prompts::prompt_text;
pub use reviewer::{ChunkReview, ReviewOutcome, parse_chunk_response};
pub use service::{CancelSignal, EventSink, NeverCancel, NullSink, ReviewService};
