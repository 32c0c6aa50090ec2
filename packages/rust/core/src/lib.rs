//! Matching and ranking for Prospector.
//!
//! This crate merges normalized company records across sources, removes near
//! duplicates, scores candidates against an ICP, and ties it all together in
//! the [`SearchPipeline`].

pub mod dedupe;
pub mod filter;
pub mod merge;
pub mod pipeline;
pub mod scoring;

pub use dedupe::{
    DEFAULT_COMPANY_THRESHOLD, DEFAULT_CONTACT_THRESHOLD, dedupe_companies, dedupe_contacts,
    normalize_email, similarity,
};
pub use filter::{ConfidenceTier, ResultFilter, UNKNOWN_INDUSTRY};
pub use merge::{MergeKey, merge_companies};
pub use pipeline::{
    PipelineState, PipelineStats, ProgressReporter, SearchOutcome, SearchPipeline,
    SilentProgress, filter_by_confidence, rank_and_limit,
};
pub use scoring::{ScoreBreakdown, explain, range_fit, score, score_breakdown};
