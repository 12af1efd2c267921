//! Analytics pipeline for studytrail
//!
//! A chain of pure transformation stages over the logged record set:
//!
//! ```text
//! raw documents -> normalized records -> grouped records
//!               -> aggregated summaries -> insights / weak-topic rankings
//! ```
//!
//! Every stage is a deterministic function of its explicit input; no stage
//! performs I/O, holds state, or mutates a shared store. Degenerate inputs
//! (empty groups, zero denominators, unparseable dates) produce defined
//! zero/empty/skip results rather than errors, so a single malformed record
//! never prevents the rest of a report from rendering.

pub mod aggregate;
pub mod bucket;
pub mod insights;
pub mod topics;

pub use aggregate::{
    aggregate, mock_subject_aggregates, progress_series, subject_aggregates, time_summary,
};
pub use bucket::{group, BucketMode};
pub use insights::{generate_insights, InsightConfig};
pub use topics::{analyze_topics, TopicConfig};
