//! Group aggregation
//!
//! Reduces a group of records into summary statistics. Wrong counts are
//! always derived as `total_questions - total_correct` rather than summed
//! from input, so the invariant holds even when records carry internally
//! inconsistent counts. All divisions are guarded: a zero denominator yields
//! 0, never NaN.

use crate::analytics::bucket::{group, BucketMode};
use crate::types::{
    AggregatedGroup, MockTestRecord, ProgressPoint, RevisionRecord, Subject, TimeSummary,
};
use std::collections::BTreeMap;

/// Aggregate one group of revision records.
pub fn aggregate<'a, I>(records: I) -> AggregatedGroup
where
    I: IntoIterator<Item = &'a RevisionRecord>,
{
    let mut total_questions: u64 = 0;
    let mut total_correct: u64 = 0;
    let mut attempts = 0usize;

    for record in records {
        total_questions += record.num_questions as u64;
        total_correct += record.num_correct.min(record.num_questions) as u64;
        attempts += 1;
    }

    finish_group(total_questions, total_correct, attempts)
}

fn finish_group(total_questions: u64, total_correct: u64, attempts: usize) -> AggregatedGroup {
    let total_correct = total_correct.min(total_questions);
    let accuracy = if total_questions == 0 {
        0.0
    } else {
        total_correct as f64 / total_questions as f64 * 100.0
    };

    AggregatedGroup {
        total_questions,
        total_correct,
        total_wrong: total_questions - total_correct,
        accuracy,
        attempts,
    }
}

/// Aggregate time spent over a group of revision records.
///
/// Efficiency is questions per hour; 0 when no minutes were recorded.
pub fn time_summary<'a, I>(records: I) -> TimeSummary
where
    I: IntoIterator<Item = &'a RevisionRecord>,
{
    let mut total_minutes = 0.0;
    let mut total_questions: u64 = 0;

    for record in records {
        total_minutes += record.time_spent_minutes.unwrap_or(0.0).max(0.0);
        total_questions += record.num_questions as u64;
    }

    let efficiency = if total_minutes == 0.0 {
        0.0
    } else {
        total_questions as f64 / (total_minutes / 60.0)
    };

    TimeSummary {
        total_minutes,
        total_questions,
        efficiency,
    }
}

/// Build a time-bucketed progress series, sorted ascending by bucket key.
///
/// The daily/weekly/monthly key formats sort chronologically as strings, so
/// lexicographic order is chronological order. Subject/kind modes also work
/// and sort by key name.
pub fn progress_series(records: &[RevisionRecord], mode: BucketMode) -> Vec<ProgressPoint> {
    // BTreeMap gives the ascending, deterministic key order directly.
    let buckets: BTreeMap<String, Vec<&RevisionRecord>> = group(records, mode).into_iter().collect();

    buckets
        .into_iter()
        .map(|(bucket, members)| {
            let summary = time_summary(members.iter().copied());
            ProgressPoint {
                bucket,
                group: aggregate(members),
                total_minutes: summary.total_minutes,
            }
        })
        .collect()
}

/// Per-subject aggregates across revision records, keyed by typed subject.
pub fn subject_aggregates(records: &[RevisionRecord]) -> BTreeMap<Subject, AggregatedGroup> {
    let mut by_subject: BTreeMap<Subject, Vec<&RevisionRecord>> = BTreeMap::new();
    for record in records {
        by_subject.entry(record.subject).or_default().push(record);
    }

    by_subject
        .into_iter()
        .map(|(subject, members)| (subject, aggregate(members)))
        .collect()
}

/// Per-subject aggregates across mock-test attempts.
///
/// Accuracy comes from `correct / (correct + wrong)` per section, independent
/// of the optional marks fields. Unattempted questions are excluded from the
/// denominator by design: a mock section measures accuracy on attempts.
pub fn mock_subject_aggregates(records: &[MockTestRecord]) -> BTreeMap<Subject, AggregatedGroup> {
    let mut totals: BTreeMap<Subject, (u64, u64, usize)> = BTreeMap::new();

    for record in records {
        for detail in &record.subject_details {
            let entry = totals.entry(detail.subject).or_default();
            entry.0 += (detail.correct + detail.wrong) as u64;
            entry.1 += detail.correct as u64;
            entry.2 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(subject, (questions, correct, attempts))| {
            (subject, finish_group(questions, correct, attempts))
        })
        .collect()
}
