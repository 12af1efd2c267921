//! Grouping and time bucketing
//!
//! Partitions normalized records into groups keyed by subject, by session
//! kind, or by a time bucket derived from the record's date. Key order is
//! unspecified; callers sort afterward.

use crate::types::RevisionRecord;
use chrono::Datelike;
use std::collections::HashMap;

/// How records should be partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketMode {
    /// One bucket per calendar date, keyed by the date string verbatim
    Daily,
    /// One bucket per ISO-8601 week, keyed `{week_year}-W{2-digit week}`
    Weekly,
    /// One bucket per calendar month, keyed `{year}-{2-digit month}`
    Monthly,
    /// One bucket per subject
    BySubject,
    /// One bucket per session kind
    ByKind,
}

impl BucketMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketMode::Daily => "daily",
            BucketMode::Weekly => "weekly",
            BucketMode::Monthly => "monthly",
            BucketMode::BySubject => "by_subject",
            BucketMode::ByKind => "by_kind",
        }
    }

    fn is_time_bucketed(&self) -> bool {
        matches!(
            self,
            BucketMode::Daily | BucketMode::Weekly | BucketMode::Monthly
        )
    }
}

impl std::str::FromStr for BucketMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(BucketMode::Daily),
            "weekly" => Ok(BucketMode::Weekly),
            "monthly" => Ok(BucketMode::Monthly),
            "by_subject" | "by-subject" | "subject" => Ok(BucketMode::BySubject),
            "by_kind" | "by-kind" | "by-type" | "kind" | "type" => Ok(BucketMode::ByKind),
            _ => Err(format!("unknown bucket mode: {}", s)),
        }
    }
}

/// Compute the bucket key for a record under the given mode.
///
/// Returns `None` only for time-bucketed modes when the record's date cannot
/// be parsed; subject/kind views always produce a key.
pub fn bucket_key(record: &RevisionRecord, mode: BucketMode) -> Option<String> {
    match mode {
        BucketMode::Daily => record.parsed_date().map(|_| record.date.clone()),
        BucketMode::Weekly => record.parsed_date().map(|date| {
            // ISO week numbering: weeks start Monday, week 1 holds the
            // first Thursday, so the week-year can differ from the
            // calendar year at the boundaries.
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }),
        BucketMode::Monthly => record
            .parsed_date()
            .map(|date| format!("{}-{:02}", date.year(), date.month())),
        BucketMode::BySubject => Some(record.subject.as_str().to_string()),
        BucketMode::ByKind => Some(record.kind.as_str().to_string()),
    }
}

/// Partition records into buckets.
///
/// Records with unparseable dates are skipped in time-bucketed modes but
/// still counted in subject/kind views. Within a bucket, records keep their
/// input order.
pub fn group<'a>(
    records: &'a [RevisionRecord],
    mode: BucketMode,
) -> HashMap<String, Vec<&'a RevisionRecord>> {
    let mut buckets: HashMap<String, Vec<&RevisionRecord>> = HashMap::new();

    for record in records {
        match bucket_key(record, mode) {
            Some(key) => buckets.entry(key).or_default().push(record),
            None => {
                debug_assert!(mode.is_time_bucketed());
                tracing::debug!(
                    date = %record.date,
                    mode = mode.as_str(),
                    "Skipping record with unparseable date"
                );
            }
        }
    }

    buckets
}
