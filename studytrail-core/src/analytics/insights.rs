//! Insight generation
//!
//! Applies independent threshold rules over a time-bucketed progress series
//! and emits human-readable observations. Rules are additive: each one
//! either contributes an observation or stays silent, and an empty series
//! yields an empty list.

use crate::types::ProgressPoint;
use chrono::NaiveDate;

/// Accuracy-point move between the last two buckets worth calling out.
pub const DEFAULT_ACCURACY_DELTA: f64 = 5.0;
/// Target average questions per bucket before volume is flagged as low.
pub const DEFAULT_QUESTION_TARGET: f64 = 30.0;
/// Days without any logged session before a gap is flagged.
pub const DEFAULT_GAP_ALERT_DAYS: i64 = 7;

/// Tunable thresholds for insight rules.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Minimum accuracy swing (points) between the last two buckets
    pub accuracy_delta: f64,
    /// Target average question volume per bucket
    pub question_target: f64,
    /// Gap length (days) that triggers the inactivity observation
    pub gap_alert_days: i64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            accuracy_delta: DEFAULT_ACCURACY_DELTA,
            question_target: DEFAULT_QUESTION_TARGET,
            gap_alert_days: DEFAULT_GAP_ALERT_DAYS,
        }
    }
}

/// Generate observations over a progress series ordered by bucket ascending.
pub fn generate_insights(series: &[ProgressPoint], config: &InsightConfig) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(observation) = accuracy_swing(series, config.accuracy_delta) {
        insights.push(observation);
    }
    if let Some(observation) = low_volume(series, config.question_target) {
        insights.push(observation);
    }
    if let Some(observation) = session_gap(series, config.gap_alert_days) {
        insights.push(observation);
    }

    insights
}

/// Rule: the latest bucket's accuracy moved sharply against the prior one.
fn accuracy_swing(series: &[ProgressPoint], delta: f64) -> Option<String> {
    let [.., prior, latest] = series else {
        return None;
    };

    let change = latest.group.accuracy - prior.group.accuracy;
    if change > delta {
        Some(format!(
            "accuracy improving: {:.1}% in {}, up from {:.1}% in {}",
            latest.group.accuracy, latest.bucket, prior.group.accuracy, prior.bucket
        ))
    } else if change < -delta {
        Some(format!(
            "accuracy declining: {:.1}% in {}, down from {:.1}% in {}",
            latest.group.accuracy, latest.bucket, prior.group.accuracy, prior.bucket
        ))
    } else {
        None
    }
}

/// Rule: average question volume per bucket is below the target.
fn low_volume(series: &[ProgressPoint], target: f64) -> Option<String> {
    if series.is_empty() {
        return None;
    }

    let total: u64 = series.iter().map(|p| p.group.total_questions).sum();
    let average = total as f64 / series.len() as f64;
    if average < target {
        Some(format!(
            "question volume low: averaging {:.0} questions per period against a target of {:.0}",
            average, target
        ))
    } else {
        None
    }
}

/// Rule: a long stretch of the series has no logged sessions.
///
/// Only applies when bucket keys parse as dates (daily series); weekly and
/// monthly keys are not dates and the rule stays silent for them.
fn session_gap(series: &[ProgressPoint], alert_days: i64) -> Option<String> {
    let dates: Vec<NaiveDate> = series
        .iter()
        .filter_map(|p| NaiveDate::parse_from_str(&p.bucket, "%Y-%m-%d").ok())
        .collect();

    let mut worst: Option<(NaiveDate, NaiveDate, i64)> = None;
    for pair in dates.windows(2) {
        let gap = (pair[1] - pair[0]).num_days() - 1;
        if gap >= alert_days && worst.map_or(true, |(_, _, w)| gap > w) {
            worst = Some((pair[0], pair[1], gap));
        }
    }

    worst.map(|(from, to, gap)| {
        format!(
            "gap in study log: {} days with no sessions between {} and {}",
            gap, from, to
        )
    })
}
