//! Topic extraction and weakness scoring
//!
//! Scans the free-text `remarks` and `weak_topics` of revision records for
//! topic phrases, aggregates per-topic accuracy across the sessions that
//! mention them, and ranks topics by a composite concern score. The
//! thresholds here are policy, not algorithmic invariants; each one is a
//! named constant and overridable through [`TopicConfig`].

use crate::types::{ConcernLevel, RevisionRecord, Subject, TopicAnalysis, Trend};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Minimum sessions a phrase must appear in to be retained as a candidate.
pub const DEFAULT_MIN_SESSIONS: usize = 1;
/// Margin (accuracy points) between half-means before a trend is declared.
pub const DEFAULT_TREND_MARGIN: f64 = 5.0;
/// Accuracy stddev is scaled by this before inversion into a 0-100 score.
pub const DEFAULT_CONSISTENCY_SCALE: f64 = 2.5;
/// Average accuracy below this is high concern outright.
pub const HIGH_CONCERN_ACCURACY: f64 = 50.0;
/// Average accuracy below this (but above the high cutoff) is medium concern.
pub const MEDIUM_CONCERN_ACCURACY: f64 = 70.0;
/// Consistency below this, combined with a declining trend, is high concern.
pub const LOW_CONSISTENCY_CUTOFF: f64 = 40.0;
/// Ranking penalty budget for topics with few sessions.
pub const LOW_ATTEMPT_PENALTY: f64 = 10.0;

/// Maximum length of a retained phrase; longer segments are prose, not topics.
const MAX_PHRASE_LEN: usize = 60;
const MIN_PHRASE_LEN: usize = 3;

/// Filler segments that are not topics.
const STOPWORDS: &[&str] = &[
    "none", "nothing", "nil", "na", "n/a", "ok", "okay", "good", "fine", "done", "easy", "hard",
    "tough", "all good", "went well", "revised",
];

/// Tunable thresholds for topic scoring.
#[derive(Debug, Clone)]
pub struct TopicConfig {
    /// Phrases in fewer sessions than this are dropped
    pub min_sessions: usize,
    /// Accuracy-point margin for trend classification
    pub trend_margin: f64,
    /// Stddev-to-score scale for the consistency computation
    pub consistency_scale: f64,
    /// High-concern accuracy cutoff
    pub high_accuracy_cutoff: f64,
    /// Medium-concern accuracy cutoff
    pub medium_accuracy_cutoff: f64,
    /// Consistency floor under which a declining trend escalates concern
    pub low_consistency_cutoff: f64,
    /// Ranking penalty budget applied to low-session topics
    pub low_attempt_penalty: f64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            min_sessions: DEFAULT_MIN_SESSIONS,
            trend_margin: DEFAULT_TREND_MARGIN,
            consistency_scale: DEFAULT_CONSISTENCY_SCALE,
            high_accuracy_cutoff: HIGH_CONCERN_ACCURACY,
            medium_accuracy_cutoff: MEDIUM_CONCERN_ACCURACY,
            low_consistency_cutoff: LOW_CONSISTENCY_CUTOFF,
            low_attempt_penalty: LOW_ATTEMPT_PENALTY,
        }
    }
}

/// One session's contribution to a topic.
#[derive(Debug, Clone)]
struct TopicMention {
    date: Option<NaiveDate>,
    subject: Subject,
    accuracy: f64,
}

/// Extract candidate topic phrases from one record's free text.
///
/// Phrases are comma/semicolon/period/newline-delimited segments, lowercased
/// and whitespace-collapsed. Filler words and over-long prose segments are
/// dropped. Duplicates within a record collapse to one mention.
fn extract_phrases(record: &RevisionRecord) -> Vec<String> {
    let mut phrases = Vec::new();

    for text in [&record.remarks, &record.weak_topics] {
        for segment in text.split(|c| matches!(c, ',' | ';' | '.' | '\n')) {
            let phrase = segment
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();

            if phrase.len() < MIN_PHRASE_LEN || phrase.len() > MAX_PHRASE_LEN {
                continue;
            }
            if !phrase.chars().any(|c| c.is_alphabetic()) {
                continue;
            }
            if STOPWORDS.contains(&phrase.as_str()) {
                continue;
            }
            if !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
        }
    }

    phrases
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation.
fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Recent-half mean vs earlier-half mean, with the configured margin.
/// For an odd session count the middle session counts as recent.
fn classify_trend(accuracies: &[f64], margin: f64) -> Trend {
    if accuracies.len() < 2 {
        return Trend::Stable;
    }

    let split = accuracies.len() / 2;
    let earlier = mean(&accuracies[..split]);
    let recent = mean(&accuracies[split..]);

    if recent > earlier + margin {
        Trend::Improving
    } else if recent < earlier - margin {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn classify_concern(
    average_accuracy: f64,
    consistency: f64,
    trend: Trend,
    config: &TopicConfig,
) -> ConcernLevel {
    if average_accuracy < config.high_accuracy_cutoff
        || (trend == Trend::Declining && consistency < config.low_consistency_cutoff)
    {
        ConcernLevel::High
    } else if average_accuracy < config.medium_accuracy_cutoff {
        ConcernLevel::Medium
    } else {
        ConcernLevel::Low
    }
}

fn topic_insights(analysis: &TopicAnalysis) -> Vec<String> {
    let mut insights = Vec::new();

    match analysis.trend {
        Trend::Declining => insights.push("accuracy is dropping in recent sessions".to_string()),
        Trend::Improving => insights.push("accuracy is recovering in recent sessions".to_string()),
        Trend::Stable => {}
    }
    if analysis.consistency_score < LOW_CONSISTENCY_CUTOFF {
        insights.push("performance swings heavily between sessions".to_string());
    }
    if analysis.total_sessions == 1 {
        insights.push("only one logged session so far".to_string());
    }
    if analysis.average_accuracy < HIGH_CONCERN_ACCURACY {
        insights.push(format!(
            "average accuracy {:.0}% is below the 50% floor",
            analysis.average_accuracy
        ));
    }

    insights
}

/// Analyze topics across the full record set and rank them by concern.
///
/// The result is deterministic for a given input set: sessions are ordered
/// chronologically before trend analysis and ties in the concern score break
/// on the topic phrase, so repeated runs produce identical rankings.
pub fn analyze_topics(records: &[RevisionRecord], config: &TopicConfig) -> Vec<TopicAnalysis> {
    let mut mentions: HashMap<String, Vec<TopicMention>> = HashMap::new();

    for record in records {
        for phrase in extract_phrases(record) {
            mentions.entry(phrase).or_default().push(TopicMention {
                date: record.parsed_date(),
                subject: record.subject,
                accuracy: record.accuracy(),
            });
        }
    }

    let mut analyses: Vec<TopicAnalysis> = mentions
        .into_iter()
        .filter(|(_, sessions)| sessions.len() >= config.min_sessions.max(1))
        .map(|(topic, mut sessions)| {
            // Stable sort keeps input order for undated sessions.
            sessions.sort_by_key(|m| m.date);

            let accuracies: Vec<f64> = sessions.iter().map(|m| m.accuracy).collect();
            let average_accuracy = mean(&accuracies);
            let consistency_score =
                (100.0 - stddev(&accuracies) * config.consistency_scale).clamp(0.0, 100.0);
            let trend = classify_trend(&accuracies, config.trend_margin);
            let concern_level = classify_concern(average_accuracy, consistency_score, trend, config);

            // Topics seen only once or twice rank below equally-weak topics
            // with more evidence behind them.
            let attempt_penalty = config.low_attempt_penalty / sessions.len() as f64;
            let concern_score = (100.0 - average_accuracy) - attempt_penalty;

            let mut subjects: Vec<Subject> = sessions.iter().map(|m| m.subject).collect();
            subjects.sort();
            subjects.dedup();

            let mut analysis = TopicAnalysis {
                topic,
                subjects,
                total_sessions: sessions.len(),
                average_accuracy,
                consistency_score,
                trend,
                concern_level,
                concern_score,
                insights: Vec::new(),
            };
            analysis.insights = topic_insights(&analysis);
            analysis
        })
        .collect();

    analyses.sort_by(|a, b| {
        b.concern_score
            .total_cmp(&a.concern_score)
            .then_with(|| a.topic.cmp(&b.topic))
    });

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionKind;

    fn record(date: &str, questions: u32, correct: u32, remarks: &str) -> RevisionRecord {
        RevisionRecord {
            date: date.to_string(),
            subject: Subject::Physics,
            kind: SessionKind::Practice,
            num_questions: questions,
            num_correct: correct,
            time_spent_minutes: None,
            remarks: remarks.to_string(),
            weak_topics: String::new(),
        }
    }

    #[test]
    fn test_phrase_extraction_filters_filler() {
        let r = record(
            "2025-01-06",
            10,
            5,
            "Rotational motion, none, ok, torque and angular momentum",
        );
        let phrases = extract_phrases(&r);
        assert_eq!(
            phrases,
            vec![
                "rotational motion".to_string(),
                "torque and angular momentum".to_string()
            ]
        );
    }

    #[test]
    fn test_phrase_extraction_merges_weak_topics_field() {
        let mut r = record("2025-01-06", 10, 5, "thermodynamics");
        r.weak_topics = "thermodynamics; carnot cycle".to_string();
        let phrases = extract_phrases(&r);
        // Duplicate across the two fields collapses to one mention
        assert_eq!(
            phrases,
            vec!["thermodynamics".to_string(), "carnot cycle".to_string()]
        );
    }

    #[test]
    fn test_declining_trend_escalates_concern() {
        // Accuracies 90, 85, 40, 35 chronologically
        let records = vec![
            record("2025-01-01", 20, 18, "optics"),
            record("2025-01-08", 20, 17, "optics"),
            record("2025-01-15", 20, 8, "optics"),
            record("2025-01-22", 20, 7, "optics"),
        ];

        let analyses = analyze_topics(&records, &TopicConfig::default());
        assert_eq!(analyses.len(), 1);
        let optics = &analyses[0];
        assert_eq!(optics.trend, Trend::Declining);
        assert_eq!(optics.concern_level, ConcernLevel::High);
        assert_eq!(optics.total_sessions, 4);
    }

    #[test]
    fn test_consistent_topic_scores_high_consistency() {
        let records = vec![
            record("2025-01-01", 10, 8, "vectors"),
            record("2025-01-08", 10, 8, "vectors"),
            record("2025-01-15", 10, 8, "vectors"),
        ];

        let analyses = analyze_topics(&records, &TopicConfig::default());
        assert_eq!(analyses[0].consistency_score, 100.0);
        assert_eq!(analyses[0].trend, Trend::Stable);
        assert_eq!(analyses[0].concern_level, ConcernLevel::Low);
    }

    #[test]
    fn test_min_sessions_threshold_drops_one_offs() {
        let records = vec![
            record("2025-01-01", 10, 2, "electrostatics"),
            record("2025-01-08", 10, 2, "electrostatics"),
            record("2025-01-09", 10, 2, "one off remark"),
        ];

        let config = TopicConfig {
            min_sessions: 2,
            ..TopicConfig::default()
        };
        let analyses = analyze_topics(&records, &config);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].topic, "electrostatics");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        // Two topics with identical stats must tie-break lexicographically.
        let records = vec![
            record("2025-01-01", 10, 4, "beta topic"),
            record("2025-01-01", 10, 4, "alpha topic"),
        ];

        let first = analyze_topics(&records, &TopicConfig::default());
        let second = analyze_topics(&records, &TopicConfig::default());

        let order: Vec<&str> = first.iter().map(|a| a.topic.as_str()).collect();
        assert_eq!(order, vec!["alpha topic", "beta topic"]);
        assert_eq!(
            order,
            second.iter().map(|a| a.topic.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_more_evidence_ranks_above_one_off_at_equal_accuracy() {
        let records = vec![
            record("2025-01-01", 10, 4, "repeated weakness"),
            record("2025-01-08", 10, 4, "repeated weakness"),
            record("2025-01-09", 10, 4, "single mention"),
        ];

        let analyses = analyze_topics(&records, &TopicConfig::default());
        assert_eq!(analyses[0].topic, "repeated weakness");
        assert!(analyses[0].concern_score > analyses[1].concern_score);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(analyze_topics(&[], &TopicConfig::default()).is_empty());
    }
}
