//! Core domain types for studytrail
//!
//! Two kinds of records are logged and persisted: revision sessions and
//! mock-test attempts. Everything else in this module is derived: the
//! analytics pipeline recomputes aggregates, topic analyses, and progress
//! series from the full record set on every pass and never stores them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **RevisionRecord** | One logged study session (questions attempted + correct) |
//! | **MockTestRecord** | One logged mock exam attempt with per-subject breakdown |
//! | **Bucket** | A grouping key: a day, an ISO week, a month, a subject, or a session kind |
//! | **Accuracy** | correct / attempted, as a percentage in [0, 100] |
//! | **Efficiency** | attempted questions per hour of recorded study time |
//! | **Concern level** | Categorical severity assigned to a weak topic |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================
// Subjects
// ============================================

/// Academic subjects tracked by the logger.
///
/// `Unknown` is the normalization sentinel: documents with a missing or
/// unrecognized subject land here instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    English,
    Reasoning,
    GeneralKnowledge,
    Unknown,
}

impl Subject {
    /// Returns the display name for this subject
    pub fn display_name(&self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::English => "English",
            Subject::Reasoning => "Reasoning",
            Subject::GeneralKnowledge => "General Knowledge",
            Subject::Unknown => "Unknown",
        }
    }

    /// Returns the identifier used in document storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Mathematics => "mathematics",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::English => "english",
            Subject::Reasoning => "reasoning",
            Subject::GeneralKnowledge => "general_knowledge",
            Subject::Unknown => "unknown",
        }
    }

    /// All concrete subjects, in display order (excludes `Unknown`).
    pub fn all() -> &'static [Subject] {
        &[
            Subject::Mathematics,
            Subject::Physics,
            Subject::Chemistry,
            Subject::Biology,
            Subject::English,
            Subject::Reasoning,
            Subject::GeneralKnowledge,
        ]
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mathematics" | "maths" | "math" => Ok(Subject::Mathematics),
            "physics" => Ok(Subject::Physics),
            "chemistry" => Ok(Subject::Chemistry),
            "biology" => Ok(Subject::Biology),
            "english" => Ok(Subject::English),
            "reasoning" => Ok(Subject::Reasoning),
            "general_knowledge" | "general knowledge" | "gk" => Ok(Subject::GeneralKnowledge),
            "unknown" => Ok(Subject::Unknown),
            _ => Err(format!("unknown subject: {}", s)),
        }
    }
}

// ============================================
// Session kinds
// ============================================

/// Categorical tag for a revision session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Practice question set
    Practice,
    /// Past-year question paper
    PastYear,
    /// Mock test logged through the revision form
    MockTest,
    /// Anything else
    Other,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Practice => "practice",
            SessionKind::PastYear => "past_year",
            SessionKind::MockTest => "mock_test",
            SessionKind::Other => "other",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "practice" | "practice_set" | "practice set" => Ok(SessionKind::Practice),
            "past_year" | "pyq" | "past-year-question" | "past year" => Ok(SessionKind::PastYear),
            "mock_test" | "mock" | "mock test" | "mocktest" => Ok(SessionKind::MockTest),
            "other" => Ok(SessionKind::Other),
            _ => Err(format!("unknown session kind: {}", s)),
        }
    }
}

// ============================================
// Logged records
// ============================================

/// One logged study session.
///
/// Created once by the logging form and immutable thereafter; persisted as a
/// single document in the `revisions` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Calendar date (`YYYY-MM-DD`), the bucketing key. Kept as a string;
    /// unparseable dates are tolerated (skipped by time-bucketed views).
    pub date: String,
    /// Subject this session covered
    pub subject: Subject,
    /// What kind of session this was
    pub kind: SessionKind,
    /// Questions attempted
    pub num_questions: u32,
    /// Questions answered correctly (`num_correct <= num_questions`)
    pub num_correct: u32,
    /// Minutes spent, if recorded
    pub time_spent_minutes: Option<f64>,
    /// Free-text remarks, source material for topic extraction
    pub remarks: String,
    /// Free-text weak-topic notes, also fed to topic extraction
    pub weak_topics: String,
}

impl RevisionRecord {
    /// Per-session accuracy percentage; 0 when nothing was attempted.
    pub fn accuracy(&self) -> f64 {
        if self.num_questions == 0 {
            0.0
        } else {
            self.num_correct as f64 / self.num_questions as f64 * 100.0
        }
    }

    /// Parse the date string, if well-formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Per-subject breakdown entry inside a mock-test attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectDetail {
    /// Subject of this section
    pub subject: Subject,
    /// Section score (0 when the provider did not report marks)
    pub score: f64,
    /// Correct answers
    pub correct: u32,
    /// Wrong answers
    pub wrong: u32,
    /// Questions left unattempted
    pub unattempted: u32,
    /// Maximum marks for this section, if reported
    pub total_marks: Option<f64>,
    /// Marks gained, if reported
    pub gained_marks: Option<f64>,
    /// Marks lost to negative marking, if reported
    pub lost_marks: Option<f64>,
}

impl SubjectDetail {
    /// Section accuracy from attempted questions only; 0 when none attempted.
    /// Independent of the optional marks fields.
    pub fn accuracy(&self) -> f64 {
        let attempted = self.correct + self.wrong;
        if attempted == 0 {
            0.0
        } else {
            self.correct as f64 / attempted as f64 * 100.0
        }
    }
}

/// One logged mock exam attempt.
///
/// Same lifecycle as [`RevisionRecord`]: created on submission, immutable,
/// one document per attempt in the `mockTest` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockTestRecord {
    /// Calendar date (`YYYY-MM-DD`)
    pub date: String,
    /// Test provider/coaching name
    pub provider: String,
    /// Provider's test category (full syllabus, sectional, ...)
    pub test_type: String,
    /// Display name of the test
    pub test_name: String,
    /// Overall score
    pub total_score: f64,
    /// Maximum marks
    pub total_marks: f64,
    /// Total questions in the paper
    pub total_questions: u32,
    /// Correct answers (`total_correct + total_incorrect <= total_questions`)
    pub total_correct: u32,
    /// Incorrect answers
    pub total_incorrect: u32,
    /// Ordered per-subject breakdown
    pub subject_details: Vec<SubjectDetail>,
}

impl MockTestRecord {
    /// Parse the date string, if well-formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

// ============================================
// Derived analytics types (never persisted)
// ============================================

/// Summary statistics for one group of records.
///
/// Invariants maintained by the aggregator:
/// `total_wrong == total_questions - total_correct` and
/// `accuracy` is in `[0, 100]`, exactly 0 when `total_questions == 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedGroup {
    /// Total questions attempted across the group
    pub total_questions: u64,
    /// Total correct answers across the group
    pub total_correct: u64,
    /// Always derived as `total_questions - total_correct`
    pub total_wrong: u64,
    /// Group accuracy percentage
    pub accuracy: f64,
    /// Number of contributing records
    pub attempts: usize,
}

/// Time-spent summary for a group of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSummary {
    /// Total recorded minutes
    pub total_minutes: f64,
    /// Total questions attempted
    pub total_questions: u64,
    /// Questions per hour; 0 when no time was recorded
    pub efficiency: f64,
}

/// One point of a time-bucketed progress series.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressPoint {
    /// Bucket key (day, `{year}-W{week}`, or `{year}-{month}`)
    pub bucket: String,
    /// Aggregate over the records in this bucket
    pub group: AggregatedGroup,
    /// Total recorded minutes in this bucket
    pub total_minutes: f64,
}

/// Direction of a topic's accuracy over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categorical severity assigned to a weak topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernLevel {
    Low,
    Medium,
    High,
}

impl ConcernLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcernLevel::Low => "low",
            ConcernLevel::Medium => "medium",
            ConcernLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ConcernLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived analysis of one topic phrase, recomputed each analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct TopicAnalysis {
    /// Normalized topic phrase
    pub topic: String,
    /// Subjects whose sessions mention this topic, sorted and deduplicated
    pub subjects: Vec<Subject>,
    /// Number of sessions that reference the topic
    pub total_sessions: usize,
    /// Mean of per-session accuracy across referencing sessions
    pub average_accuracy: f64,
    /// 0-100; higher means lower variance across sessions
    pub consistency_score: f64,
    /// Recent-half vs earlier-half accuracy comparison
    pub trend: Trend,
    /// Severity bucket from the scoring policy
    pub concern_level: ConcernLevel,
    /// Composite score used for ranking (higher = more concerning)
    pub concern_score: f64,
    /// Human-readable observations about this topic
    pub insights: Vec<String>,
}
