//! Record normalization
//!
//! The document store enforces no schema, so every document read back must be
//! coerced into a typed record without ever failing: missing or mistyped
//! numeric fields become 0, strings become empty (or the `Unknown` sentinel
//! for enums), and missing arrays become empty sequences. Both snake_case and
//! the legacy camelCase field names used by the hosted store are accepted.

use crate::types::{MockTestRecord, RevisionRecord, SessionKind, Subject, SubjectDetail};
use serde_json::Value;
use std::str::FromStr;

/// Look up the first present field among the given names.
fn field<'a>(doc: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let obj = doc.as_object()?;
    names.iter().find_map(|name| obj.get(*name))
}

/// Coerce a field to a string, defaulting to empty.
fn string_field(doc: &Value, names: &[&str]) -> String {
    match field(doc, names) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Coerce a field to a non-negative f64, defaulting to 0.
///
/// Numeric strings are accepted; anything else (booleans, objects, negative
/// values, NaN) normalizes to 0.
fn number_field(doc: &Value, names: &[&str]) -> f64 {
    let value = match field(doc, names) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Like [`number_field`] but truncated to a count.
fn count_field(doc: &Value, names: &[&str]) -> u32 {
    number_field(doc, names).min(u32::MAX as f64) as u32
}

/// A numeric field that distinguishes "absent" from "zero".
fn optional_number_field(doc: &Value, names: &[&str]) -> Option<f64> {
    field(doc, names)?;
    Some(number_field(doc, names))
}

fn subject_field(doc: &Value, names: &[&str]) -> Subject {
    Subject::from_str(&string_field(doc, names)).unwrap_or(Subject::Unknown)
}

/// Coerce a raw document into a [`RevisionRecord`].
///
/// Never fails; malformed input degrades to zeros and sentinels. An
/// inconsistent pair with `num_correct > num_questions` is clamped so the
/// per-session accuracy stays within bounds.
pub fn revision_from_document(doc: &Value) -> RevisionRecord {
    let num_questions = count_field(doc, &["num_questions", "numQuestions"]);
    let num_correct = count_field(doc, &["num_correct", "numCorrect"]).min(num_questions);

    RevisionRecord {
        date: string_field(doc, &["date"]),
        subject: subject_field(doc, &["subject"]),
        kind: SessionKind::from_str(&string_field(doc, &["kind", "type"]))
            .unwrap_or(SessionKind::Other),
        num_questions,
        num_correct,
        time_spent_minutes: optional_number_field(
            doc,
            &["time_spent_minutes", "timeSpentMinutes", "timeSpent"],
        ),
        remarks: string_field(doc, &["remarks"]),
        weak_topics: string_field(doc, &["weak_topics", "weakTopics"]),
    }
}

/// Coerce one per-subject breakdown entry.
fn subject_detail_from_document(doc: &Value) -> SubjectDetail {
    SubjectDetail {
        subject: subject_field(doc, &["subject"]),
        score: number_field(doc, &["score"]),
        correct: count_field(doc, &["correct"]),
        wrong: count_field(doc, &["wrong"]),
        unattempted: count_field(doc, &["unattempted"]),
        total_marks: optional_number_field(doc, &["total_marks", "totalMarks"]),
        gained_marks: optional_number_field(doc, &["gained_marks", "gainedMarks"]),
        lost_marks: optional_number_field(doc, &["lost_marks", "lostMarks"]),
    }
}

/// Coerce a raw document into a [`MockTestRecord`].
///
/// Never fails. A missing `subject_details` array normalizes to an empty
/// sequence; `total_correct + total_incorrect` is clamped to
/// `total_questions` to keep the attempt invariant.
pub fn mock_test_from_document(doc: &Value) -> MockTestRecord {
    let total_questions = count_field(doc, &["total_questions", "totalQuestions"]);
    let total_correct = count_field(doc, &["total_correct", "totalCorrect"]).min(total_questions);
    let total_incorrect = count_field(doc, &["total_incorrect", "totalIncorrect"])
        .min(total_questions - total_correct);

    let subject_details = field(doc, &["subject_details", "subjectDetails"])
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(subject_detail_from_document).collect())
        .unwrap_or_default();

    MockTestRecord {
        date: string_field(doc, &["date"]),
        provider: string_field(doc, &["provider"]),
        test_type: string_field(doc, &["test_type", "testType"]),
        test_name: string_field(doc, &["test_name", "testName"]),
        total_score: number_field(doc, &["total_score", "totalScore"]),
        total_marks: number_field(doc, &["total_marks", "totalMarks"]),
        total_questions,
        total_correct,
        total_incorrect,
        subject_details,
    }
}
