//! CSV export of the logged record set
//!
//! Fixed column order, every field double-quoted, one record per line. The
//! column names match the hosted store's historical export so spreadsheets
//! built against the old app keep working.

use crate::types::RevisionRecord;
use chrono::NaiveDate;

/// Column order of the export, fixed by contract.
pub const CSV_HEADER: &str = "date,subject,type,totalQuestions,correct,wrong,accuracy,remarks";

/// Quote a field: wrap in double quotes, double any embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Serialize records to CSV in their given order.
pub fn revisions_to_csv(records: &[RevisionRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for record in records {
        let wrong = record.num_questions - record.num_correct.min(record.num_questions);
        let row = [
            quote(&record.date),
            quote(record.subject.display_name()),
            quote(record.kind.as_str()),
            quote(&record.num_questions.to_string()),
            quote(&record.num_correct.to_string()),
            quote(&wrong.to_string()),
            quote(&format!("{:.1}", record.accuracy())),
            quote(&record.remarks),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Export filename stamped with the given date.
pub fn export_filename(date: NaiveDate) -> String {
    format!("studytrail-export-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SessionKind, Subject};

    fn record(remarks: &str) -> RevisionRecord {
        RevisionRecord {
            date: "2025-01-06".to_string(),
            subject: Subject::Physics,
            kind: SessionKind::Practice,
            num_questions: 20,
            num_correct: 15,
            time_spent_minutes: Some(40.0),
            remarks: remarks.to_string(),
            weak_topics: String::new(),
        }
    }

    #[test]
    fn test_header_and_row_shape() {
        let csv = revisions_to_csv(&[record("rotational motion")]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some(r#""2025-01-06","Physics","practice","20","15","5","75.0","rotational motion""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_embedded_quotes_and_commas_escaped() {
        let csv = revisions_to_csv(&[record(r#"tricky "limits", revisit"#)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(r#""tricky ""limits"", revisit""#));
        // Still exactly 8 columns when split on quote-comma-quote boundaries
        assert_eq!(row.matches("\",\"").count(), 7);
    }

    #[test]
    fn test_empty_record_set_is_header_only() {
        let csv = revisions_to_csv(&[]);
        assert_eq!(csv, format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_export_filename_stamped() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(export_filename(date), "studytrail-export-2025-03-09.csv");
    }
}
