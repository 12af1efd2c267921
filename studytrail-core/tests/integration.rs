//! End-to-end tests: documents in the store through the full analytics pass.

use serde_json::json;
use studytrail_core::analytics::{
    aggregate, analyze_topics, generate_insights, group, mock_subject_aggregates, progress_series,
    BucketMode, InsightConfig, TopicConfig,
};
use studytrail_core::db::{Database, SortDirection, COLLECTION_MOCK_TESTS, COLLECTION_REVISIONS};
use studytrail_core::normalize::{mock_test_from_document, revision_from_document};
use studytrail_core::{ConcernLevel, RevisionRecord, Subject, Trend};

fn open_db() -> Database {
    studytrail_core::logging::init_test();
    let db = Database::open_in_memory().expect("open in-memory db");
    db.migrate().expect("migrate schema");
    db
}

fn seed_revisions(db: &Database) {
    let documents = [
        json!({"date": "2025-01-06", "subject": "mathematics", "kind": "practice",
               "num_questions": 10, "num_correct": 8, "time_spent_minutes": 30,
               "remarks": "graph algorithms"}),
        json!({"date": "2025-01-07", "subject": "mathematics", "type": "pyq",
               "numQuestions": 20, "numCorrect": 10, "timeSpentMinutes": 60,
               "remarks": "graph algorithms; recursion"}),
        json!({"date": "2025-01-12", "subject": "physics", "kind": "practice",
               "num_questions": 15, "num_correct": 12}),
        // Malformed document: must normalize, never fail
        json!({"date": "garbage", "subject": 42, "num_questions": "many"}),
    ];

    for doc in &documents {
        db.insert(COLLECTION_REVISIONS, doc).expect("insert revision");
    }
}

fn load_revisions(db: &Database) -> Vec<RevisionRecord> {
    db.list_all(COLLECTION_REVISIONS, "date", SortDirection::Ascending)
        .expect("list revisions")
        .iter()
        .map(revision_from_document)
        .collect()
}

#[test]
fn test_store_to_analytics_pass() {
    let db = open_db();
    seed_revisions(&db);

    let records = load_revisions(&db);
    assert_eq!(records.len(), 4);

    // Subject aggregate over the two mathematics sessions (Scenario A shape)
    let by_subject = group(&records, BucketMode::BySubject);
    let maths = aggregate(by_subject.get("mathematics").unwrap().iter().copied());
    assert_eq!(maths.total_questions, 30);
    assert_eq!(maths.total_correct, 18);
    assert_eq!(maths.total_wrong, 12);
    assert_eq!(maths.accuracy, 60.0);

    // The malformed record is visible in subject views but not time views
    let unknown = by_subject.get("unknown").unwrap();
    assert_eq!(unknown.len(), 1);
    let daily = group(&records, BucketMode::Daily);
    assert_eq!(daily.values().map(Vec::len).sum::<usize>(), 3);

    // Weekly view: 2025-01-06 (Monday) and 2025-01-12 (Sunday) share a week
    let weekly = group(&records, BucketMode::Weekly);
    assert_eq!(weekly.get("2025-W02").map(Vec::len), Some(3));
}

#[test]
fn test_accuracy_bounds_hold_for_all_groups() {
    let db = open_db();
    seed_revisions(&db);
    let records = load_revisions(&db);

    for mode in [
        BucketMode::Daily,
        BucketMode::Weekly,
        BucketMode::Monthly,
        BucketMode::BySubject,
        BucketMode::ByKind,
    ] {
        for (key, members) in group(&records, mode) {
            let summary = aggregate(members);
            assert!(
                (0.0..=100.0).contains(&summary.accuracy),
                "accuracy out of bounds for {} under {:?}",
                key,
                mode
            );
            assert_eq!(
                summary.total_wrong,
                summary.total_questions - summary.total_correct
            );
            if summary.total_questions == 0 {
                assert_eq!(summary.accuracy, 0.0);
            }
        }
    }
}

#[test]
fn test_pipeline_is_order_independent() {
    let db = open_db();
    seed_revisions(&db);

    let ascending = load_revisions(&db);
    let mut descending: Vec<RevisionRecord> = db
        .list_all(COLLECTION_REVISIONS, "date", SortDirection::Descending)
        .expect("list revisions")
        .iter()
        .map(revision_from_document)
        .collect();

    let series_a = progress_series(&ascending, BucketMode::Weekly);
    let series_b = progress_series(&descending, BucketMode::Weekly);
    assert_eq!(series_a.len(), series_b.len());
    for (a, b) in series_a.iter().zip(&series_b) {
        assert_eq!(a.bucket, b.bucket);
        assert_eq!(a.group, b.group);
    }

    // Topic rankings are byte-identical regardless of input order
    descending.reverse();
    let topics_a = analyze_topics(&ascending, &TopicConfig::default());
    let topics_b = analyze_topics(&descending, &TopicConfig::default());
    let names_a: Vec<&str> = topics_a.iter().map(|t| t.topic.as_str()).collect();
    let names_b: Vec<&str> = topics_b.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(names_a, names_b);
}

#[test]
fn test_declining_topic_flagged_high_concern() {
    // Accuracies 90, 85, 40, 35 chronologically (Scenario D shape)
    let docs = [
        ("2025-01-01", 18), // 90%
        ("2025-01-08", 17), // 85%
        ("2025-01-15", 8),  // 40%
        ("2025-01-22", 7),  // 35%
    ];

    let db = open_db();
    for (date, correct) in docs {
        db.insert(
            COLLECTION_REVISIONS,
            &json!({"date": date, "subject": "physics", "kind": "practice",
                    "num_questions": 20, "num_correct": correct,
                    "weak_topics": "wave optics"}),
        )
        .expect("insert revision");
    }

    let records = load_revisions(&db);
    let topics = analyze_topics(&records, &TopicConfig::default());
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].topic, "wave optics");
    assert_eq!(topics[0].trend, Trend::Declining);
    assert_eq!(topics[0].concern_level, ConcernLevel::High);
}

#[test]
fn test_mock_test_documents_flow_through() {
    let db = open_db();
    db.insert(
        COLLECTION_MOCK_TESTS,
        &json!({
            "date": "2025-03-01",
            "provider": "TestSeries Co",
            "testType": "full syllabus",
            "testName": "Mock 7",
            "subjectDetails": [
                {"subject": "physics", "correct": 5, "wrong": 5, "unattempted": 0},
                {"subject": "chemistry", "correct": 12, "wrong": 3, "unattempted": 5,
                 "totalMarks": 80, "gainedMarks": 45}
            ]
        }),
    )
    .expect("insert mock test");

    let records: Vec<_> = db
        .list_all(COLLECTION_MOCK_TESTS, "date", SortDirection::Ascending)
        .expect("list mock tests")
        .iter()
        .map(mock_test_from_document)
        .collect();

    let aggregates = mock_subject_aggregates(&records);
    // Scenario E: missing marks default to 0 and accuracy still computes
    assert_eq!(aggregates.get(&Subject::Physics).unwrap().accuracy, 50.0);
    assert_eq!(aggregates.get(&Subject::Chemistry).unwrap().accuracy, 80.0);
}

#[test]
fn test_database_persists_across_reopen() {
    studytrail_core::logging::init_test();
    let dir = tempfile::TempDir::new().expect("create temp dir");
    // Parent directories are created on open
    let path = dir.path().join("nested").join("data.db");

    {
        let db = Database::open(&path).expect("open file-backed db");
        db.migrate().expect("migrate schema");
        db.insert(
            COLLECTION_REVISIONS,
            &json!({"date": "2025-01-06", "subject": "physics", "kind": "practice",
                    "num_questions": 10, "num_correct": 8}),
        )
        .expect("insert revision");
    }

    let db = Database::open(&path).expect("reopen file-backed db");
    db.migrate().expect("migrations idempotent on reopen");
    let records = load_revisions(&db);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject, Subject::Physics);
    assert_eq!(records[0].num_correct, 8);
}

#[test]
fn test_insights_over_stored_series() {
    let db = open_db();
    db.insert(
        COLLECTION_REVISIONS,
        &json!({"date": "2025-01-01", "subject": "physics", "kind": "practice",
                "num_questions": 40, "num_correct": 20}),
    )
    .expect("insert");
    db.insert(
        COLLECTION_REVISIONS,
        &json!({"date": "2025-01-20", "subject": "physics", "kind": "practice",
                "num_questions": 40, "num_correct": 32}),
    )
    .expect("insert");

    let records = load_revisions(&db);
    let series = progress_series(&records, BucketMode::Daily);
    let insights = generate_insights(&series, &InsightConfig::default());

    assert!(insights.iter().any(|s| s.contains("accuracy improving")));
    assert!(insights.iter().any(|s| s.contains("gap in study log")));
}
