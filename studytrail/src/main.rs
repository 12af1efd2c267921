//! studytrail - personal study-progress tracker
//!
//! Log revision sessions and mock-test attempts, then render analytics over
//! them: subject accuracy, progress trends, weak-topic rankings, CSV export,
//! and AI study recommendations.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde_json::json;
use studytrail_core::analytics::{
    analyze_topics, generate_insights, progress_series, subject_aggregates, BucketMode,
};
use studytrail_core::chat::{build_insight_prompt, ChatClient};
use studytrail_core::db::{COLLECTION_MOCK_TESTS, COLLECTION_REVISIONS};
use studytrail_core::export::{export_filename, revisions_to_csv};
use studytrail_core::normalize::revision_from_document;
use studytrail_core::{Config, Database, RevisionRecord, SessionKind, SortDirection, Subject};

#[derive(Parser)]
#[command(name = "studytrail")]
#[command(about = "Track study progress and surface weak topics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log a revision session
    Log {
        /// Subject studied (e.g., physics, mathematics)
        #[arg(short, long)]
        subject: String,

        /// Session kind: practice, past_year, mock_test, other
        #[arg(short, long, default_value = "practice")]
        kind: String,

        /// Questions attempted
        #[arg(short = 'q', long)]
        questions: u32,

        /// Questions answered correctly
        #[arg(short = 'c', long)]
        correct: u32,

        /// Session date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Minutes spent
        #[arg(short, long)]
        minutes: Option<f64>,

        /// Free-text remarks (topics covered, observations)
        #[arg(short, long, default_value = "")]
        remarks: String,

        /// Topics that felt weak this session
        #[arg(short, long, default_value = "")]
        weak_topics: String,
    },

    /// Log a mock-test attempt from a JSON file
    Mock {
        /// Path to the mock-test document (JSON)
        file: PathBuf,
    },

    /// Show subject aggregates, progress, and insights
    Dashboard {
        /// Bucketing for the progress series: daily, weekly, monthly
        #[arg(short, long, default_value = "weekly")]
        mode: String,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Rank weak topics by concern
    Topics {
        /// Maximum topics to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Export logged revisions as CSV
    Export {
        /// Output path (defaults to a date-stamped file in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask the configured chat endpoint for study recommendations
    Ask {
        /// Extra question or focus to append to the summary
        question: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        studytrail_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open database
    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    match cli.command {
        Command::Log {
            subject,
            kind,
            questions,
            correct,
            date,
            minutes,
            remarks,
            weak_topics,
        } => log_revision(
            &db, &subject, &kind, questions, correct, date, minutes, &remarks, &weak_topics,
        ),
        Command::Mock { file } => log_mock_test(&db, &file),
        Command::Dashboard { mode, format } => {
            show_dashboard(&db, &config, &mode, &format)
        }
        Command::Topics { limit, format } => show_topics(&db, &config, limit, &format),
        Command::Export { output } => export_csv(&db, output),
        Command::Ask { question } => ask(&db, &config, question.as_deref()),
    }
}

fn load_revisions(db: &Database) -> Result<Vec<RevisionRecord>> {
    let records = db
        .list_all(COLLECTION_REVISIONS, "date", SortDirection::Ascending)
        .context("failed to list revisions")?
        .iter()
        .map(revision_from_document)
        .collect();
    Ok(records)
}

#[allow(clippy::too_many_arguments)]
fn log_revision(
    db: &Database,
    subject: &str,
    kind: &str,
    questions: u32,
    correct: u32,
    date: Option<String>,
    minutes: Option<f64>,
    remarks: &str,
    weak_topics: &str,
) -> Result<()> {
    let subject =
        Subject::from_str(subject).map_err(|e| anyhow::anyhow!("{}", e))?;
    let kind = SessionKind::from_str(kind).map_err(|e| anyhow::anyhow!("{}", e))?;

    if correct > questions {
        bail!("correct ({}) cannot exceed questions ({})", correct, questions);
    }

    let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    if chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        bail!("date must be YYYY-MM-DD, got '{}'", date);
    }

    let mut document = json!({
        "date": date,
        "subject": subject.as_str(),
        "kind": kind.as_str(),
        "num_questions": questions,
        "num_correct": correct,
        "remarks": remarks,
        "weak_topics": weak_topics,
    });
    if let Some(minutes) = minutes {
        document["time_spent_minutes"] = json!(minutes);
    }

    let id = db
        .insert(COLLECTION_REVISIONS, &document)
        .context("failed to store revision")?;

    tracing::info!(id = %id, subject = %subject, "Logged revision session");
    println!(
        "Logged {} {} session: {}/{} correct on {}",
        subject.display_name(),
        kind,
        correct,
        questions,
        date
    );
    Ok(())
}

fn log_mock_test(db: &Database, file: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let document: serde_json::Value =
        serde_json::from_str(&content).context("mock-test file is not valid JSON")?;

    let record = studytrail_core::normalize::mock_test_from_document(&document);
    let id = db
        .insert(COLLECTION_MOCK_TESTS, &document)
        .context("failed to store mock test")?;

    tracing::info!(id = %id, "Logged mock test attempt");
    println!(
        "Logged mock test '{}' ({}): {}/{} correct across {} sections",
        record.test_name,
        record.provider,
        record.total_correct,
        record.total_questions,
        record.subject_details.len()
    );
    Ok(())
}

fn show_dashboard(db: &Database, config: &Config, mode: &str, format: &str) -> Result<()> {
    let mode = BucketMode::from_str(mode).map_err(|e| anyhow::anyhow!("{}", e))?;
    let records = load_revisions(db)?;

    if records.is_empty() {
        println!("No revisions logged yet. Run 'studytrail log' first.");
        return Ok(());
    }

    let subjects = subject_aggregates(&records);
    let series = progress_series(&records, mode);
    let insights = generate_insights(&series, &config.analytics.insight_config());

    if format == "json" {
        let output = json!({
            "subjects": subjects
                .iter()
                .map(|(subject, group)| json!({"subject": subject.as_str(), "summary": group}))
                .collect::<Vec<_>>(),
            "series": series,
            "insights": insights,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Subjects:");
    for (subject, group) in &subjects {
        println!(
            "  {:<18} {:>5.1}%  ({}/{} over {} sessions)",
            subject.display_name(),
            group.accuracy,
            group.total_correct,
            group.total_questions,
            group.attempts
        );
    }

    println!("\nProgress ({}):", mode.as_str());
    for point in &series {
        println!(
            "  {:<10} {:>5.1}%  {} questions",
            point.bucket, point.group.accuracy, point.group.total_questions
        );
    }

    if !insights.is_empty() {
        println!("\nInsights:");
        for insight in &insights {
            println!("  - {}", insight);
        }
    }

    Ok(())
}

fn show_topics(db: &Database, config: &Config, limit: usize, format: &str) -> Result<()> {
    let records = load_revisions(db)?;
    let topics = analyze_topics(&records, &config.analytics.topic_config());

    if format == "json" {
        let shown: Vec<_> = topics.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if topics.is_empty() {
        println!("No weak topics detected. Add remarks when logging sessions.");
        return Ok(());
    }

    println!("Weak topics (most concerning first):");
    for topic in topics.iter().take(limit) {
        println!(
            "  [{}] {:<30} {:>5.1}% avg, {} sessions, trend {}",
            topic.concern_level,
            topic.topic,
            topic.average_accuracy,
            topic.total_sessions,
            topic.trend
        );
        for insight in &topic.insights {
            println!("        {}", insight);
        }
    }

    Ok(())
}

fn export_csv(db: &Database, output: Option<PathBuf>) -> Result<()> {
    let records = load_revisions(db)?;
    let csv = revisions_to_csv(&records);

    let path = output
        .unwrap_or_else(|| PathBuf::from(export_filename(Local::now().date_naive())));
    std::fs::write(&path, csv)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

fn ask(db: &Database, config: &Config, question: Option<&str>) -> Result<()> {
    let Some(chat_config) = config.chat.clone() else {
        bail!(
            "no [chat] section in {}; configure a model and API key first",
            Config::config_path().display()
        );
    };

    let mut chat_config = chat_config;
    chat_config.api_key = chat_config.resolved_api_key();

    let records = load_revisions(db)?;
    if records.is_empty() {
        bail!("no revisions logged yet; nothing to summarize");
    }

    let subjects = subject_aggregates(&records);
    let topics = analyze_topics(&records, &config.analytics.topic_config());
    let series = progress_series(&records, BucketMode::Weekly);

    let mut prompt = build_insight_prompt(&subjects, &topics, &series);
    if let Some(question) = question {
        prompt.push_str(&format!("\nStudent's question: {}\n", question));
    }

    let max_tokens = chat_config.max_output_tokens;
    let client = ChatClient::new(chat_config).context("failed to create chat client")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let reply = runtime
        .block_on(client.complete(&prompt, max_tokens))
        .context("chat request failed")?;

    println!("{}", reply.trim());
    Ok(())
}
