//! # studytrail-core
//!
//! Core library for studytrail - a personal study-progress tracker.
//!
//! This library provides:
//! - Domain types for revision sessions and mock-test attempts
//! - An infallible normalizer from schemaless documents to typed records
//! - A pure analytics pipeline: bucketing, aggregation, weak-topic scoring,
//!   and insight generation
//! - Document storage with SQLite
//! - A chat-endpoint client for AI study recommendations
//! - CSV export, configuration, and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows strictly one way:
//! - **Logged:** documents in the store (immutable once written)
//! - **Normalized:** typed records, coerced without failure
//! - **Derived:** aggregates, topic analyses, and insights (recomputed every
//!   pass, never stored)
//!
//! ## Example
//!
//! ```rust,no_run
//! use studytrail_core::analytics::{aggregate, analyze_topics, TopicConfig};
//! use studytrail_core::db::{Database, SortDirection, COLLECTION_REVISIONS};
//! use studytrail_core::normalize::revision_from_document;
//! use studytrail_core::Config;
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let records: Vec<_> = db
//!     .list_all(COLLECTION_REVISIONS, "date", SortDirection::Ascending)
//!     .expect("failed to list revisions")
//!     .iter()
//!     .map(revision_from_document)
//!     .collect();
//!
//! let overall = aggregate(&records);
//! let weak_topics = analyze_topics(&records, &TopicConfig::default());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, SortDirection};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod normalize;
pub mod types;
