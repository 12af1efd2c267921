//! Document storage layer
//!
//! The persistence collaborator: schemaless documents grouped into named
//! collections, with two operations the rest of the system relies on —
//! insert a document, and list a collection's documents ordered by a field.
//! No transactionality or pagination is assumed; analytics passes load the
//! full record set into memory.

mod repo;
mod schema;

pub use repo::{Database, SortDirection, COLLECTION_MOCK_TESTS, COLLECTION_REVISIONS};
