//! Database repository layer
//!
//! Insert and list operations over document collections.

use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

/// Collection holding logged revision sessions.
pub const COLLECTION_REVISIONS: &str = "revisions";
/// Collection holding logged mock-test attempts. The camelCase name is the
/// one the hosted store used; kept for data compatibility.
pub const COLLECTION_MOCK_TESTS: &str = "mockTest";

/// Ordering direction for [`Database::list_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode so a dashboard read never blocks a form submit
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)?;
        Ok(())
    }

    /// Insert a document into a collection, returning its generated id.
    pub fn insert(&self, collection: &str, document: &Value) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO documents (id, collection, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                collection,
                serde_json::to_string(document)?,
                Utc::now().to_rfc3339()
            ],
        )?;

        tracing::debug!(collection, id = %id, "Inserted document");
        Ok(id)
    }

    /// List every document in a collection, ordered by a field of the
    /// document body.
    ///
    /// Documents missing the field sort together (SQLite treats the
    /// extracted value as NULL). A document whose body fails to parse is
    /// skipped with a warning rather than failing the whole listing.
    pub fn list_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Value>> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT body FROM documents WHERE collection = ?1 \
             ORDER BY json_extract(body, '$.' || ?2) {}, created_at {}",
            direction.as_sql(),
            direction.as_sql()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![collection, order_by], |row| {
            row.get::<_, String>(0)
        })?;

        let mut documents = Vec::new();
        for body in rows {
            let body = body?;
            match serde_json::from_str(&body) {
                Ok(value) => documents.push(value),
                Err(e) => {
                    tracing::warn!(collection, error = %e, "Skipping unparseable document body");
                }
            }
        }

        Ok(documents)
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
