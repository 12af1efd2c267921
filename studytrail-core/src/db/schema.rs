//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: schemaless document collections
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id           TEXT PRIMARY KEY,
        collection   TEXT NOT NULL,
        body         JSON NOT NULL,
        created_at   DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_collection
        ON documents(collection);
    "#,
];

/// Run all pending migrations on the connection.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let current: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (index, migration) in MIGRATIONS.iter().enumerate() {
        let version = index as i32 + 1;
        if version <= current {
            continue;
        }

        tracing::info!(version, "Applying database migration");
        conn.execute_batch(migration)?;
        conn.pragma_update(None, "user_version", version)?;
    }

    debug_assert_eq!(MIGRATIONS.len() as i32, SCHEMA_VERSION);
    Ok(())
}
