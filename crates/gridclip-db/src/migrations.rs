//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order. A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;

use gridclip_core::{Error, Result};

/// V1: initial schema -- one key-value record per cache tier.
const V1_INITIAL: &str = r#"
CREATE TABLE log_tiers (
    tier       TEXT PRIMARY KEY,
    document   TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Apply any migrations newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .map_err(|e| Error::database(e.to_string()))?;

    for (version, sql) in MIGRATIONS {
        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;
        if applied > 0 {
            continue;
        }

        conn.execute_batch(sql)
            .map_err(|e| Error::database(format!("migration {version} failed: {e}")))?;
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![version, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tracing::debug!(version, "Applied migration");
    }

    Ok(())
}
