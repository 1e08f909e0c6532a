pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// Open (or create) the reminder database at the given path with the schema
/// initialized and all migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // WAL lets the refresh flow read while a fire callback writes
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&mut conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&mut conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Snapshot of database state for the `doctor` command.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub schema_version: u32,
    pub total_reminders: i64,
    pub active_reminders: i64,
    pub series_count: i64,
    /// Rows whose `original_id` points at a missing reminder.
    pub orphaned_occurrences: i64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Run row counts, series-link checks, and `PRAGMA integrity_check`.
pub fn check_database_health(conn: &Connection) -> rusqlite::Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;
    let total_reminders: i64 =
        conn.query_row("SELECT COUNT(*) FROM reminders", [], |row| row.get(0))?;
    let active_reminders: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reminders WHERE active = 1",
        [],
        |row| row.get(0),
    )?;
    let series_count: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT original_id) FROM reminders WHERE recurring = 1",
        [],
        |row| row.get(0),
    )?;
    let orphaned_occurrences: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reminders r \
         WHERE r.original_id IS NOT NULL \
         AND NOT EXISTS (SELECT 1 FROM reminders a WHERE a.id = r.original_id)",
        [],
        |row| row.get(0),
    )?;
    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    Ok(HealthReport {
        schema_version,
        total_reminders,
        active_reminders,
        series_count,
        orphaned_occurrences,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}
