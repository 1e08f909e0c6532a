//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta` and runs sequential migrations
//! to bring the database up to [`CURRENT_SCHEMA_VERSION`].

use rusqlite::Connection;

use super::schema::reminder_columns;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

/// Update the stored schema version.
fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations. Each migration runs in a transaction.
pub fn run_migrations(conn: &mut Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        let tx = conn.transaction()?;
        match next {
            2 => migrate_v1_to_v2(&tx)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }
        update_schema_version(&tx, next)?;
        tx.commit()?;

        version = next;
    }

    Ok(())
}

/// Migration v1 → v2: recurring series support.
///
/// Adds `recurring`, `remaining_days`, and `original_id`, then points every
/// existing row at itself so each pre-existing reminder is its own anchor.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    let columns = reminder_columns(conn)?;
    let has = |name: &str| columns.iter().any(|c| c == name);

    if !has("recurring") {
        conn.execute_batch(
            "ALTER TABLE reminders ADD COLUMN recurring INTEGER NOT NULL DEFAULT 0",
        )?;
    }
    if !has("remaining_days") {
        conn.execute_batch(
            "ALTER TABLE reminders ADD COLUMN remaining_days INTEGER NOT NULL DEFAULT 0",
        )?;
    }
    if !has("original_id") {
        conn.execute_batch(
            "ALTER TABLE reminders ADD COLUMN original_id INTEGER REFERENCES reminders(id)",
        )?;
    }

    conn.execute(
        "UPDATE reminders SET original_id = id WHERE original_id IS NULL",
        [],
    )?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_reminders_original ON reminders(original_id)",
    )?;
    Ok(())
}
