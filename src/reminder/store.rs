//! Persistence seam for reminders.
//!
//! [`ReminderStore`] is the CRUD surface the engine and scheduler consume;
//! [`SqliteReminderStore`] is the shipped implementation. A recurring series is
//! written in one transaction so readers never see a series without its anchor.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Mutex, MutexGuard};

use super::types::{Language, NewReminder, Reminder, DATE_FORMAT, TIME_FORMAT};
use crate::error::StoreError;

/// Which active reminders a bulk deactivation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkFilter {
    All,
    OnDate(NaiveDate),
    Ids(Vec<i64>),
}

/// Durable CRUD over reminder rows.
///
/// All methods are synchronous; callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait ReminderStore: Send + Sync {
    /// Persist one occurrence as its own anchor. Returns the assigned id.
    fn create(&self, reminder: &NewReminder) -> Result<i64, StoreError> {
        let ids = self.create_series(std::slice::from_ref(reminder))?;
        ids.into_iter().next().ok_or(StoreError::NotFound(0))
    }

    /// Persist a linked series atomically. The first occurrence becomes the
    /// anchor; every later one gets the anchor's id as `original_id`.
    /// Returns ids in input order.
    fn create_series(&self, occurrences: &[NewReminder]) -> Result<Vec<i64>, StoreError>;

    fn get(&self, id: i64) -> Result<Option<Reminder>, StoreError>;

    /// Deactivate one reminder. Returns `false` if it was already inactive.
    fn mark_inactive(&self, id: i64) -> Result<bool, StoreError>;

    /// Active reminders on `date`, ordered by time-of-day ascending.
    fn query_by_date_active(&self, date: NaiveDate) -> Result<Vec<Reminder>, StoreError>;

    /// Every active reminder, ordered by date then time.
    fn query_all_active(&self) -> Result<Vec<Reminder>, StoreError>;

    /// Deactivate all active reminders matching `filter` in one transaction.
    /// Returns the ids that flipped.
    fn bulk_mark_inactive(&self, filter: &BulkFilter) -> Result<Vec<i64>, StoreError>;

    /// Housekeeping: delete inactive rows dated before `cutoff`. Never called by the engine.
    fn purge_inactive_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError>;

    /// Every row, active or not, ordered by id.
    fn list_all(&self) -> Result<Vec<Reminder>, StoreError>;
}

const SELECT_COLUMNS: &str = "id, task, time, date, language, active, recurring, \
                              remaining_days, original_id, created_at";

/// SQLite-backed [`ReminderStore`] sharing one connection behind a mutex.
pub struct SqliteReminderStore {
    conn: Mutex<Connection>,
}

impl SqliteReminderStore {
    /// Wrap a connection that already has the schema and migrations applied
    /// (see [`crate::db::open_database`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn query(&self, sql: &str, date: Option<NaiveDate>) -> Result<Vec<Reminder>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match date {
            Some(d) => stmt
                .query_map(params![d.format(DATE_FORMAT).to_string()], ReminderRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], ReminderRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        rows.into_iter().map(Reminder::try_from).collect()
    }
}

impl ReminderStore for SqliteReminderStore {
    fn create_series(&self, occurrences: &[NewReminder]) -> Result<Vec<i64>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(occurrences.len());
        let mut anchor: Option<i64> = None;
        for occurrence in occurrences {
            let id = insert_reminder(&tx, occurrence, anchor)?;
            if anchor.is_none() {
                tx.execute(
                    "UPDATE reminders SET original_id = ?1 WHERE id = ?1",
                    params![id],
                )?;
                anchor = Some(id);
            }
            ids.push(id);
        }

        tx.commit()?;
        tracing::debug!(count = ids.len(), anchor = ?anchor, "reminders persisted");
        Ok(ids)
    }

    fn get(&self, id: i64) -> Result<Option<Reminder>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM reminders WHERE id = ?1"),
                params![id],
                ReminderRow::from_row,
            )
            .optional()?;
        row.map(Reminder::try_from).transpose()
    }

    fn mark_inactive(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE reminders SET active = 0 WHERE id = ?1 AND active = 1",
            params![id],
        )?;
        if changed > 0 {
            return Ok(true);
        }

        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM reminders WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(false)
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    fn query_by_date_active(&self, date: NaiveDate) -> Result<Vec<Reminder>, StoreError> {
        self.query(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM reminders \
                 WHERE date = ?1 AND active = 1 ORDER BY time, id"
            ),
            Some(date),
        )
    }

    fn query_all_active(&self) -> Result<Vec<Reminder>, StoreError> {
        self.query(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM reminders \
                 WHERE active = 1 ORDER BY date, time, id"
            ),
            None,
        )
    }

    fn bulk_mark_inactive(&self, filter: &BulkFilter) -> Result<Vec<i64>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let ids = match filter {
            BulkFilter::All => {
                let mut stmt = tx.prepare("SELECT id FROM reminders WHERE active = 1 ORDER BY id")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, i64>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                ids
            }
            BulkFilter::OnDate(date) => {
                let mut stmt = tx.prepare(
                    "SELECT id FROM reminders WHERE active = 1 AND date = ?1 ORDER BY id",
                )?;
                let ids = stmt
                    .query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
                        row.get::<_, i64>(0)
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                ids
            }
            BulkFilter::Ids(candidates) => {
                let mut ids = Vec::with_capacity(candidates.len());
                for id in candidates {
                    let active: Option<bool> = tx
                        .query_row(
                            "SELECT active FROM reminders WHERE id = ?1",
                            params![id],
                            |row| row.get(0),
                        )
                        .optional()?;
                    if active == Some(true) {
                        ids.push(*id);
                    }
                }
                ids
            }
        };

        for id in &ids {
            tx.execute("UPDATE reminders SET active = 0 WHERE id = ?1", params![id])?;
        }
        tx.commit()?;

        tracing::debug!(count = ids.len(), filter = ?filter, "bulk deactivation");
        Ok(ids)
    }

    fn purge_inactive_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        // Anchors still referenced by a surviving occurrence are kept.
        let deleted = conn.execute(
            "DELETE FROM reminders \
             WHERE active = 0 AND date < ?1 \
             AND NOT EXISTS ( \
                 SELECT 1 FROM reminders o \
                 WHERE o.original_id = reminders.id AND o.id != reminders.id \
                 AND (o.active = 1 OR o.date >= ?1) \
             )",
            params![cutoff.format(DATE_FORMAT).to_string()],
        )?;
        Ok(deleted)
    }

    fn list_all(&self) -> Result<Vec<Reminder>, StoreError> {
        self.query(
            &format!("SELECT {SELECT_COLUMNS} FROM reminders ORDER BY id"),
            None,
        )
    }
}

/// Insert one occurrence. Returns the new row id.
fn insert_reminder(
    tx: &Transaction,
    reminder: &NewReminder,
    original_id: Option<i64>,
) -> Result<i64, StoreError> {
    tx.execute(
        "INSERT INTO reminders (task, time, date, language, active, recurring, remaining_days, original_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?7, ?8)",
        params![
            reminder.task,
            reminder.time.format(TIME_FORMAT).to_string(),
            reminder.date.format(DATE_FORMAT).to_string(),
            reminder.language.as_str(),
            reminder.recurring,
            reminder.remaining_days,
            original_id,
            chrono::Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

/// Raw column values before domain parsing.
struct ReminderRow {
    id: i64,
    task: String,
    time: String,
    date: String,
    language: String,
    active: bool,
    recurring: bool,
    remaining_days: i64,
    original_id: Option<i64>,
    created_at: Option<String>,
}

impl ReminderRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task: row.get(1)?,
            time: row.get(2)?,
            date: row.get(3)?,
            language: row.get(4)?,
            active: row.get(5)?,
            recurring: row.get(6)?,
            remaining_days: row.get(7)?,
            original_id: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = StoreError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let time = NaiveTime::parse_from_str(&row.time, TIME_FORMAT).map_err(|_| {
            StoreError::Corrupt {
                column: "time",
                value: row.time.clone(),
            }
        })?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|_| {
            StoreError::Corrupt {
                column: "date",
                value: row.date.clone(),
            }
        })?;
        let language: Language = row.language.parse().map_err(|_| StoreError::Corrupt {
            column: "language",
            value: row.language.clone(),
        })?;
        let remaining_days =
            u32::try_from(row.remaining_days).map_err(|_| StoreError::Corrupt {
                column: "remaining_days",
                value: row.remaining_days.to_string(),
            })?;

        Ok(Reminder {
            id: row.id,
            task: row.task,
            time,
            date,
            language,
            active: row.active,
            recurring: row.recurring,
            remaining_days,
            original_id: row.original_id.unwrap_or(row.id),
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_store() -> SqliteReminderStore {
        SqliteReminderStore::new(db::open_memory_database().unwrap())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn occurrence(task: &str, date: NaiveDate, time: NaiveTime, remaining: u32) -> NewReminder {
        NewReminder {
            task: task.into(),
            time,
            date,
            language: Language::English,
            recurring: remaining > 0,
            remaining_days: remaining,
        }
    }

    #[test]
    fn create_single_is_its_own_anchor() {
        let store = test_store();
        let id = store
            .create(&NewReminder::single("call doctor", day(4), at(10, 30), Language::English))
            .unwrap();

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.task, "call doctor");
        assert_eq!(stored.time, at(10, 30));
        assert!(stored.active);
        assert!(stored.is_anchor());
        assert!(!stored.recurring);
    }

    #[test]
    fn create_series_links_to_anchor() {
        let store = test_store();
        let series: Vec<NewReminder> = (0..3)
            .map(|i| occurrence("take medicine", day(4 + i), at(20, 0), 3 - i))
            .collect();

        let ids = store.create_series(&series).unwrap();
        assert_eq!(ids.len(), 3);

        let anchor = ids[0];
        for id in &ids {
            let r = store.get(*id).unwrap().unwrap();
            assert_eq!(r.original_id, anchor);
        }
        let anchors = ids
            .iter()
            .filter(|id| store.get(**id).unwrap().unwrap().is_anchor())
            .count();
        assert_eq!(anchors, 1);
    }

    #[test]
    fn query_by_date_orders_by_time() {
        let store = test_store();
        store.create(&occurrence("evening walk", day(4), at(18, 0), 0)).unwrap();
        store.create(&occurrence("breakfast pills", day(4), at(8, 0), 0)).unwrap();
        store.create(&occurrence("other day", day(5), at(7, 0), 0)).unwrap();

        let today = store.query_by_date_active(day(4)).unwrap();
        let tasks: Vec<&str> = today.iter().map(|r| r.task.as_str()).collect();
        assert_eq!(tasks, vec!["breakfast pills", "evening walk"]);
    }

    #[test]
    fn mark_inactive_is_terminal_and_reports_change() {
        let store = test_store();
        let id = store.create(&occurrence("stretch", day(4), at(9, 0), 0)).unwrap();

        assert!(store.mark_inactive(id).unwrap());
        assert!(!store.mark_inactive(id).unwrap());
        assert!(store.query_all_active().unwrap().is_empty());
        assert!(matches!(store.mark_inactive(9999), Err(StoreError::NotFound(9999))));
    }

    #[test]
    fn bulk_mark_inactive_by_date_and_ids() {
        let store = test_store();
        let a = store.create(&occurrence("a", day(4), at(9, 0), 0)).unwrap();
        let b = store.create(&occurrence("b", day(4), at(10, 0), 0)).unwrap();
        let c = store.create(&occurrence("c", day(5), at(10, 0), 0)).unwrap();

        let cleared = store.bulk_mark_inactive(&BulkFilter::OnDate(day(4))).unwrap();
        assert_eq!(cleared, vec![a, b]);

        // already-inactive ids are skipped
        let cleared = store.bulk_mark_inactive(&BulkFilter::Ids(vec![a, c])).unwrap();
        assert_eq!(cleared, vec![c]);

        assert!(store.bulk_mark_inactive(&BulkFilter::All).unwrap().is_empty());
    }

    #[test]
    fn purge_removes_only_old_inactive_rows() {
        let store = test_store();
        let old = store.create(&occurrence("old", day(1), at(9, 0), 0)).unwrap();
        let kept = store.create(&occurrence("still active", day(1), at(9, 0), 0)).unwrap();
        store.mark_inactive(old).unwrap();

        let deleted = store.purge_inactive_before(day(3)).unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get(old).unwrap().is_none());
        assert!(store.get(kept).unwrap().is_some());
    }

    #[test]
    fn purge_keeps_anchor_of_live_series() {
        let store = test_store();
        let ids = store
            .create_series(&[
                occurrence("series", day(1), at(9, 0), 2),
                occurrence("series", day(6), at(9, 0), 1),
            ])
            .unwrap();
        store.mark_inactive(ids[0]).unwrap();

        assert_eq!(store.purge_inactive_before(day(3)).unwrap(), 0);
        assert!(store.get(ids[0]).unwrap().is_some());
    }

    #[test]
    fn corrupt_time_is_reported() {
        let store = test_store();
        {
            let conn = store.lock().unwrap();
            conn.execute(
                "INSERT INTO reminders (task, time, date, language) VALUES ('x', 'noon', '2026-05-04', 'en')",
                [],
            )
            .unwrap();
        }
        let err = store.query_all_active().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { column: "time", .. }));
    }
}
