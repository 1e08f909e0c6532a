//! Recurrence Expander: "for N days" → dated occurrences.
//!
//! Occurrence `k` falls on `base_date + k` days with `remaining_days = days - k`.
//! Day 0 is dropped when its time has already passed; the later days keep
//! their dates. Anchor linking happens in the store when the series is
//! persisted (see [`ReminderStore::create_series`]).
//!
//! [`ReminderStore::create_series`]: crate::reminder::store::ReminderStore::create_series

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::reminder::types::{Language, NewReminder};

/// Expand a daily series starting at `base_date`. Output is ordered by date.
pub fn expand(
    task: &str,
    language: Language,
    time: NaiveTime,
    base_date: NaiveDate,
    days: u32,
    now: NaiveDateTime,
) -> Vec<NewReminder> {
    (0..days)
        .filter_map(|offset| {
            let date = base_date.checked_add_days(Days::new(u64::from(offset)))?;
            if offset == 0 && date.and_time(time) <= now {
                tracing::debug!(task, "first occurrence already passed, skipping");
                return None;
            }
            Some(NewReminder {
                task: task.to_string(),
                time,
                date,
                language,
                recurring: true,
                remaining_days: days - offset,
            })
        })
        .collect()
}
