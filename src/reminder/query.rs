//! Schedule Query: today's active reminders as one localized sentence.

use chrono::{NaiveDate, NaiveTime};

use super::store::ReminderStore;
use super::types::Reminder;
use crate::error::StoreError;
use crate::intent::lang::{render, Responses};

/// `06:00 PM` style, as spoken back to the user.
pub fn twelve_hour(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// Format reminders (already ordered by time) with the given templates.
pub fn format_schedule(reminders: &[Reminder], responses: &Responses) -> String {
    if reminders.is_empty() {
        return responses.no_reminders.to_string();
    }

    let items: Vec<String> = reminders
        .iter()
        .map(|r| {
            let mut item = render(
                responses.reminder_item,
                &[("task", &r.task), ("time", &twelve_hour(r.time))],
            );
            if r.recurring && r.remaining_days > 0 {
                item.push_str(&render(
                    responses.repeating_suffix,
                    &[("days", &r.remaining_days.to_string())],
                ));
            }
            item
        })
        .collect();

    render(
        responses.reminders_list,
        &[
            ("count", &reminders.len().to_string()),
            ("reminders", &items.join(", ")),
        ],
    )
}

/// Read active reminders for `date` and format them. Never mutates the store.
pub fn query_schedule(
    store: &dyn ReminderStore,
    date: NaiveDate,
    responses: &Responses,
) -> Result<String, StoreError> {
    let reminders = store.query_by_date_active(date)?;
    Ok(format_schedule(&reminders, responses))
}
