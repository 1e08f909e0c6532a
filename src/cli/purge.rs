//! CLI `purge` command: delete old inactive reminders.

use anyhow::{Context, Result};
use chrono::{Days, Local};

use careminder::config::CareConfig;
use careminder::reminder::store::ReminderStore;

/// Delete inactive reminders dated more than `days` days ago
/// (default `housekeeping.retention_days`).
pub fn purge(config: &CareConfig, days: Option<u32>) -> Result<()> {
    let days = days.unwrap_or(config.housekeeping.retention_days);
    let today = Local::now().date_naive();
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(days)))
        .context("retention window reaches before the calendar start")?;

    let store = super::open_store(config)?;
    let deleted = store
        .purge_inactive_before(cutoff)
        .context("failed to purge reminders")?;

    tracing::info!(deleted, %cutoff, "purge complete");
    println!("Deleted {deleted} inactive reminder(s) dated before {cutoff}.");
    Ok(())
}
