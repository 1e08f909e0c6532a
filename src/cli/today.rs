use std::sync::Arc;

use anyhow::Result;
use chrono::Local;

use careminder::config::CareConfig;
use careminder::notify::TracingSink;
use careminder::reminder::query::twelve_hour;

/// Print today's active reminders in a table.
pub async fn today(config: &CareConfig) -> Result<()> {
    let engine = super::start_engine(config, Arc::new(TracingSink)).await?;
    let date = Local::now().date_naive();
    let reminders = engine.upcoming(date).await?;
    engine.shutdown();

    println!("Reminders for {date}");
    println!("{}", "=".repeat(40));
    if reminders.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for r in &reminders {
        let repeat = if r.recurring && r.remaining_days > 0 {
            format!("  [{} left, series #{}]", r.remaining_days, r.original_id)
        } else {
            String::new()
        };
        println!("  #{:<5} {}  {:<30} {}{}", r.id, twelve_hour(r.time), r.task, r.language, repeat);
    }
    Ok(())
}
