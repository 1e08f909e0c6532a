use anyhow::Result;
use serde::Serialize;

use careminder::config::CareConfig;
use careminder::reminder::store::ReminderStore;
use careminder::reminder::types::Reminder;

/// Export format.
#[derive(Debug, Serialize)]
struct ExportData {
    exported_at: String,
    reminders: Vec<Reminder>,
}

/// Export every reminder, active or not, as JSON to stdout.
pub fn export(config: &CareConfig) -> Result<()> {
    let store = super::open_store(config)?;
    let reminders = store.list_all()?;

    let data = ExportData {
        exported_at: chrono::Local::now().to_rfc3339(),
        reminders,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    let active = data.reminders.iter().filter(|r| r.active).count();
    eprintln!(
        "Exported {} reminders ({} active).",
        data.reminders.len(),
        active
    );

    Ok(())
}
