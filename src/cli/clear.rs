use std::sync::Arc;

use anyhow::Result;
use chrono::Local;

use careminder::config::CareConfig;
use careminder::engine::ClearScope;
use careminder::notify::ConsoleSink;

/// Clear today's active reminders, or every active reminder with `--all`.
pub async fn clear(config: &CareConfig, all: bool, lang: Option<&str>) -> Result<()> {
    let engine = super::start_engine(config, Arc::new(ConsoleSink)).await?;
    let language = super::pick_language(&engine, lang);

    let scope = if all {
        ClearScope::All
    } else {
        ClearScope::Day(Local::now().date_naive())
    };
    let result = engine.clear(scope, language).await;
    engine.shutdown();

    let cleared = result?;
    eprintln!("Deactivated {} reminder(s).", cleared.len());
    Ok(())
}
