use std::sync::Arc;

use anyhow::Result;

use careminder::config::CareConfig;
use careminder::engine::Outcome;
use careminder::intent::Transcript;
use careminder::notify::ConsoleSink;

/// Handle a single utterance and exit. Created reminders stay in the store
/// and are armed by the next `listen`.
pub async fn say(config: &CareConfig, text: &str, lang: Option<&str>) -> Result<()> {
    let engine = super::start_engine(config, Arc::new(ConsoleSink)).await?;
    let language = super::pick_language(&engine, lang);

    let outcome = engine
        .handle(Transcript::speech(text, language.as_str()))
        .await;
    engine.shutdown();

    if let Outcome::Created(reminders) = outcome? {
        for r in &reminders {
            eprintln!("  #{} {} {}", r.id, r.date, r.time.format("%H:%M"));
        }
    }
    Ok(())
}
