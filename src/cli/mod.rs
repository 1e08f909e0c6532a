pub mod clear;
pub mod doctor;
pub mod export;
pub mod listen;
pub mod purge;
pub mod say;
pub mod today;

use std::sync::Arc;

use anyhow::{Context, Result};

use careminder::config::CareConfig;
use careminder::db;
use careminder::engine::{Engine, EngineContext, EngineSettings};
use careminder::intent::lang::LanguageRegistry;
use careminder::notify::NotificationSink;
use careminder::reminder::store::SqliteReminderStore;
use careminder::reminder::types::Language;
use careminder::schedule::clock::SystemClock;

/// Open the configured database as a reminder store.
pub fn open_store(config: &CareConfig) -> Result<SqliteReminderStore> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    Ok(SqliteReminderStore::new(conn))
}

/// Open the store, compile the language tables, and rehydrate the scheduler.
pub async fn start_engine(config: &CareConfig, sink: Arc<dyn NotificationSink>) -> Result<Engine> {
    let store = open_store(config)?;
    let languages = LanguageRegistry::builtin(config.default_language())
        .context("failed to compile language tables")?;

    let ctx = EngineContext {
        store: Arc::new(store),
        sink,
        clock: Arc::new(SystemClock),
        languages: Arc::new(languages),
        settings: EngineSettings::from(config),
    };
    let (engine, report) = Engine::start(ctx).await.context("failed to start engine")?;

    if !report.missed.is_empty() {
        eprintln!("{} missed reminder(s) were retired while the engine was offline.", report.missed.len());
    }
    tracing::info!(armed = report.armed.len(), "engine ready");
    Ok(engine)
}

/// `--lang` flag if given, else the configured default.
pub fn pick_language(engine: &Engine, flag: Option<&str>) -> Language {
    match flag {
        Some(tag) => tag.parse().unwrap_or_else(|_| {
            tracing::warn!(tag, "unknown --lang, using default");
            engine.default_language()
        }),
        None => engine.default_language(),
    }
}
