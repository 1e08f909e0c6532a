//! Error types for the store, scheduler, and engine layers.
//!
//! Parsing and time resolution never fail; only persistence and scheduling
//! produce errors, and those surface to the caller as a rejected command.

use thiserror::Error;

/// Failures from a [`ReminderStore`](crate::reminder::store::ReminderStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("reminder not found: {0}")]
    NotFound(i64),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("invalid stored value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },
}

/// Failures from the [`Scheduler`](crate::schedule::scheduler::Scheduler).
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is not ready: rehydration has not completed")]
    NotReady,

    #[error("reminder has no persisted id")]
    MissingId,

    #[error("reminder {0} is firing and cannot be re-armed")]
    AlreadyFiring(i64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failures surfaced by the [`Engine`](crate::engine::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("invalid language pattern: {0}")]
    Patterns(#[from] regex::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
