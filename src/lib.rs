//! Voice reminders for elderly users: spoken commands in, timed spoken reminders out.
//!
//! Careminder turns a transcribed utterance ("remind me to take medicine at 8 pm
//! for 5 days") into persisted, timed reminder occurrences, answers "what do I
//! have today", and fires each occurrence once through a notification sink.
//! Speech-to-text and text-to-speech live outside this crate; the core consumes
//! a [`Transcript`](intent::Transcript) and emits text to a
//! [`NotificationSink`](notify::NotificationSink).
//!
//! | Language | Reminder phrasing | Query phrasing |
//! |----------|-------------------|----------------|
//! | **English** (`en`) | remind me to … at 6 pm for 3 days | what do I have today |
//! | **Hindi** (`hi`) | मुझे … की याद दिलाओ 8 शाम | आज मेरे रिमाइंडर क्या हैं |
//! | **Marathi** (`mr`) | मला … ची आठवण करून दे संध्याकाळी 8 वाजता | माझ्या आठवणी |
//!
//! # Architecture
//!
//! - **Storage**: SQLite via rusqlite, one row per occurrence, series linked by `original_id`
//! - **Parsing**: per-language regex tables, reminder patterns tried before query patterns
//! - **Scheduling**: one Tokio timer per occurrence, rebuilt from the store at startup
//! - **Events**: a broadcast channel of scheduler state changes for presentation layers
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`intent`]: Utterance normalization and per-language intent parsing
//! - [`schedule`]: Time resolution, recurrence expansion, and the timer scheduler
//! - [`reminder`]: Reminder types, the store seam, and schedule formatting
//! - [`engine`]: The engine context that runs commands end to end

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod intent;
pub mod notify;
pub mod reminder;
pub mod schedule;
