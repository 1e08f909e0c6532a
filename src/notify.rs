//! Notification Sink: where spoken/printed responses go.
//!
//! The core only ever calls [`NotificationSink::emit`] and ignores the outcome.
//! A text-to-speech or GUI front end implements the trait outside this crate.

use crate::reminder::types::Language;

pub trait NotificationSink: Send + Sync {
    /// Deliver `text` in `language`. Fire-and-forget.
    fn emit(&self, text: &str, language: Language);
}

/// Prints each response on its own stdout line, prefixed with the language tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn emit(&self, text: &str, language: Language) {
        println!("[{language}] {text}");
    }
}

/// Routes responses into the log instead of stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, text: &str, language: Language) {
        tracing::info!(language = %language, text, "notification");
    }
}
