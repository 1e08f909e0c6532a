//! Intent Parser: utterance + language → [`Command`].
//!
//! Reminder patterns are tried before query patterns, each list in order, and
//! the first usable match wins. Nothing here fails: an utterance that fits no
//! pattern becomes [`Command::Unrecognized`].

pub mod lang;
pub mod normalize;

use regex::Captures;
use serde::Serialize;

use crate::reminder::types::Language;
use lang::{LanguageRegistry, LanguageTable};

/// AM/PM (or language-equivalent) marker spoken with a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeridiemHint {
    Morning,
    Evening,
    /// An explicit marker that names neither half of the day (`o'clock`).
    Neutral,
}

/// A request to create one reminder or a daily series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetReminder {
    pub task: String,
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<MeridiemHint>,
    /// `Some(n)` with `n >= 1` for "for N days"; `None` for a single reminder.
    pub recurring_days: Option<u32>,
}

/// What an utterance asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    SetReminder(SetReminder),
    QuerySchedule,
    Unrecognized,
}

/// Output of the speech-to-text collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Speech { text: String, language: String },
    /// Nothing intelligible was heard. Never reaches the parser.
    NoSpeech,
}

impl Transcript {
    pub fn speech(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Speech {
            text: text.into(),
            language: language.into(),
        }
    }
}

/// Classify an utterance using the grammar registered for `language`.
pub fn parse(registry: &LanguageRegistry, utterance: &str, language: Language) -> Command {
    let table = registry.table(language);
    let text = normalize::normalize(utterance, language);
    if text.is_empty() {
        return Command::Unrecognized;
    }

    for pattern in &table.reminder_patterns {
        if let Some(request) = pattern.captures(&text).and_then(|caps| extract(table, &caps)) {
            tracing::debug!(language = %language, task = %request.task, "reminder intent");
            return Command::SetReminder(request);
        }
    }

    if table.query_patterns.iter().any(|p| p.is_match(&text)) {
        tracing::debug!(language = %language, "schedule query intent");
        return Command::QuerySchedule;
    }

    tracing::debug!(language = %language, utterance = %text, "no intent matched");
    Command::Unrecognized
}

/// Pull a [`SetReminder`] out of a pattern match. Clock values that cannot
/// name a real time (hour 27, minute 75, "13 pm") make the match unusable.
fn extract(table: &LanguageTable, caps: &Captures<'_>) -> Option<SetReminder> {
    let task = caps.name("task")?.as_str().trim();
    if task.is_empty() {
        return None;
    }

    let hour: u32 = caps.name("hour")?.as_str().parse().ok()?;
    let minute: u32 = match caps.name("minute") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = caps
        .name("meridiem")
        .and_then(|m| table.classify_meridiem(m.as_str()));
    // Digits only, so a parse failure is overflow; the engine caps the length.
    let recurring_days = caps
        .name("days")
        .map(|d| d.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .filter(|days| *days > 0);

    let hour_ok = match meridiem {
        Some(MeridiemHint::Morning | MeridiemHint::Evening) => (1..=12).contains(&hour),
        Some(MeridiemHint::Neutral) | None => hour <= 23,
    };
    if !hour_ok || minute > 59 {
        return None;
    }

    Some(SetReminder {
        task: task.to_string(),
        hour,
        minute,
        meridiem,
        recurring_days,
    })
}
