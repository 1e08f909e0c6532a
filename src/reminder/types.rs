//! Core reminder type definitions.
//!
//! Defines [`Language`] (the supported grammar/response tags), [`Reminder`]
//! (a persisted occurrence), and [`NewReminder`] (an occurrence awaiting an id).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Storage format of the time-of-day column.
pub const TIME_FORMAT: &str = "%H:%M";
/// Storage format of the calendar date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Language tag attached to an utterance and to every reminder created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::English, Self::Hindi, Self::Marathi];

    /// Tag as stored in the `language` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "hi" | "hindi" => Ok(Self::Hindi),
            "mr" | "marathi" => Ok(Self::Marathi),
            other => Err(format!("unknown language tag: {other}")),
        }
    }
}

/// One persisted occurrence, matching the `reminders` table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Store-assigned primary key.
    pub id: i64,
    /// Free-text task description as spoken.
    pub task: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
    pub language: Language,
    /// `false` once fired, cleared, dismissed, or found missed. Never flips back.
    pub active: bool,
    pub recurring: bool,
    /// Occurrences left in the series counting this one; `0` for single reminders.
    pub remaining_days: u32,
    /// Id of the series anchor. Equal to `id` for single reminders and anchors.
    pub original_id: i64,
    pub created_at: Option<String>,
}

impl Reminder {
    /// Local date-time at which this occurrence is due.
    pub fn due_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// `true` if this occurrence anchors its series.
    pub fn is_anchor(&self) -> bool {
        self.original_id == self.id
    }
}

/// An occurrence that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub task: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
    pub language: Language,
    pub recurring: bool,
    pub remaining_days: u32,
}

impl NewReminder {
    /// A non-recurring occurrence.
    pub fn single(task: impl Into<String>, date: NaiveDate, time: NaiveTime, language: Language) -> Self {
        Self {
            task: task.into(),
            time,
            date,
            language,
            recurring: false,
            remaining_days: 0,
        }
    }

    /// The row this draft becomes once the store has assigned ids.
    pub fn persisted(self, id: i64, original_id: i64) -> Reminder {
        Reminder {
            id,
            task: self.task,
            time: self.time,
            date: self.date,
            language: self.language,
            active: true,
            recurring: self.recurring,
            remaining_days: self.remaining_days,
            original_id,
            created_at: None,
        }
    }
}
