//! Engine context: wires the store, sink, clock, language tables, and
//! scheduler together and runs each recognized command end to end.
//!
//! [`Engine::start`] rehydrates the scheduler before handing out the engine,
//! so no command is accepted while the store is still being reconciled.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::config::CareConfig;
use crate::error::{EngineError, StoreError};
use crate::intent::lang::{render, LanguageRegistry, Responses};
use crate::intent::{self, Command, SetReminder, Transcript};
use crate::notify::NotificationSink;
use crate::reminder::query::{self, twelve_hour};
use crate::reminder::store::{BulkFilter, ReminderStore};
use crate::reminder::types::{Language, NewReminder, Reminder};
use crate::schedule::clock::Clock;
use crate::schedule::recurrence;
use crate::schedule::scheduler::{RehydrateReport, Scheduler, SchedulerEvent};
use crate::schedule::time;

/// Tunables taken from [`CareConfig`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Longest series a single "for N days" request may create.
    pub max_series_days: u32,
    pub event_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_series_days: 365,
            event_capacity: 64,
        }
    }
}

impl From<&CareConfig> for EngineSettings {
    fn from(config: &CareConfig) -> Self {
        Self {
            max_series_days: config.scheduler.max_series_days.max(1),
            event_capacity: config.scheduler.event_capacity,
        }
    }
}

/// Everything the engine needs, passed in explicitly.
pub struct EngineContext {
    pub store: Arc<dyn ReminderStore>,
    pub sink: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
    pub languages: Arc<LanguageRegistry>,
    pub settings: EngineSettings,
}

/// Which reminders a bulk clear touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    Day(NaiveDate),
    All,
}

/// What handling one transcript did. The spoken response has already been
/// sent to the sink by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoSpeech,
    Unrecognized,
    /// Persisted and armed occurrences, anchor first.
    Created(Vec<Reminder>),
    /// A series whose every day had already passed; nothing was stored.
    SeriesElapsed,
    Schedule(String),
}

pub struct Engine {
    ctx: EngineContext,
    scheduler: Scheduler,
}

impl Engine {
    /// Build the scheduler and rehydrate it from the store.
    pub async fn start(ctx: EngineContext) -> Result<(Self, RehydrateReport), EngineError> {
        let scheduler = Scheduler::new(
            Arc::clone(&ctx.store),
            Arc::clone(&ctx.sink),
            Arc::clone(&ctx.clock),
            Arc::clone(&ctx.languages),
            ctx.settings.event_capacity,
        );
        let report = scheduler.rehydrate().await?;
        Ok((Self { ctx, scheduler }, report))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.scheduler.subscribe()
    }

    pub fn default_language(&self) -> Language {
        self.ctx.languages.default_language()
    }

    /// Speak the ready greeting.
    pub fn greet(&self, language: Language) {
        self.emit(self.responses(language).ready, language);
    }

    /// Route one transcript: no-speech short-circuit, then parse and dispatch.
    pub async fn handle(&self, transcript: Transcript) -> Result<Outcome, EngineError> {
        let (text, language) = match transcript {
            Transcript::NoSpeech => {
                let language = self.default_language();
                self.emit(self.responses(language).no_speech, language);
                return Ok(Outcome::NoSpeech);
            }
            Transcript::Speech { text, language } => (text, self.ctx.languages.resolve_tag(&language)),
        };

        match intent::parse(&self.ctx.languages, &text, language) {
            Command::SetReminder(request) => self.set_reminder(&request, language).await,
            Command::QuerySchedule => {
                let today = self.ctx.clock.now().date();
                self.query_schedule(today, language).await.map(Outcome::Schedule)
            }
            Command::Unrecognized => {
                self.emit(self.responses(language).not_understood, language);
                Ok(Outcome::Unrecognized)
            }
        }
    }

    /// Resolve, persist, and arm a reminder or a daily series.
    ///
    /// Nothing is armed unless the whole series was stored.
    pub async fn set_reminder(
        &self,
        request: &SetReminder,
        language: Language,
    ) -> Result<Outcome, EngineError> {
        let responses = self.responses(language);
        let now = self.ctx.clock.now();
        let resolved = time::resolve(request.hour, request.minute, request.meridiem, now);

        let drafts = match request.recurring_days {
            Some(days) => {
                let days = days.min(self.ctx.settings.max_series_days);
                recurrence::expand(&request.task, language, resolved.time, now.date(), days, now)
            }
            None => vec![NewReminder::single(
                request.task.clone(),
                resolved.date,
                resolved.time,
                language,
            )],
        };

        if drafts.is_empty() {
            self.emit(responses.series_elapsed, language);
            return Ok(Outcome::SeriesElapsed);
        }

        let batch = drafts.clone();
        let ids = match self.with_store(move |store| store.create_series(&batch)).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, task = %request.task, "failed to persist reminder");
                self.emit(responses.set_failed, language);
                return Err(e);
            }
        };

        let anchor = ids.first().copied().unwrap_or_default();
        let reminders: Vec<Reminder> = drafts
            .into_iter()
            .zip(ids)
            .map(|(draft, id)| draft.persisted(id, anchor))
            .collect();

        if let Err(e) = self.arm_all(&reminders).await {
            self.emit(responses.set_failed, language);
            return Err(e);
        }

        let time = twelve_hour(resolved.time);
        let text = if request.recurring_days.is_some() {
            render(
                responses.reminder_set_recurring,
                &[
                    ("time", &time),
                    ("task", &request.task),
                    ("days", &reminders.len().to_string()),
                ],
            )
        } else {
            render(responses.reminder_set, &[("time", &time), ("task", &request.task)])
        };
        self.emit(&text, language);

        tracing::info!(
            anchor,
            occurrences = reminders.len(),
            rolled = resolved.rolled_to_next_day,
            language = %language,
            "reminder set"
        );
        Ok(Outcome::Created(reminders))
    }

    /// Speak and return the schedule for `date`.
    pub async fn query_schedule(&self, date: NaiveDate, language: Language) -> Result<String, EngineError> {
        let responses = self.responses(language);
        match self
            .with_store(move |store| query::query_schedule(store, date, responses))
            .await
        {
            Ok(text) => {
                self.emit(&text, language);
                Ok(text)
            }
            Err(e) => {
                tracing::error!(error = %e, %date, "schedule query failed");
                self.emit(responses.query_failed, language);
                Err(e)
            }
        }
    }

    /// Cancel timers and deactivate every active reminder in `scope`.
    ///
    /// If the store update fails the cancelled timers are re-armed, so the
    /// clear either happens completely or not at all.
    pub async fn clear(&self, scope: ClearScope, language: Language) -> Result<Vec<i64>, EngineError> {
        let responses = self.responses(language);
        let rows = match self
            .with_store(move |store| match scope {
                ClearScope::Day(date) => store.query_by_date_active(date),
                ClearScope::All => store.query_all_active(),
            })
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.emit(responses.clear_failed, language);
                return Err(e);
            }
        };

        // A firing occurrence belongs to its fire; it retires itself.
        let mut cancelled = Vec::new();
        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            if self.scheduler.cancel(row.id)? {
                cancelled.push(row.clone());
            } else if self.scheduler.is_armed(row.id) {
                tracing::debug!(reminder_id = row.id, "firing, left out of clear");
                continue;
            }
            ids.push(row.id);
        }
        match self
            .with_store(move |store| store.bulk_mark_inactive(&BulkFilter::Ids(ids)))
            .await
        {
            Ok(cleared) if cleared.is_empty() => {
                self.emit(responses.nothing_to_clear, language);
                Ok(cleared)
            }
            Ok(cleared) => {
                let text = render(responses.cleared, &[("count", &cleared.len().to_string())]);
                self.emit(&text, language);
                tracing::info!(count = cleared.len(), scope = ?scope, "reminders cleared");
                Ok(cleared)
            }
            Err(e) => {
                tracing::error!(error = %e, "clear failed, re-arming cancelled timers");
                for row in cancelled {
                    let id = row.id;
                    if let Err(rearm) = self.scheduler.schedule(row) {
                        tracing::error!(reminder_id = id, error = %rearm, "failed to re-arm timer");
                    }
                }
                self.emit(responses.clear_failed, language);
                Err(e)
            }
        }
    }

    /// Cancel and deactivate one occurrence. Returns `false` if it was not
    /// active or is firing right now.
    pub async fn dismiss(&self, id: i64) -> Result<bool, EngineError> {
        let Some(row) = self.with_store(move |store| store.get(id)).await? else {
            return Ok(false);
        };
        if !row.active {
            return Ok(false);
        }

        let cancelled = self.scheduler.cancel(id)?;
        if !cancelled && self.scheduler.is_armed(id) {
            tracing::debug!(reminder_id = id, "firing, not dismissed");
            return Ok(false);
        }
        match self.with_store(move |store| store.mark_inactive(id)).await {
            Ok(changed) => {
                tracing::info!(reminder_id = id, "reminder dismissed");
                Ok(changed)
            }
            Err(e) => {
                if cancelled {
                    self.scheduler.schedule(row)?;
                }
                Err(e)
            }
        }
    }

    /// Active reminders on `date`, ordered by time. Read-only.
    pub async fn upcoming(&self, date: NaiveDate) -> Result<Vec<Reminder>, EngineError> {
        self.with_store(move |store| store.query_by_date_active(date)).await
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Arm every occurrence, or none: on failure the stored rows are retired.
    async fn arm_all(&self, reminders: &[Reminder]) -> Result<(), EngineError> {
        for (armed, reminder) in reminders.iter().enumerate() {
            if let Err(e) = self.scheduler.schedule(reminder.clone()) {
                for done in &reminders[..armed] {
                    self.scheduler.cancel(done.id)?;
                }
                let ids = reminders.iter().map(|r| r.id).collect();
                self.with_store(move |store| store.bulk_mark_inactive(&BulkFilter::Ids(ids)))
                    .await?;
                return Err(e.into());
            }
        }
        Ok(())
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T, EngineError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ReminderStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.ctx.store);
        Ok(tokio::task::spawn_blocking(move || f(store.as_ref())).await??)
    }

    fn responses(&self, language: Language) -> &'static Responses {
        self.ctx.languages.table(language).responses
    }

    fn emit(&self, text: &str, language: Language) {
        self.ctx.sink.emit(text, language);
    }
}
