//! Scheduler Core: one cancellable timer per occurrence id.
//!
//! Armed jobs live in a map keyed by reminder id. Each job carries a
//! generation number and a state; a timer that wakes up must claim its job
//! (`Scheduled -> Firing`) under the map lock before it may notify, and
//! `cancel` only removes jobs that are still `Scheduled`. So for any id exactly
//! one of fire or cancel wins, and a cancelled occurrence is never announced.
//!
//! Rehydration must finish once before `schedule`/`cancel` are accepted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::clock::Clock;
use crate::error::SchedulerError;
use crate::intent::lang::{render, LanguageRegistry};
use crate::notify::NotificationSink;
use crate::reminder::store::{BulkFilter, ReminderStore};
use crate::reminder::types::{Language, Reminder};

/// State changes published to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Armed { reminder_id: i64, due: NaiveDateTime },
    Fired { reminder_id: i64, language: Language, text: String },
    /// Fire finished: store updated (or the failure logged) and the timer entry removed.
    Completed { reminder_id: i64 },
    Cancelled { reminder_id: i64 },
    /// Found past due during rehydration and retired without notifying.
    Missed { reminder_id: i64, due: NaiveDateTime },
}

/// Outcome of one rehydration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RehydrateReport {
    pub armed: Vec<i64>,
    pub missed: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Scheduled,
    Firing,
}

struct Job {
    generation: u64,
    state: JobState,
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    store: Arc<dyn ReminderStore>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    languages: Arc<LanguageRegistry>,
    jobs: Mutex<HashMap<i64, Job>>,
    next_generation: AtomicU64,
    ready: AtomicBool,
    events: broadcast::Sender<SchedulerEvent>,
}

impl Shared {
    fn jobs(&self) -> MutexGuard<'_, HashMap<i64, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: SchedulerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Cloneable handle to the shared timer table.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        languages: Arc<LanguageRegistry>,
        event_capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                store,
                sink,
                clock,
                languages,
                jobs: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                ready: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Arm a timer for `reminder`, replacing any timer already armed for its id.
    /// An occurrence that is firing right now is left alone
    /// ([`SchedulerError::AlreadyFiring`]).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, reminder: Reminder) -> Result<(), SchedulerError> {
        if !self.is_ready() {
            return Err(SchedulerError::NotReady);
        }
        if reminder.id <= 0 {
            return Err(SchedulerError::MissingId);
        }
        let id = reminder.id;
        if self.arm(reminder) {
            Ok(())
        } else {
            Err(SchedulerError::AlreadyFiring(id))
        }
    }

    /// Disarm the timer for `id`. Returns `true` if a scheduled timer was
    /// removed; `false` if none was armed or it is already firing.
    pub fn cancel(&self, id: i64) -> Result<bool, SchedulerError> {
        if !self.is_ready() {
            return Err(SchedulerError::NotReady);
        }

        let removed = {
            let mut jobs = self.shared.jobs();
            match jobs.get(&id).map(|job| job.state) {
                Some(JobState::Scheduled) => jobs.remove(&id),
                _ => None,
            }
        };

        match removed {
            Some(job) => {
                if let Some(handle) = job.handle {
                    handle.abort();
                }
                tracing::debug!(reminder_id = id, "timer cancelled");
                self.shared.publish(SchedulerEvent::Cancelled { reminder_id: id });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rebuild timers from the store. Future rows are armed; rows due at or
    /// before now are marked inactive without notifying. Safe to run twice.
    pub async fn rehydrate(&self) -> Result<RehydrateReport, SchedulerError> {
        let now = self.shared.clock.now();
        let store = Arc::clone(&self.shared.store);
        let active = tokio::task::spawn_blocking(move || store.query_all_active()).await??;

        let (past, future): (Vec<Reminder>, Vec<Reminder>) =
            active.into_iter().partition(|r| r.due_at() <= now);

        let mut report = RehydrateReport::default();
        if !past.is_empty() {
            let store = Arc::clone(&self.shared.store);
            let ids = past.iter().map(|r| r.id).collect();
            let retired =
                tokio::task::spawn_blocking(move || store.bulk_mark_inactive(&BulkFilter::Ids(ids)))
                    .await??;
            for reminder in past.iter().filter(|r| retired.contains(&r.id)) {
                tracing::warn!(
                    reminder_id = reminder.id,
                    task = %reminder.task,
                    due = %reminder.due_at(),
                    "missed reminder retired without notification"
                );
                self.shared.publish(SchedulerEvent::Missed {
                    reminder_id: reminder.id,
                    due: reminder.due_at(),
                });
            }
            report.missed = retired;
        }

        for reminder in future {
            let id = reminder.id;
            if self.arm(reminder) {
                report.armed.push(id);
            }
        }

        self.shared.ready.store(true, Ordering::SeqCst);
        tracing::info!(
            armed = report.armed.len(),
            missed = report.missed.len(),
            "scheduler rehydrated"
        );
        Ok(report)
    }

    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst)
    }

    /// Ids with a timer armed or currently firing, ascending.
    pub fn armed_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.shared.jobs().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_armed(&self, id: i64) -> bool {
        self.shared.jobs().contains_key(&id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.shared.events.subscribe()
    }

    /// Abort every timer that has not started firing. Rows stay active and are
    /// picked up again by the next rehydration.
    pub fn shutdown(&self) {
        let mut jobs = self.shared.jobs();
        let pending: Vec<i64> = jobs
            .iter()
            .filter(|(_, job)| job.state == JobState::Scheduled)
            .map(|(id, _)| *id)
            .collect();
        for id in &pending {
            if let Some(handle) = jobs.remove(id).and_then(|job| job.handle) {
                handle.abort();
            }
        }
        tracing::info!(aborted = pending.len(), "scheduler shut down");
    }

    /// Returns `false` without touching anything if `reminder` is mid-fire.
    fn arm(&self, reminder: Reminder) -> bool {
        let id = reminder.id;
        let due = reminder.due_at();

        // The entry is in place before the task can try to claim it.
        let mut jobs = self.shared.jobs();
        if let Some(previous) = jobs.get_mut(&id) {
            if previous.state == JobState::Firing {
                tracing::debug!(reminder_id = id, "already firing, not re-arming");
                return false;
            }
            if let Some(handle) = previous.handle.take() {
                handle.abort();
            }
            tracing::debug!(reminder_id = id, "replacing armed timer");
        }

        let generation = self.shared.next_generation.fetch_add(1, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run_timer(shared, reminder, generation));
        jobs.insert(
            id,
            Job {
                generation,
                state: JobState::Scheduled,
                handle: Some(handle),
            },
        );
        drop(jobs);

        tracing::debug!(reminder_id = id, due = %due, "timer armed");
        self.shared.publish(SchedulerEvent::Armed { reminder_id: id, due });
        true
    }
}

async fn run_timer(shared: Arc<Shared>, reminder: Reminder, generation: u64) {
    let wait = (reminder.due_at() - shared.clock.now())
        .to_std()
        .unwrap_or(Duration::ZERO);
    tokio::time::sleep(wait).await;
    fire(shared, reminder, generation).await;
}

async fn fire(shared: Arc<Shared>, reminder: Reminder, generation: u64) {
    let id = reminder.id;
    {
        let mut jobs = shared.jobs();
        match jobs.get_mut(&id) {
            Some(job) if job.generation == generation && job.state == JobState::Scheduled => {
                job.state = JobState::Firing;
                // Past this point the task must not be aborted.
                job.handle = None;
            }
            _ => return,
        }
    }

    let responses = shared.languages.table(reminder.language).responses;
    let text = render(responses.reminder_triggered, &[("task", &reminder.task)]);
    tracing::info!(reminder_id = id, language = %reminder.language, "reminder fired");
    shared.sink.emit(&text, reminder.language);
    shared.publish(SchedulerEvent::Fired {
        reminder_id: id,
        language: reminder.language,
        text,
    });

    let store = Arc::clone(&shared.store);
    match tokio::task::spawn_blocking(move || store.mark_inactive(id)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!(reminder_id = id, error = %e, "failed to mark fired reminder inactive"),
        Err(e) => tracing::error!(reminder_id = id, error = %e, "mark-inactive task failed"),
    }

    {
        let mut jobs = shared.jobs();
        if jobs.get(&id).is_some_and(|job| job.generation == generation) {
            jobs.remove(&id);
        }
    }
    shared.publish(SchedulerEvent::Completed { reminder_id: id });
}
