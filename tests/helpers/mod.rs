#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::broadcast;

use careminder::db;
use careminder::engine::{Engine, EngineContext, EngineSettings};
use careminder::error::StoreError;
use careminder::intent::lang::LanguageRegistry;
use careminder::notify::NotificationSink;
use careminder::reminder::store::{BulkFilter, ReminderStore, SqliteReminderStore};
use careminder::reminder::types::{Language, NewReminder, Reminder};
use careminder::schedule::clock::Clock;
use careminder::schedule::scheduler::{RehydrateReport, SchedulerEvent};

/// 2026-03-14, the fixed "today" of every test.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn today_at(h: u32, m: u32) -> NaiveDateTime {
    today().and_time(hm(h, m))
}

pub fn days_from_today(n: i64) -> NaiveDate {
    today() + chrono::Duration::days(n)
}

/// Fresh in-memory store with schema and migrations applied.
pub fn test_store() -> Arc<SqliteReminderStore> {
    Arc::new(SqliteReminderStore::new(db::open_memory_database().unwrap()))
}

pub fn registry() -> Arc<LanguageRegistry> {
    Arc::new(LanguageRegistry::builtin(Language::English).unwrap())
}

/// Persist a single English reminder and return the stored row.
pub fn persist(store: &dyn ReminderStore, task: &str, date: NaiveDate, time: NaiveTime) -> Reminder {
    let id = store
        .create(&NewReminder::single(task, date, time, Language::English))
        .unwrap();
    store.get(id).unwrap().unwrap()
}

/// Clock that only moves when told to.
pub struct ManualClock(Mutex<NaiveDateTime>);

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

/// Sink that records every emitted response.
#[derive(Default)]
pub struct RecordingSink(Mutex<Vec<(String, Language)>>);

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn texts(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn last(&self) -> Option<(String, Language)> {
        self.0.lock().unwrap().last().cloned()
    }

    /// Responses announcing a fired reminder.
    pub fn fired(&self) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|t| t.starts_with("Reminder: "))
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, text: &str, language: Language) {
        self.0.lock().unwrap().push((text.to_string(), language));
    }
}

/// Store wrapper whose writes can be switched to fail or held back.
pub struct FlakyStore {
    inner: Arc<SqliteReminderStore>,
    pub fail_writes: AtomicBool,
    gate: Mutex<()>,
}

impl FlakyStore {
    pub fn new(inner: Arc<SqliteReminderStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_writes: AtomicBool::new(false),
            gate: Mutex::new(()),
        })
    }

    /// `mark_inactive` blocks until the returned guard is dropped.
    pub fn hold_writes(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Poisoned)
        } else {
            Ok(())
        }
    }
}

impl ReminderStore for FlakyStore {
    fn create_series(&self, occurrences: &[NewReminder]) -> Result<Vec<i64>, StoreError> {
        self.check()?;
        self.inner.create_series(occurrences)
    }

    fn get(&self, id: i64) -> Result<Option<Reminder>, StoreError> {
        self.inner.get(id)
    }

    fn mark_inactive(&self, id: i64) -> Result<bool, StoreError> {
        drop(self.gate.lock().unwrap());
        self.check()?;
        self.inner.mark_inactive(id)
    }

    fn query_by_date_active(&self, date: NaiveDate) -> Result<Vec<Reminder>, StoreError> {
        self.inner.query_by_date_active(date)
    }

    fn query_all_active(&self) -> Result<Vec<Reminder>, StoreError> {
        self.inner.query_all_active()
    }

    fn bulk_mark_inactive(&self, filter: &BulkFilter) -> Result<Vec<i64>, StoreError> {
        self.check()?;
        self.inner.bulk_mark_inactive(filter)
    }

    fn purge_inactive_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        self.check()?;
        self.inner.purge_inactive_before(cutoff)
    }

    fn list_all(&self) -> Result<Vec<Reminder>, StoreError> {
        self.inner.list_all()
    }
}

pub struct Harness {
    pub engine: Engine,
    pub report: RehydrateReport,
    pub sink: Arc<RecordingSink>,
    pub clock: Arc<ManualClock>,
}

/// Start an engine over `store` with the clock at `now`.
pub async fn start_engine(store: Arc<dyn ReminderStore>, now: NaiveDateTime) -> Harness {
    start_engine_with(store, now, EngineSettings::default()).await
}

pub async fn start_engine_with(
    store: Arc<dyn ReminderStore>,
    now: NaiveDateTime,
    settings: EngineSettings,
) -> Harness {
    let sink = RecordingSink::new();
    let clock = ManualClock::new(now);
    let ctx = EngineContext {
        store,
        sink: sink.clone(),
        clock: clock.clone(),
        languages: registry(),
        settings,
    };
    let (engine, report) = Engine::start(ctx).await.unwrap();
    Harness {
        engine,
        report,
        sink,
        clock,
    }
}

/// Wait until `count` fires have completed.
pub async fn wait_for_completions(events: &mut broadcast::Receiver<SchedulerEvent>, count: usize) -> Vec<i64> {
    let mut done = Vec::new();
    while done.len() < count {
        if let SchedulerEvent::Completed { reminder_id } = events.recv().await.unwrap() {
            done.push(reminder_id);
        }
    }
    done
}
