//! Source of local wall-clock time.

use chrono::{Local, NaiveDateTime};

/// Injectable "now". Timers and the resolver read local naive time through this.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Host local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
