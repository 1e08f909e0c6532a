//! Time Resolver: spoken hour/minute/meridiem → concrete local date and time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::intent::MeridiemHint;

/// Where a spoken time lands on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// The time had already passed today, so the date moved to tomorrow.
    pub rolled_to_next_day: bool,
}

/// Resolve a spoken clock value against `now`, captured once by the caller.
///
/// Bare hours 1 through 6 are read as afternoon/evening.
pub fn resolve(hour: u32, minute: u32, hint: Option<MeridiemHint>, now: NaiveDateTime) -> Resolution {
    let time = resolve_time_of_day(hour, minute, hint);
    let today = now.date();

    if today.and_time(time) <= now {
        let date = today.succ_opt().unwrap_or(today);
        Resolution {
            date,
            time,
            rolled_to_next_day: true,
        }
    } else {
        Resolution {
            date: today,
            time,
            rolled_to_next_day: false,
        }
    }
}

/// Apply the meridiem rules without looking at the calendar.
pub fn resolve_time_of_day(hour: u32, minute: u32, hint: Option<MeridiemHint>) -> NaiveTime {
    let hour = match hint {
        Some(MeridiemHint::Evening) if hour != 12 => hour + 12,
        Some(MeridiemHint::Morning) if hour == 12 => 0,
        None if (1..=6).contains(&hour) => hour + 12,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour % 24, minute % 60, 0).unwrap_or(NaiveTime::MIN)
}
