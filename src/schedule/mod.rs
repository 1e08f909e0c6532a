pub mod clock;
pub mod recurrence;
pub mod scheduler;
pub mod time;
