//! Scheduling domain models.
//!
//! Core data types for a competition day's running order. `DaySchedule`
//! owns the ordering; items describe what is being ordered; conflicts are
//! the derived trouble spots the detector reports.

mod conflict;
mod day;
mod item;

pub use conflict::{Conflict, ConflictType, Severity};
pub use day::{DaySchedule, ScheduleStatus};
pub use item::{Break, BreakType, Routine, ScheduleItem};
