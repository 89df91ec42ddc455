//! Competition-day scheduling core.
//!
//! Assigns competition routines to time slots across event days, detects
//! dancer conflicts (back-to-back performances, insufficient costume-change
//! time), proposes minimal reorderings to resolve them, and manages the
//! running order as an editable, lockable, versioned document.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `ScheduleItem` (`Routine`/`Break`),
//!   `DaySchedule`, `ScheduleStatus`, `Conflict`, `Severity`
//! - **`timing`**: Cumulative start/end time calculation (`compute_slots`)
//! - **`conflict`**: Dancer-gap and day-overflow detection (`detect_conflicts`)
//! - **`autofix`**: Single-swap conflict resolution, per day or weekend
//! - **`store`**: Per-session working copy with optimistic recompute and
//!   compare-and-swap commit (`EditSession`, `ScheduleRepository`)
//! - **`stats`**: Day utilization summaries
//! - **`validation`**: Structural integrity checks on a day + item map
//!
//! # Architecture
//!
//! The running order (`DaySchedule::ordered_item_ids`) is the single source
//! of truth. Times and conflicts are derived views: pure functions of the
//! order and item data, rebuilt after every mutation and never written back.
//! All computation is synchronous and deterministic; persistence sits behind
//! the `ScheduleRepository` trait and is the only point of contention.

pub mod autofix;
pub mod conflict;
pub mod error;
pub mod models;
pub mod stats;
pub mod store;
pub mod timing;
pub mod validation;

pub use error::ScheduleError;
