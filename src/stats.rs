//! Day-level schedule statistics.
//!
//! Summary numbers for the director dashboard: how full the day is and
//! whether it fits before venue close. Derived views, recomputed on demand.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::models::{DaySchedule, ScheduleItem};
use crate::timing::compute_slots;

/// Summary statistics for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    /// Total items in the running order.
    pub item_count: usize,
    /// Routines among them (excludes breaks).
    pub routine_count: usize,
    /// Total scheduled minutes (routines + breaks).
    pub total_minutes: i64,
    /// End of the last item, minutes from midnight. Day start if empty.
    pub end_minute: i64,
    /// Minutes left before venue close. Negative when the day overflows.
    /// `None` when no closing time is configured.
    pub remaining_minutes: Option<i64>,
    /// Percentage of the start-to-close window in use.
    /// `None` when no closing time is configured or the window is empty.
    pub utilization_percent: Option<i64>,
}

/// Computes summary statistics for a day.
///
/// # Errors
/// `MissingItem` if the running order references an ID absent from `items`.
pub fn day_stats(
    day: &DaySchedule,
    items: &HashMap<String, ScheduleItem>,
    venue_close_minute: Option<i64>,
) -> Result<DayStats, ScheduleError> {
    let slots = compute_slots(day, items)?;
    let end_minute = slots.last().map(|s| s.end_minute).unwrap_or(day.start_minute);
    let total_minutes = end_minute - day.start_minute;
    let routine_count = day
        .ordered_item_ids
        .iter()
        .filter(|id| items.get(*id).map(ScheduleItem::is_routine).unwrap_or(false))
        .count();

    let remaining_minutes = venue_close_minute.map(|close| close - end_minute);
    let utilization_percent = venue_close_minute.and_then(|close| {
        let window = close - day.start_minute;
        (window > 0).then(|| total_minutes * 100 / window)
    });

    Ok(DayStats {
        item_count: day.len(),
        routine_count,
        total_minutes,
        end_minute,
        remaining_minutes,
        utilization_percent,
    })
}
