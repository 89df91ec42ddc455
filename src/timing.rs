//! Time calculation.
//!
//! Computes start/end times for every item in a day by walking the running
//! order and accumulating durations from the day start. The output is a
//! derived view: recomputed fresh on every order or duration change, never
//! patched incrementally, so preview and commit always agree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::models::{DaySchedule, ScheduleItem};

/// Computed time slot for one item. Positionally parallel to the day's
/// `ordered_item_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedSlot {
    /// The item this slot belongs to.
    pub item_id: String,
    /// Start time, minutes from midnight.
    pub start_minute: i64,
    /// End time, minutes from midnight.
    pub end_minute: i64,
}

impl ComputedSlot {
    /// Slot duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.end_minute - self.start_minute
    }
}

/// Computes time slots for every item in the day's running order.
///
/// The first item starts at `day.start_minute`; each subsequent item starts
/// when the previous one ends. Pure and deterministic: identical inputs
/// always produce identical slots.
///
/// # Errors
/// `MissingItem` if an ID in the running order has no entry in `items`.
pub fn compute_slots(
    day: &DaySchedule,
    items: &HashMap<String, ScheduleItem>,
) -> Result<Vec<ComputedSlot>, ScheduleError> {
    let mut slots = Vec::with_capacity(day.ordered_item_ids.len());
    let mut cursor = day.start_minute;

    for id in &day.ordered_item_ids {
        let item = items
            .get(id)
            .ok_or_else(|| ScheduleError::MissingItem(id.clone()))?;
        let end = cursor + item.duration_minutes();
        slots.push(ComputedSlot {
            item_id: id.clone(),
            start_minute: cursor,
            end_minute: end,
        });
        cursor = end;
    }

    Ok(slots)
}

/// Parses an `HH:MM` string into minutes from midnight.
pub fn parse_hhmm(text: &str) -> Option<i64> {
    let (hours, minutes) = text.split_once(':')?;
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes from midnight as `HH:MM`. Times past midnight wrap.
pub fn format_hhmm(minute: i64) -> String {
    let minute = minute.rem_euclid(24 * 60);
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Break, BreakType, Routine};

    fn sample_items() -> HashMap<String, ScheduleItem> {
        let mut items = HashMap::new();
        items.insert(
            "A".to_string(),
            Routine::new("A", "E1").with_duration(15).into(),
        );
        items.insert(
            "BRK".to_string(),
            Break::new("BRK", BreakType::Break).with_duration(10).into(),
        );
        items.insert(
            "B".to_string(),
            Routine::new("B", "E2").with_duration(20).into(),
        );
        items
    }

    #[test]
    fn test_basic_timing() {
        // Day start 09:00, items [A(15), Break(10), B(20)].
        let day = DaySchedule::new("day-1")
            .with_start_minute(parse_hhmm("09:00").unwrap())
            .with_order(vec!["A", "BRK", "B"]);
        let slots = compute_slots(&day, &sample_items()).unwrap();

        assert_eq!(slots.len(), 3);
        assert_eq!(format_hhmm(slots[0].start_minute), "09:00");
        assert_eq!(format_hhmm(slots[0].end_minute), "09:15");
        assert_eq!(format_hhmm(slots[1].start_minute), "09:15");
        assert_eq!(format_hhmm(slots[1].end_minute), "09:25");
        assert_eq!(format_hhmm(slots[2].start_minute), "09:25");
        assert_eq!(format_hhmm(slots[2].end_minute), "09:45");
    }

    #[test]
    fn test_determinism() {
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "BRK", "B"]);
        let items = sample_items();
        assert_eq!(
            compute_slots(&day, &items).unwrap(),
            compute_slots(&day, &items).unwrap()
        );
    }

    #[test]
    fn test_missing_item() {
        let day = DaySchedule::new("day-1").with_order(vec!["A", "GHOST"]);
        let err = compute_slots(&day, &sample_items()).unwrap_err();
        assert_eq!(err, ScheduleError::MissingItem("GHOST".to_string()));
    }

    #[test]
    fn test_empty_day() {
        let day = DaySchedule::new("day-1").with_start_minute(540);
        assert!(compute_slots(&day, &HashMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_hhmm_round_trip() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("9"), None);
        assert_eq!(format_hhmm(540), "09:00");
        assert_eq!(format_hhmm(1439), "23:59");
        // Past midnight wraps for display.
        assert_eq!(format_hhmm(1450), "00:10");
    }
}
