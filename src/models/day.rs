//! Competition day model.
//!
//! A `DaySchedule` owns the running order for one competition day. The
//! `ordered_item_ids` sequence is the single source of truth for ordering;
//! computed times and conflicts are derived views, rebuilt from it on every
//! change and never written back.

use serde::{Deserialize, Serialize};

/// One competition day's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Unique day identifier.
    pub day_id: String,
    /// Calendar date (ISO `YYYY-MM-DD`).
    pub date: String,
    /// First item's start time, in minutes from midnight.
    pub start_minute: i64,
    /// Running order: item IDs in performance sequence.
    ///
    /// Invariant: a permutation of exactly the items assigned to this day —
    /// no duplicates, no dangling IDs.
    pub ordered_item_ids: Vec<String>,
    /// Lock state.
    pub status: ScheduleStatus,
}

/// Schedule lock state.
///
/// `Final` locks the order against casual edits: mutating operations fail
/// unless an explicit override is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Order is still being arranged; free editing.
    Tentative,
    /// Order is locked; editing requires an explicit override.
    Final,
}

impl DaySchedule {
    /// Creates an empty tentative day.
    pub fn new(day_id: impl Into<String>) -> Self {
        Self {
            day_id: day_id.into(),
            date: String::new(),
            start_minute: 0,
            ordered_item_ids: Vec::new(),
            status: ScheduleStatus::Tentative,
        }
    }

    /// Sets the calendar date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the day start time (minutes from midnight).
    pub fn with_start_minute(mut self, minute: i64) -> Self {
        self.start_minute = minute;
        self
    }

    /// Sets the running order.
    pub fn with_order<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ordered_item_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Position of an item in the running order.
    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.ordered_item_ids.iter().position(|id| id == item_id)
    }

    /// Number of items in the day.
    pub fn len(&self) -> usize {
        self.ordered_item_ids.len()
    }

    /// Whether the day has no items.
    pub fn is_empty(&self) -> bool {
        self.ordered_item_ids.is_empty()
    }

    /// Whether the order is locked.
    pub fn is_final(&self) -> bool {
        self.status == ScheduleStatus::Final
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_builder() {
        let day = DaySchedule::new("day-1")
            .with_date("2026-05-09")
            .with_start_minute(9 * 60)
            .with_order(vec!["A", "B", "C"]);

        assert_eq!(day.day_id, "day-1");
        assert_eq!(day.start_minute, 540);
        assert_eq!(day.len(), 3);
        assert_eq!(day.position_of("B"), Some(1));
        assert_eq!(day.position_of("Z"), None);
        assert_eq!(day.status, ScheduleStatus::Tentative);
        assert!(!day.is_final());
    }

    #[test]
    fn test_empty_day() {
        let day = DaySchedule::new("day-1");
        assert!(day.is_empty());
        assert_eq!(day.len(), 0);
    }
}
