//! Conflict detection.
//!
//! Scans a computed schedule for dancer trouble spots: a dancer whose next
//! routine starts the moment the previous one ends (critical), or whose gap
//! is shorter than the costume-change buffer (warning). Only *consecutive*
//! appearances of a dancer are compared — a dancer at positions p1 < p2 < p3
//! is checked as (p1,p2) and (p2,p3), since only adjacent appearances create
//! a change-time problem. Also flags the day running past venue close.

use std::collections::HashMap;

use crate::error::ScheduleError;
use crate::models::{Conflict, DaySchedule, ScheduleItem};
use crate::timing::ComputedSlot;

/// Detector configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Minimum gap required between two routines sharing a dancer, in
    /// minutes. Gaps below this are flagged.
    pub min_buffer_minutes: i64,
    /// Venue closing time (minutes from midnight). When set, a day whose
    /// last item ends later is flagged with an info conflict.
    pub venue_close_minute: Option<i64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            // Standard costume-change allowance.
            min_buffer_minutes: 20,
            venue_close_minute: None,
        }
    }
}

impl DetectorConfig {
    /// Creates a config with the given change buffer.
    pub fn new(min_buffer_minutes: i64) -> Self {
        Self {
            min_buffer_minutes,
            ..Self::default()
        }
    }

    /// Sets the venue closing time.
    pub fn with_venue_close(mut self, close_minute: i64) -> Self {
        self.venue_close_minute = Some(close_minute);
        self
    }
}

/// Detects conflicts in a computed schedule.
///
/// `slots` must be the output of [`crate::timing::compute_slots`] for the
/// same `day` and `items` (positionally parallel to the running order).
///
/// Output ordering is deterministic: sorted by the schedule position of the
/// earlier affected item, ties broken most-severe-first.
///
/// # Errors
/// `MissingItem` if the running order references an ID absent from `items`.
pub fn detect_conflicts(
    day: &DaySchedule,
    items: &HashMap<String, ScheduleItem>,
    slots: &[ComputedSlot],
    config: &DetectorConfig,
) -> Result<Vec<Conflict>, ScheduleError> {
    // Dancer → positions of the routines they appear in, in schedule order.
    let mut dancer_positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (position, id) in day.ordered_item_ids.iter().enumerate() {
        let item = items
            .get(id)
            .ok_or_else(|| ScheduleError::MissingItem(id.clone()))?;
        if let Some(routine) = item.as_routine() {
            for dancer in &routine.dancer_ids {
                dancer_positions
                    .entry(dancer.as_str())
                    .or_default()
                    .push(position);
            }
        }
    }

    // (position of earlier item, conflict) for deterministic sorting.
    let mut found: Vec<(usize, Conflict)> = Vec::new();

    for (dancer, positions) in &dancer_positions {
        for pair in positions.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            // Sequential schedule: gap is never negative.
            let gap = slots[later].start_minute - slots[earlier].end_minute;
            let earlier_id = &day.ordered_item_ids[earlier];
            let later_id = &day.ordered_item_ids[later];

            if gap == 0 {
                found.push((earlier, Conflict::back_to_back(*dancer, earlier_id, later_id)));
            } else if gap < config.min_buffer_minutes {
                found.push((
                    earlier,
                    Conflict::insufficient_change_time(
                        *dancer,
                        earlier_id,
                        later_id,
                        gap,
                        config.min_buffer_minutes,
                    ),
                ));
            }
        }
    }

    if let (Some(close), Some(last)) = (config.venue_close_minute, slots.last()) {
        if last.end_minute > close {
            found.push((
                slots.len() - 1,
                Conflict::day_overflow(&day.day_id, &last.item_id, last.end_minute, close),
            ));
        }
    }

    found.sort_by(|(pos_a, a), (pos_b, b)| {
        pos_a
            .cmp(pos_b)
            .then(a.severity.cmp(&b.severity))
            .then(a.id.cmp(&b.id))
    });

    Ok(found.into_iter().map(|(_, conflict)| conflict).collect())
}
