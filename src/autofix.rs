//! Conflict auto-fix.
//!
//! Resolves dancer conflicts with a single local swap: the nearest later
//! routine that shares no dancer with either side of the conflict is moved
//! to the position immediately after the earlier conflicting routine,
//! pushing the later one down. One swap, not a re-sort — the rest of a
//! manually arranged order is left untouched.
//!
//! The day-level fixer iterates to a fixed point, most-severe-first,
//! re-running the detector after every swap, bounded by the day's item
//! count. The weekend-level fixer applies it independently per day;
//! cross-day conflicts are not evaluated.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::conflict::{detect_conflicts, DetectorConfig};
use crate::error::ScheduleError;
use crate::models::{Conflict, ConflictType, DaySchedule, Routine, ScheduleItem};
use crate::timing::compute_slots;

/// Cooperative cancellation flag for multi-pass fixes.
///
/// Checked at each pass boundary; a cancelled run returns the work done so
/// far with [`FixReport::cancelled`] set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A routine relocated by the fixer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedItem {
    /// The relocated item.
    pub item_id: String,
    /// Position before the move.
    pub from_position: usize,
    /// Position after the move.
    pub to_position: usize,
}

impl MovedItem {
    /// Positional displacement of the move.
    pub fn distance(&self) -> usize {
        self.from_position.abs_diff(self.to_position)
    }
}

/// Outcome of a day- or weekend-level fix run.
#[derive(Debug, Clone)]
pub struct FixReport {
    /// The day with all applied swaps.
    pub day: DaySchedule,
    /// Swaps applied, in order.
    pub moves: Vec<MovedItem>,
    /// Number of conflicts resolved.
    pub resolved: usize,
    /// Conflicts that remain after the run (unfixable or unattempted).
    pub unresolved: Vec<Conflict>,
    /// Whether the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl FixReport {
    /// Whether every fixable conflict was resolved.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && !self.cancelled
    }
}

/// Resolves a single dancer conflict with one local swap.
///
/// Swap candidates are routines strictly later in the order than the later
/// conflicting routine, tried nearest-first, that share no dancer with
/// either side of the conflict. A candidate is accepted only if the
/// detector, re-run on the new order, shows the target conflict gone and no
/// increase in the total conflict count.
///
/// # Errors
/// `UnresolvableConflict` if no candidate passes verification (including
/// for `DayOverflow`, which no reorder can fix); `MissingItem` if the
/// conflict references items absent from the day or map.
pub fn auto_fix_conflict(
    conflict: &Conflict,
    day: &DaySchedule,
    items: &HashMap<String, ScheduleItem>,
    config: &DetectorConfig,
) -> Result<DaySchedule, ScheduleError> {
    fix_once(conflict, day, items, config).map(|(day, _)| day)
}

fn fix_once(
    conflict: &Conflict,
    day: &DaySchedule,
    items: &HashMap<String, ScheduleItem>,
    config: &DetectorConfig,
) -> Result<(DaySchedule, MovedItem), ScheduleError> {
    if conflict.conflict_type == ConflictType::DayOverflow {
        // Overflow is a capacity problem; no reorder changes the total time.
        return Err(ScheduleError::UnresolvableConflict(conflict.id.clone()));
    }

    let [earlier_id, later_id] = conflict.affected_item_ids.as_slice() else {
        return Err(ScheduleError::UnresolvableConflict(conflict.id.clone()));
    };
    let earlier_pos = day
        .position_of(earlier_id)
        .ok_or_else(|| ScheduleError::MissingItem(earlier_id.clone()))?;
    let later_pos = day
        .position_of(later_id)
        .ok_or_else(|| ScheduleError::MissingItem(later_id.clone()))?;

    // Dancers on either side of the conflict; a swap candidate must share
    // none of them.
    let mut blocked: HashSet<&str> = HashSet::new();
    for id in [earlier_id, later_id] {
        let routine = routine_for(id, items)?;
        blocked.extend(routine.dancer_ids.iter().map(String::as_str));
    }

    let baseline = {
        let slots = compute_slots(day, items)?;
        detect_conflicts(day, items, &slots, config)?.len()
    };

    let dancer = conflict.dancer_id.as_deref().unwrap_or_default();

    // Nearest-first: smallest positional displacement wins ties.
    for candidate_pos in (later_pos + 1)..day.len() {
        let candidate_id = &day.ordered_item_ids[candidate_pos];
        let Some(candidate) = items.get(candidate_id).and_then(ScheduleItem::as_routine) else {
            continue;
        };
        if candidate.dancer_ids.iter().any(|d| blocked.contains(d.as_str())) {
            continue;
        }

        let mut fixed = day.clone();
        let moved = fixed.ordered_item_ids.remove(candidate_pos);
        fixed.ordered_item_ids.insert(earlier_pos + 1, moved);

        let slots = compute_slots(&fixed, items)?;
        let after = detect_conflicts(&fixed, items, &slots, config)?;
        let resolved = !after.iter().any(|c| c.involves(dancer, earlier_id, later_id));
        if resolved && after.len() <= baseline {
            debug!(
                conflict = %conflict.id,
                candidate = %candidate_id,
                from = candidate_pos,
                to = earlier_pos + 1,
                "resolved conflict with local swap"
            );
            return Ok((
                fixed,
                MovedItem {
                    item_id: candidate_id.clone(),
                    from_position: candidate_pos,
                    to_position: earlier_pos + 1,
                },
            ));
        }
    }

    Err(ScheduleError::UnresolvableConflict(conflict.id.clone()))
}

fn routine_for<'a>(
    id: &str,
    items: &'a HashMap<String, ScheduleItem>,
) -> Result<&'a Routine, ScheduleError> {
    items
        .get(id)
        .and_then(ScheduleItem::as_routine)
        .ok_or_else(|| ScheduleError::MissingItem(id.to_string()))
}

/// Resolves all fixable conflicts on one day.
///
/// Fixed-point iteration: detect, fix the most severe conflict (earliest
/// first among equals), re-detect, repeat. Conflicts the single-swap
/// strategy cannot resolve are set aside so every pass makes progress.
/// Bounded by the day's item count, and cancellable between passes.
pub fn auto_fix_day_conflicts(
    day: &DaySchedule,
    items: &HashMap<String, ScheduleItem>,
    config: &DetectorConfig,
    cancel: &CancelFlag,
) -> Result<FixReport, ScheduleError> {
    let mut working = day.clone();
    let mut moves = Vec::new();
    let mut cancelled = false;
    let mut skipped: HashSet<String> = HashSet::new();

    let initial = {
        let slots = compute_slots(&working, items)?;
        detect_conflicts(&working, items, &slots, config)?
            .iter()
            .filter(|c| c.conflict_type != ConflictType::DayOverflow)
            .count()
    };

    // Each pass resolves or sets aside one conflict, so the item count
    // bounds the iteration even when fixes interact.
    for _ in 0..=working.len() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let slots = compute_slots(&working, items)?;
        let conflicts = detect_conflicts(&working, items, &slots, config)?;
        // Detector output is position-ordered; min by severity keeps the
        // earliest conflict among equally severe ones.
        let target = conflicts
            .into_iter()
            .filter(|c| c.conflict_type != ConflictType::DayOverflow)
            .filter(|c| !skipped.contains(&c.id))
            .min_by_key(|c| c.severity);
        let Some(target) = target else { break };

        match fix_once(&target, &working, items, config) {
            Ok((fixed, moved)) => {
                working = fixed;
                moves.push(moved);
            }
            Err(ScheduleError::UnresolvableConflict(id)) => {
                skipped.insert(id);
            }
            Err(other) => return Err(other),
        }
    }

    let slots = compute_slots(&working, items)?;
    let unresolved: Vec<Conflict> = detect_conflicts(&working, items, &slots, config)?
        .into_iter()
        .filter(|c| c.conflict_type != ConflictType::DayOverflow)
        .collect();
    let resolved = initial.saturating_sub(unresolved.len());

    info!(
        day = %working.day_id,
        resolved,
        unresolved = unresolved.len(),
        cancelled,
        "auto-fix pass complete"
    );

    Ok(FixReport {
        day: working,
        moves,
        resolved,
        unresolved,
        cancelled,
    })
}

/// Resolves conflicts across several days, each day independently.
///
/// A dancer's conflicts are only evaluated within a single day; nothing is
/// moved across days. Reports come back in input order.
pub fn auto_fix_weekend_conflicts(
    days: &[DaySchedule],
    items: &HashMap<String, ScheduleItem>,
    config: &DetectorConfig,
    cancel: &CancelFlag,
) -> Result<Vec<FixReport>, ScheduleError> {
    days.iter()
        .map(|day| auto_fix_day_conflicts(day, items, config, cancel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Routine;

    fn routine(id: &str, minutes: i64, dancers: &[&str]) -> ScheduleItem {
        Routine::new(id, format!("entry-{id}"))
            .with_duration(minutes)
            .with_dancers(dancers.iter().copied())
            .into()
    }

    fn item_map(items: Vec<ScheduleItem>) -> HashMap<String, ScheduleItem> {
        items.into_iter().map(|i| (i.id().to_string(), i)).collect()
    }

    fn conflicts_of(
        day: &DaySchedule,
        items: &HashMap<String, ScheduleItem>,
        config: &DetectorConfig,
    ) -> Vec<Conflict> {
        let slots = compute_slots(day, items).unwrap();
        detect_conflicts(day, items, &slots, config).unwrap()
    }

    #[test]
    fn test_single_swap_resolves_pair() {
        // A and B share dancer X back-to-back; C is clean and long enough
        // to provide the buffer. Expect [A, C, B].
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("C", 10, &["Y"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "C"]);
        let config = DetectorConfig::new(5);

        let conflicts = conflicts_of(&day, &items, &config);
        assert_eq!(conflicts.len(), 1);

        let fixed = auto_fix_conflict(&conflicts[0], &day, &items, &config).unwrap();
        assert_eq!(fixed.ordered_item_ids, vec!["A", "C", "B"]);
        assert!(conflicts_of(&fixed, &items, &config).is_empty());
    }

    #[test]
    fn test_no_candidate_is_unresolvable() {
        // Every later routine shares dancer X; nothing can be swapped in.
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("C", 5, &["X"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "C"]);
        let config = DetectorConfig::new(5);

        let conflicts = conflicts_of(&day, &items, &config);
        let err = auto_fix_conflict(&conflicts[0], &day, &items, &config).unwrap_err();
        assert!(matches!(err, ScheduleError::UnresolvableConflict(_)));
    }

    #[test]
    fn test_nearest_candidate_preferred() {
        // C and D are both valid candidates; C is nearer and wins.
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("C", 10, &["Y"]),
            routine("D", 10, &["Z"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "C", "D"]);
        let config = DetectorConfig::new(5);

        let conflicts = conflicts_of(&day, &items, &config);
        let fixed = auto_fix_conflict(&conflicts[0], &day, &items, &config).unwrap();
        assert_eq!(fixed.ordered_item_ids, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_verification_skips_insufficient_candidates() {
        // Buffer 6. Moving the 5-minute Y1 or C after A leaves dancer X
        // with only a 5-minute gap, so verification rejects them; the
        // 10-minute D is the first candidate that actually resolves it.
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("Y1", 5, &["Y"]),
            routine("C", 5, &["Y"]),
            routine("D", 10, &["Z"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "Y1", "C", "D"]);
        let config = DetectorConfig::new(6);

        let before = conflicts_of(&day, &items, &config);
        let target = before
            .iter()
            .find(|c| c.involves("X", "A", "B"))
            .unwrap()
            .clone();

        let fixed = auto_fix_conflict(&target, &day, &items, &config).unwrap();
        assert_eq!(fixed.ordered_item_ids, vec!["A", "D", "B", "Y1", "C"]);
        let after = conflicts_of(&fixed, &items, &config);
        assert!(!after.iter().any(|c| c.involves("X", "A", "B")));
        assert!(after.len() <= before.len());
    }

    #[test]
    fn test_day_fix_reaches_fixed_point() {
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("C", 5, &["Y"]),
            routine("D", 5, &["Y"]),
            routine("E", 10, &["Z"]),
            routine("F", 10, &["W"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "C", "D", "E", "F"]);
        let config = DetectorConfig::new(5);

        let report =
            auto_fix_day_conflicts(&day, &items, &config, &CancelFlag::new()).unwrap();
        assert!(report.is_clean(), "unresolved: {:?}", report.unresolved);
        // One swap can clear several conflicts; at least one is needed here.
        assert!(report.resolved >= 1);
        assert!(conflicts_of(&report.day, &items, &config).is_empty());
        // Permutation preserved.
        let mut sorted = report.day.ordered_item_ids.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_day_fix_reports_unresolvable() {
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B"]);
        let config = DetectorConfig::new(5);

        let report =
            auto_fix_day_conflicts(&day, &items, &config, &CancelFlag::new()).unwrap();
        assert_eq!(report.resolved, 0);
        assert_eq!(report.unresolved.len(), 1);
        assert!(report.moves.is_empty());
        assert_eq!(report.day.ordered_item_ids, day.ordered_item_ids);
    }

    #[test]
    fn test_cancel_stops_between_passes() {
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("C", 10, &["Y"]),
        ]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "C"]);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let report =
            auto_fix_day_conflicts(&day, &items, &DetectorConfig::new(5), &cancel).unwrap();
        assert!(report.cancelled);
        assert!(report.moves.is_empty());
        assert_eq!(report.day.ordered_item_ids, day.ordered_item_ids);
    }

    #[test]
    fn test_weekend_fixes_days_independently() {
        let items = item_map(vec![
            routine("A", 5, &["X"]),
            routine("B", 5, &["X"]),
            routine("C", 10, &["Y"]),
            routine("D", 5, &["Z"]),
            routine("E", 5, &["Z"]),
            routine("F", 10, &["W"]),
        ]);
        let saturday = DaySchedule::new("sat")
            .with_start_minute(540)
            .with_order(vec!["A", "B", "C"]);
        let sunday = DaySchedule::new("sun")
            .with_start_minute(540)
            .with_order(vec!["D", "E", "F"]);
        let config = DetectorConfig::new(5);

        let reports = auto_fix_weekend_conflicts(
            &[saturday, sunday],
            &items,
            &config,
            &CancelFlag::new(),
        )
        .unwrap();

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.is_clean());
            assert!(conflicts_of(&report.day, &items, &config).is_empty());
        }
        assert_eq!(reports[0].day.day_id, "sat");
        assert_eq!(reports[1].day.day_id, "sun");
    }

    #[test]
    fn test_overflow_not_order_fixable() {
        let conflict = Conflict::day_overflow("day-1", "A", 1300, 1260);
        let items = item_map(vec![routine("A", 760, &["X"])]);
        let day = DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A"]);

        let err =
            auto_fix_conflict(&conflict, &day, &items, &DetectorConfig::default()).unwrap_err();
        assert!(matches!(err, ScheduleError::UnresolvableConflict(_)));
    }

    #[test]
    fn test_moved_item_distance() {
        let mv = MovedItem {
            item_id: "C".to_string(),
            from_position: 5,
            to_position: 2,
        };
        assert_eq!(mv.distance(), 3);
    }
}
