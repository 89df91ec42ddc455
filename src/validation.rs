//! Structural validation for day schedules.
//!
//! Checks the integrity of a day and its item map before editing or
//! persistence. Detects:
//! - Duplicate IDs in the running order
//! - Dangling IDs (in the order but not the item map)
//! - Unlisted items (in the item map but not the order)
//! - Non-positive durations
//! - Duplicate display numbers (base number + late suffix)

use std::collections::{HashMap, HashSet};

use crate::models::{DaySchedule, ScheduleItem};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An ID appears more than once in the running order.
    DuplicateId,
    /// The running order references an item not in the item map.
    DanglingId,
    /// An item in the map is missing from the running order.
    UnlistedItem,
    /// An item has a zero or negative duration.
    NonPositiveDuration,
    /// Two routines share the same display number.
    DuplicateDisplayNumber,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a day schedule against its item map.
///
/// Checks:
/// 1. No duplicate IDs in `ordered_item_ids`
/// 2. Every ordered ID has an item in the map
/// 3. Every item in the map appears in the order (the order is a
///    permutation of exactly the assigned items)
/// 4. Every item has `duration_minutes > 0`
/// 5. No two routines share a display number (base + suffix)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_day(day: &DaySchedule, items: &HashMap<String, ScheduleItem>) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for id in &day.ordered_item_ids {
        if !seen.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Item '{id}' appears more than once in the running order"),
            ));
        }
        if !items.contains_key(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DanglingId,
                format!("Running order references unknown item '{id}'"),
            ));
        }
    }

    for (id, item) in items {
        if !seen.contains(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnlistedItem,
                format!("Item '{id}' is assigned to the day but not in the running order"),
            ));
        }
        if item.duration_minutes() <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!(
                    "Item '{id}' has non-positive duration {} min",
                    item.duration_minutes()
                ),
            ));
        }
    }

    // Display numbers must be unique across the day's routines.
    let mut numbers: HashMap<(u32, Option<char>), &str> = HashMap::new();
    for item in items.values() {
        let Some(routine) = item.as_routine() else {
            continue;
        };
        let Some(base) = routine.routine_number else {
            continue;
        };
        if let Some(other) = numbers.insert((base, routine.late_suffix), &routine.id) {
            let display = routine.display_number().unwrap_or_default();
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateDisplayNumber,
                format!(
                    "Routines '{other}' and '{}' both display as #{display}",
                    routine.id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Break, BreakType, Routine};

    fn sample_items() -> HashMap<String, ScheduleItem> {
        let mut items: HashMap<String, ScheduleItem> = HashMap::new();
        items.insert(
            "A".into(),
            Routine::new("A", "E1")
                .with_duration(3)
                .with_number(101)
                .into(),
        );
        items.insert(
            "B".into(),
            Routine::new("B", "E2")
                .with_duration(4)
                .with_number(102)
                .into(),
        );
        items.insert(
            "BRK".into(),
            Break::new("BRK", BreakType::Lunch).with_duration(45).into(),
        );
        items
    }

    fn sample_day() -> DaySchedule {
        DaySchedule::new("day-1")
            .with_start_minute(540)
            .with_order(vec!["A", "BRK", "B"])
    }

    #[test]
    fn test_valid_day() {
        assert!(validate_day(&sample_day(), &sample_items()).is_ok());
    }

    #[test]
    fn test_duplicate_order_id() {
        let day = sample_day().with_order(vec!["A", "A", "BRK", "B"]);
        let errors = validate_day(&day, &sample_items()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_dangling_id() {
        let day = sample_day().with_order(vec!["A", "BRK", "B", "GHOST"]);
        let errors = validate_day(&day, &sample_items()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DanglingId));
    }

    #[test]
    fn test_unlisted_item() {
        let day = sample_day().with_order(vec!["A", "B"]); // BRK missing
        let errors = validate_day(&day, &sample_items()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnlistedItem));
    }

    #[test]
    fn test_non_positive_duration() {
        let mut items = sample_items();
        items.insert("Z".into(), Routine::new("Z", "E9").with_duration(0).into());
        let day = sample_day().with_order(vec!["A", "BRK", "B", "Z"]);
        let errors = validate_day(&day, &items).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NonPositiveDuration));
    }

    #[test]
    fn test_duplicate_display_number() {
        let mut items = sample_items();
        items.insert(
            "A2".into(),
            Routine::new("A2", "E3").with_duration(3).with_number(101).into(),
        );
        let day = sample_day().with_order(vec!["A", "A2", "BRK", "B"]);
        let errors = validate_day(&day, &items).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateDisplayNumber));
    }

    #[test]
    fn test_same_base_different_suffix_ok() {
        let mut items = sample_items();
        let mut late = Routine::new("A-late", "E3").with_duration(3).with_number(101);
        late.late_suffix = Some('a');
        items.insert("A-late".into(), late.into());
        let day = sample_day().with_order(vec!["A", "A-late", "BRK", "B"]);
        assert!(validate_day(&day, &items).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let mut items = sample_items();
        items.remove("BRK");
        let day = sample_day().with_order(vec!["A", "A", "BRK"]); // dup + dangling + unlisted B
        let errors = validate_day(&day, &items).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
