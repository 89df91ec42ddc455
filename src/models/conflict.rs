//! Conflict model.
//!
//! Conflicts are derived views over a computed schedule: they are rebuilt by
//! the detector after every order change and are never a write target.

use serde::{Deserialize, Serialize};

/// A detected scheduling conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Deterministic identifier derived from the conflict's type, dancer,
    /// and affected items. Stable across re-detection of the same order.
    pub id: String,
    /// Classification of the conflict.
    pub conflict_type: ConflictType,
    /// How serious the conflict is.
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
    /// Affected item IDs, in schedule order.
    pub affected_item_ids: Vec<String>,
    /// The dancer the conflict is about, for dancer-level conflicts.
    pub dancer_id: Option<String>,
}

/// Classification of scheduling conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// A dancer finishes one routine exactly as the next begins.
    BackToBackDancer,
    /// A dancer's gap between routines is shorter than the change buffer.
    InsufficientChangeTime,
    /// The day's last item ends after the venue closing time.
    DayOverflow,
}

/// Conflict severity. Ordering is most-severe-first, so sorting ascending
/// puts critical conflicts ahead of warnings and warnings ahead of info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Must be resolved before the schedule can be finalized.
    Critical,
    /// Should be reviewed; the schedule can still run.
    Warning,
    /// Informational only.
    Info,
}

impl Conflict {
    /// A dancer with zero gap between two routines.
    pub fn back_to_back(
        dancer_id: impl Into<String>,
        earlier_item: impl Into<String>,
        later_item: impl Into<String>,
    ) -> Self {
        let dancer_id = dancer_id.into();
        let earlier = earlier_item.into();
        let later = later_item.into();
        Self {
            id: format!("b2b:{dancer_id}:{earlier}:{later}"),
            conflict_type: ConflictType::BackToBackDancer,
            severity: Severity::Critical,
            description: format!(
                "Dancer {dancer_id} is scheduled back-to-back with no change time"
            ),
            affected_item_ids: vec![earlier, later],
            dancer_id: Some(dancer_id),
        }
    }

    /// A dancer with a gap shorter than the required change buffer.
    pub fn insufficient_change_time(
        dancer_id: impl Into<String>,
        earlier_item: impl Into<String>,
        later_item: impl Into<String>,
        gap_minutes: i64,
        required_minutes: i64,
    ) -> Self {
        let dancer_id = dancer_id.into();
        let earlier = earlier_item.into();
        let later = later_item.into();
        Self {
            id: format!("chg:{dancer_id}:{earlier}:{later}"),
            conflict_type: ConflictType::InsufficientChangeTime,
            severity: Severity::Warning,
            description: format!(
                "Dancer {dancer_id} has only {gap_minutes} minutes between routines \
                 (recommended: {required_minutes})"
            ),
            affected_item_ids: vec![earlier, later],
            dancer_id: Some(dancer_id),
        }
    }

    /// The day runs past the venue closing time.
    pub fn day_overflow(
        day_id: impl Into<String>,
        last_item: impl Into<String>,
        end_minute: i64,
        close_minute: i64,
    ) -> Self {
        let day_id = day_id.into();
        Self {
            id: format!("ovf:{day_id}"),
            conflict_type: ConflictType::DayOverflow,
            severity: Severity::Info,
            description: format!(
                "Day ends {} minutes past venue close",
                end_minute - close_minute
            ),
            affected_item_ids: vec![last_item.into()],
            dancer_id: None,
        }
    }

    /// Whether this conflict is about the given dancer and unordered item pair.
    pub fn involves(&self, dancer_id: &str, item_a: &str, item_b: &str) -> bool {
        self.dancer_id.as_deref() == Some(dancer_id)
            && self.affected_item_ids.iter().any(|id| id == item_a)
            && self.affected_item_ids.iter().any(|id| id == item_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }

    #[test]
    fn test_factories() {
        let c = Conflict::back_to_back("D1", "A", "B");
        assert_eq!(c.conflict_type, ConflictType::BackToBackDancer);
        assert_eq!(c.severity, Severity::Critical);
        assert_eq!(c.affected_item_ids, vec!["A", "B"]);
        assert_eq!(c.dancer_id.as_deref(), Some("D1"));

        let w = Conflict::insufficient_change_time("D1", "A", "B", 3, 5);
        assert_eq!(w.conflict_type, ConflictType::InsufficientChangeTime);
        assert_eq!(w.severity, Severity::Warning);
        assert!(w.description.contains("only 3 minutes"));

        let o = Conflict::day_overflow("day-1", "Z", 1300, 1260);
        assert_eq!(o.conflict_type, ConflictType::DayOverflow);
        assert_eq!(o.severity, Severity::Info);
        assert!(o.dancer_id.is_none());
    }

    #[test]
    fn test_involves() {
        let c = Conflict::back_to_back("D1", "A", "B");
        assert!(c.involves("D1", "A", "B"));
        assert!(c.involves("D1", "B", "A"));
        assert!(!c.involves("D2", "A", "B"));
        assert!(!c.involves("D1", "A", "C"));
    }
}
