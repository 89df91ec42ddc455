//! Schedule item models.
//!
//! A schedule item is the unit placed into a day's running order: either a
//! competition routine (with dancers, duration, and a display number) or a
//! non-performance break (lunch, break, awards).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A schedulable unit within a competition day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScheduleItem {
    /// A competition performance entry.
    Routine(Routine),
    /// A non-performance block.
    Break(Break),
}

impl ScheduleItem {
    /// Item identifier, unique within a day.
    pub fn id(&self) -> &str {
        match self {
            ScheduleItem::Routine(r) => &r.id,
            ScheduleItem::Break(b) => &b.id,
        }
    }

    /// Stage time consumed by this item, in minutes.
    pub fn duration_minutes(&self) -> i64 {
        match self {
            ScheduleItem::Routine(r) => r.duration_minutes,
            ScheduleItem::Break(b) => b.duration_minutes,
        }
    }

    /// Whether this item is a routine.
    pub fn is_routine(&self) -> bool {
        matches!(self, ScheduleItem::Routine(_))
    }

    /// The routine, if this item is one.
    pub fn as_routine(&self) -> Option<&Routine> {
        match self {
            ScheduleItem::Routine(r) => Some(r),
            ScheduleItem::Break(_) => None,
        }
    }
}

impl From<Routine> for ScheduleItem {
    fn from(routine: Routine) -> Self {
        ScheduleItem::Routine(routine)
    }
}

impl From<Break> for ScheduleItem {
    fn from(brk: Break) -> Self {
        ScheduleItem::Break(brk)
    }
}

/// A competition routine: one performance entry with assigned dancers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    /// Unique item identifier.
    pub id: String,
    /// Identifier of the registration entry this routine was created from.
    pub entry_id: String,
    /// Routine title as printed in the program.
    pub title: String,
    /// Performance duration in minutes.
    pub duration_minutes: i64,
    /// Dancers performing in this routine.
    pub dancer_ids: BTreeSet<String>,
    /// Dance category (e.g., "Jazz", "Contemporary").
    pub category: String,
    /// Age group label.
    pub age_group: String,
    /// Competitive classification label.
    pub classification: String,
    /// Owning studio.
    pub studio_id: String,
    /// Assigned running-order number. `None` until numbering is done.
    pub routine_number: Option<u32>,
    /// Single-letter tag for late-added routines (displays as e.g. `104a`).
    pub late_suffix: Option<char>,
}

impl Routine {
    /// Creates a routine with the given item and entry IDs.
    pub fn new(id: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry_id: entry_id.into(),
            title: String::new(),
            duration_minutes: 3,
            dancer_ids: BTreeSet::new(),
            category: String::new(),
            age_group: String::new(),
            classification: String::new(),
            studio_id: String::new(),
            routine_number: None,
            late_suffix: None,
        }
    }

    /// Sets the routine title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the performance duration in minutes.
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Adds a single dancer.
    pub fn with_dancer(mut self, dancer_id: impl Into<String>) -> Self {
        self.dancer_ids.insert(dancer_id.into());
        self
    }

    /// Adds several dancers.
    pub fn with_dancers<I, S>(mut self, dancer_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dancer_ids.extend(dancer_ids.into_iter().map(Into::into));
        self
    }

    /// Sets the dance category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the age group.
    pub fn with_age_group(mut self, age_group: impl Into<String>) -> Self {
        self.age_group = age_group.into();
        self
    }

    /// Sets the classification.
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = classification.into();
        self
    }

    /// Sets the owning studio.
    pub fn with_studio(mut self, studio_id: impl Into<String>) -> Self {
        self.studio_id = studio_id.into();
        self
    }

    /// Sets the assigned running-order number.
    pub fn with_number(mut self, number: u32) -> Self {
        self.routine_number = Some(number);
        self
    }

    /// Whether this routine shares at least one dancer with `other`.
    pub fn shares_dancer(&self, other: &Routine) -> bool {
        self.dancer_ids.iter().any(|d| other.dancer_ids.contains(d))
    }

    /// Display number as printed in the program: `"104"`, or `"104a"` for a
    /// late-added routine. `None` if no number has been assigned.
    pub fn display_number(&self) -> Option<String> {
        let base = self.routine_number?;
        Some(match self.late_suffix {
            Some(suffix) => format!("{base}{suffix}"),
            None => base.to_string(),
        })
    }
}

/// A non-performance schedule block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Break {
    /// Unique item identifier.
    pub id: String,
    /// Kind of break.
    pub break_type: BreakType,
    /// Label as printed in the program (e.g., "Lunch").
    pub label: String,
    /// Duration in minutes.
    pub duration_minutes: i64,
}

/// Kind of non-performance block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    /// Meal break.
    Lunch,
    /// Short pause between blocks.
    Break,
    /// Awards ceremony.
    Awards,
}

impl Break {
    /// Creates a break with the given ID and type.
    pub fn new(id: impl Into<String>, break_type: BreakType) -> Self {
        Self {
            id: id.into(),
            break_type,
            label: String::new(),
            duration_minutes: 10,
        }
    }

    /// Sets the printed label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the duration in minutes.
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }
}
