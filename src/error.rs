//! Error taxonomy for the scheduling core.
//!
//! Every error is recoverable: callers surface them as inline validation
//! messages or reload prompts, and a failed operation leaves the working
//! copy unchanged.

/// Errors produced by the scheduling core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The day order references an item that is not in the item map.
    #[error("item '{0}' is not in the item map")]
    MissingItem(String),

    /// A reorder target index is outside `[0, len]`.
    #[error("index {index} out of range (valid: 0..={max})")]
    InvalidIndex { index: usize, max: usize },

    /// An inserted item's ID collides with an item already in the day.
    #[error("item '{0}' already exists in this day")]
    DuplicateItem(String),

    /// The base-number + suffix combination already exists in the day.
    #[error("display number {base}{suffix} already exists in this day")]
    DuplicateSuffix { base: u32, suffix: char },

    /// A late suffix must be a single ASCII lowercase letter.
    #[error("'{0}' is not a valid late suffix (expected a-z)")]
    InvalidSuffix(char),

    /// Late insertion anchored on a routine that has no assigned number.
    #[error("routine '{0}' has no assigned number; cannot anchor a late entry")]
    UnnumberedAnchor(String),

    /// The schedule is final; editing requires the override flag.
    #[error("schedule is final; pass the override flag to force-edit")]
    ScheduleLocked,

    /// Auto-fix found no safe swap candidate for the conflict.
    #[error("no safe swap candidate for conflict '{0}'")]
    UnresolvableConflict(String),

    /// The stored schedule changed since the working copy was loaded.
    #[error("stored schedule is at version {stored}, working copy was loaded at {loaded}")]
    StaleSchedule { stored: u64, loaded: u64 },

    /// The repository has no schedule for the requested day.
    #[error("day '{0}' not found in storage")]
    UnknownDay(String),
}
