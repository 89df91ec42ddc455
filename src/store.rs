//! Schedule order store.
//!
//! [`EditSession`] holds a per-editing-session working copy of one day's
//! running order. Every mutation operates on the working copy only and
//! synchronously recomputes the derived views (time slots and conflicts),
//! so the UI gets live feedback without waiting on persistence. Nothing is
//! written durably until an explicit [`EditSession::commit`], which performs
//! a compare-and-swap against the stored version: if another editor saved
//! first, the commit fails with `StaleSchedule` and the local working copy
//! is preserved so no unsaved intent is lost.
//!
//! A failed mutation is a no-op: the working copy is untouched and the
//! previous views remain valid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::{detect_conflicts, DetectorConfig};
use crate::error::ScheduleError;
use crate::models::{Conflict, DaySchedule, Routine, ScheduleItem, ScheduleStatus};
use crate::timing::{compute_slots, ComputedSlot};

/// A stored day plus its persistence version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedDay {
    /// The persisted schedule.
    pub day: DaySchedule,
    /// Monotonically increasing version, bumped on every successful store.
    pub version: u64,
}

/// Persistence seam for day schedules.
///
/// The store writes through this trait; the backing implementation (database
/// table, file, test double) is an external collaborator. Implementations
/// must make `store` atomic — the full order is persisted or none of it —
/// and fail fast rather than hang.
pub trait ScheduleRepository {
    /// Loads a day and its current version.
    fn load(&self, day_id: &str) -> Result<VersionedDay, ScheduleError>;

    /// Stores a day if its current version equals `expected_version`.
    ///
    /// Returns the new version on success, `StaleSchedule` if another
    /// writer got there first. A day not yet stored has version 0.
    fn store(&mut self, day: &DaySchedule, expected_version: u64)
        -> Result<u64, ScheduleError>;
}

/// In-memory repository for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    days: HashMap<String, VersionedDay>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleRepository for InMemoryRepository {
    fn load(&self, day_id: &str) -> Result<VersionedDay, ScheduleError> {
        self.days
            .get(day_id)
            .cloned()
            .ok_or_else(|| ScheduleError::UnknownDay(day_id.to_string()))
    }

    fn store(
        &mut self,
        day: &DaySchedule,
        expected_version: u64,
    ) -> Result<u64, ScheduleError> {
        let stored = self.days.get(&day.day_id).map(|v| v.version).unwrap_or(0);
        if stored != expected_version {
            return Err(ScheduleError::StaleSchedule {
                stored,
                loaded: expected_version,
            });
        }
        let version = stored + 1;
        self.days.insert(
            day.day_id.clone(),
            VersionedDay {
                day: day.clone(),
                version,
            },
        );
        Ok(version)
    }
}

/// An editing session over one day's running order.
///
/// Construct one per editor (per client connection); sessions share no
/// mutable state. All mutations are in-memory until `commit`.
#[derive(Debug, Clone)]
pub struct EditSession {
    committed: DaySchedule,
    working: DaySchedule,
    items: HashMap<String, ScheduleItem>,
    version: u64,
    detector: DetectorConfig,
    slots: Vec<ComputedSlot>,
    conflicts: Vec<Conflict>,
}

impl EditSession {
    /// Starts a session on a day not yet persisted (version 0).
    pub fn new(
        day: DaySchedule,
        items: HashMap<String, ScheduleItem>,
        detector: DetectorConfig,
    ) -> Result<Self, ScheduleError> {
        Self::with_version(day, items, detector, 0)
    }

    /// Starts a session from a repository-loaded day.
    pub fn open(
        repo: &dyn ScheduleRepository,
        day_id: &str,
        items: HashMap<String, ScheduleItem>,
        detector: DetectorConfig,
    ) -> Result<Self, ScheduleError> {
        let loaded = repo.load(day_id)?;
        Self::with_version(loaded.day, items, detector, loaded.version)
    }

    fn with_version(
        day: DaySchedule,
        items: HashMap<String, ScheduleItem>,
        detector: DetectorConfig,
        version: u64,
    ) -> Result<Self, ScheduleError> {
        let slots = compute_slots(&day, &items)?;
        let conflicts = detect_conflicts(&day, &items, &slots, &detector)?;
        Ok(Self {
            committed: day.clone(),
            working: day,
            items,
            version,
            detector,
            slots,
            conflicts,
        })
    }

    /// The working copy of the day.
    pub fn working(&self) -> &DaySchedule {
        &self.working
    }

    /// The items assigned to the day.
    pub fn items(&self) -> &HashMap<String, ScheduleItem> {
        &self.items
    }

    /// Computed time slots for the working order.
    pub fn slots(&self) -> &[ComputedSlot] {
        &self.slots
    }

    /// Conflicts in the working order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Version the working copy was loaded at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the working copy differs from the last committed state.
    pub fn is_dirty(&self) -> bool {
        self.working.ordered_item_ids != self.committed.ordered_item_ids
            || self.working.status != self.committed.status
    }

    fn check_lock(&self, force: bool) -> Result<(), ScheduleError> {
        if self.working.is_final() && !force {
            return Err(ScheduleError::ScheduleLocked);
        }
        Ok(())
    }

    /// Recomputes derived views after a successful mutation.
    fn refresh(&mut self) -> Result<(), ScheduleError> {
        self.slots = compute_slots(&self.working, &self.items)?;
        self.conflicts = detect_conflicts(&self.working, &self.items, &self.slots, &self.detector)?;
        Ok(())
    }

    /// Moves an item to a new position in the running order.
    ///
    /// The item is removed and reinserted at `to_index`; valid indices are
    /// `[0, len]`. `force` permits editing a final schedule.
    pub fn move_item(
        &mut self,
        item_id: &str,
        to_index: usize,
        force: bool,
    ) -> Result<(), ScheduleError> {
        self.check_lock(force)?;
        let len = self.working.len();
        if to_index > len {
            return Err(ScheduleError::InvalidIndex {
                index: to_index,
                max: len,
            });
        }
        let from = self
            .working
            .position_of(item_id)
            .ok_or_else(|| ScheduleError::MissingItem(item_id.to_string()))?;

        let order = &mut self.working.ordered_item_ids;
        let id = order.remove(from);
        order.insert(to_index.min(order.len()), id);

        debug!(day = %self.working.day_id, item = item_id, from, to = to_index, "moved item");
        self.refresh()
    }

    /// Inserts a late-added routine after a numbered routine, behind any of
    /// the anchor's earlier late entries so suffix order matches running
    /// order.
    ///
    /// The routine inherits the anchor's number plus the given suffix, so it
    /// displays as e.g. `104a`. Fails with `DuplicateItem` if the routine's
    /// ID is already in the day, `DuplicateSuffix` if that display number
    /// already exists, `UnnumberedAnchor` if the anchor has no number,
    /// `InvalidSuffix` unless the suffix is `a`-`z`.
    pub fn insert_late(
        &mut self,
        mut routine: Routine,
        after_item_id: &str,
        suffix: char,
        force: bool,
    ) -> Result<(), ScheduleError> {
        self.check_lock(force)?;
        if !suffix.is_ascii_lowercase() {
            return Err(ScheduleError::InvalidSuffix(suffix));
        }
        if self.items.contains_key(&routine.id) {
            return Err(ScheduleError::DuplicateItem(routine.id));
        }
        let anchor_pos = self
            .working
            .position_of(after_item_id)
            .ok_or_else(|| ScheduleError::MissingItem(after_item_id.to_string()))?;
        let base = self
            .items
            .get(after_item_id)
            .and_then(ScheduleItem::as_routine)
            .and_then(|r| r.routine_number)
            .ok_or_else(|| ScheduleError::UnnumberedAnchor(after_item_id.to_string()))?;

        let taken = self.items.values().filter_map(ScheduleItem::as_routine).any(|r| {
            r.routine_number == Some(base) && r.late_suffix == Some(suffix)
        });
        if taken {
            return Err(ScheduleError::DuplicateSuffix { base, suffix });
        }

        // Skip past the anchor's existing late entries, so 104b lands after
        // 104a rather than between 104 and 104a.
        let mut insert_pos = anchor_pos + 1;
        while let Some(id) = self.working.ordered_item_ids.get(insert_pos) {
            let is_late_sibling = self
                .items
                .get(id)
                .and_then(ScheduleItem::as_routine)
                .is_some_and(|r| r.routine_number == Some(base) && r.late_suffix.is_some());
            if !is_late_sibling {
                break;
            }
            insert_pos += 1;
        }

        routine.routine_number = Some(base);
        routine.late_suffix = Some(suffix);
        let id = routine.id.clone();
        self.items.insert(id.clone(), routine.into());
        self.working.ordered_item_ids.insert(insert_pos, id.clone());

        debug!(day = %self.working.day_id, item = %id, display = %format!("{base}{suffix}"), "inserted late routine");
        self.refresh()
    }

    /// Removes an item from the day.
    pub fn remove(&mut self, item_id: &str, force: bool) -> Result<(), ScheduleError> {
        self.check_lock(force)?;
        let pos = self
            .working
            .position_of(item_id)
            .ok_or_else(|| ScheduleError::MissingItem(item_id.to_string()))?;
        self.working.ordered_item_ids.remove(pos);
        self.items.remove(item_id);

        debug!(day = %self.working.day_id, item = item_id, "removed item");
        self.refresh()
    }

    /// Replaces the working order wholesale (e.g., with an auto-fix result).
    ///
    /// The new order must be a permutation of the current one.
    pub fn apply_order(
        &mut self,
        order: Vec<String>,
        force: bool,
    ) -> Result<(), ScheduleError> {
        self.check_lock(force)?;
        let mut expected = self.working.ordered_item_ids.clone();
        let mut proposed = order.clone();
        expected.sort();
        proposed.sort();
        if expected != proposed {
            let odd = expected
                .iter()
                .find(|id| !proposed.contains(id))
                .or_else(|| proposed.iter().find(|id| !expected.contains(id)))
                .cloned()
                .unwrap_or_else(|| self.working.day_id.clone());
            return Err(ScheduleError::MissingItem(odd));
        }
        self.working.ordered_item_ids = order;
        self.refresh()
    }

    /// Locks the schedule: `tentative → final`.
    pub fn lock(&mut self) {
        self.working.status = ScheduleStatus::Final;
    }

    /// Unlocks the schedule: `final → tentative`.
    pub fn unlock(&mut self) {
        self.working.status = ScheduleStatus::Tentative;
    }

    /// Persists the working copy.
    ///
    /// Compare-and-swap: fails with `StaleSchedule` if the stored version
    /// moved since this session loaded, leaving the working copy intact so
    /// the editor can reload and reapply. On success the session's committed
    /// baseline and version advance.
    pub fn commit(&mut self, repo: &mut dyn ScheduleRepository) -> Result<u64, ScheduleError> {
        let version = repo.store(&self.working, self.version)?;
        self.version = version;
        self.committed = self.working.clone();
        info!(day = %self.working.day_id, version, "committed schedule");
        Ok(version)
    }

    /// Reverts the working copy to the last committed state.
    pub fn discard(&mut self) -> Result<(), ScheduleError> {
        self.working = self.committed.clone();
        debug!(day = %self.working.day_id, "discarded working copy");
        self.refresh()
    }
}
