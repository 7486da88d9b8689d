//! # Reservation Conflict Engine
//!
//! Time slots are half-open `[start, end)` intervals on a single day, so a
//! booking ending at 10:00 and one starting at 10:00 do not collide.
//! `SlotIndex` holds the blocking slots of one (amenity, date), keeps them
//! sorted by start, and answers conflict queries with a binary search.

use chrono::NaiveTime;

use crate::domain::error::{DomainError, DomainResult};

pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::validation(format!(
                "Start time {} must be before end time {}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `self` lies entirely within `[open, close]`
    pub fn within(&self, open: NaiveTime, close: NaiveTime) -> bool {
        self.start >= open && self.end <= close
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Sorted set of non-overlapping blocking slots for one amenity on one date
#[derive(Debug, Clone, Default)]
pub struct SlotIndex<K> {
    entries: Vec<(TimeSlot, K)>,
}

impl<K: Clone> SlotIndex<K> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Build from arbitrary slots; only `insert` enforces exclusivity
    pub fn from_slots(slots: impl IntoIterator<Item = (TimeSlot, K)>) -> Self {
        let mut entries: Vec<(TimeSlot, K)> = slots.into_iter().collect();
        entries.sort_by_key(|(slot, _)| (slot.start, slot.end));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &(TimeSlot, K)> {
        self.entries.iter()
    }

    /// First blocking entry overlapping `slot`, if any
    pub fn first_conflict(&self, slot: &TimeSlot) -> Option<&(TimeSlot, K)> {
        // Entries starting at or after slot.end cannot overlap
        let upper = self.entries.partition_point(|(s, _)| s.start < slot.end);
        self.entries[..upper].iter().find(|(s, _)| s.overlaps(slot))
    }

    /// Insert `slot`, refusing if it overlaps an existing entry
    pub fn insert(&mut self, slot: TimeSlot, key: K) -> Result<(), K> {
        if let Some((_, existing)) = self.first_conflict(&slot) {
            return Err(existing.clone());
        }
        let idx = self.entries.partition_point(|(s, _)| s.start < slot.start);
        self.entries.insert(idx, (slot, key));
        Ok(())
    }

    /// Gaps between blocking slots inside opening hours
    pub fn free_windows(&self, open: NaiveTime, close: NaiveTime) -> Vec<TimeSlot> {
        let mut windows = Vec::new();
        let mut cursor = open;

        for (slot, _) in &self.entries {
            if slot.end <= open || slot.start >= close {
                continue;
            }
            if slot.start > cursor {
                windows.push(TimeSlot { start: cursor, end: slot.start.min(close) });
            }
            if slot.end > cursor {
                cursor = slot.end;
            }
        }

        if cursor < close {
            windows.push(TimeSlot { start: cursor, end: close });
        }

        windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TimeSlot {
        TimeSlot::new(t(sh, sm), t(eh, em)).unwrap()
    }

    #[test]
    fn test_slot_requires_start_before_end() {
        assert!(TimeSlot::new(t(10, 0), t(10, 0)).is_err());
        assert!(TimeSlot::new(t(11, 0), t(10, 0)).is_err());
        assert_eq!(slot(9, 30, 11, 0).minutes(), 90);
    }

    #[test]
    fn test_touching_slots_do_not_overlap() {
        assert!(!slot(9, 0, 10, 0).overlaps(&slot(10, 0, 11, 0)));
        assert!(!slot(10, 0, 11, 0).overlaps(&slot(9, 0, 10, 0)));
    }

    #[test]
    fn test_partial_and_nested_overlaps() {
        let base = slot(10, 0, 12, 0);
        assert!(base.overlaps(&slot(11, 0, 13, 0)));
        assert!(base.overlaps(&slot(9, 0, 10, 30)));
        assert!(base.overlaps(&slot(10, 30, 11, 0)));
        assert!(base.overlaps(&slot(8, 0, 14, 0)));
        assert!(base.overlaps(&base));
    }

    #[test]
    fn test_index_insert_and_conflict() {
        let mut index = SlotIndex::new();
        index.insert(slot(10, 0, 11, 0), "a").unwrap();
        index.insert(slot(8, 0, 9, 0), "b").unwrap();
        index.insert(slot(9, 0, 10, 0), "c").unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.insert(slot(9, 30, 10, 30), "d"), Err("c"));
        assert_eq!(index.first_conflict(&slot(10, 59, 12, 0)).map(|(_, k)| *k), Some("a"));
        assert!(index.first_conflict(&slot(11, 0, 12, 0)).is_none());

        let starts: Vec<NaiveTime> = index.slots().map(|(s, _)| s.start).collect();
        assert_eq!(starts, vec![t(8, 0), t(9, 0), t(10, 0)]);
    }

    #[test]
    fn test_conflict_with_long_earlier_slot() {
        let index = SlotIndex::from_slots(vec![(slot(6, 0, 20, 0), 1), (slot(12, 0, 13, 0), 2)]);
        assert_eq!(index.first_conflict(&slot(18, 0, 19, 0)).map(|(_, k)| *k), Some(1));
    }

    #[test]
    fn test_free_windows() {
        let index = SlotIndex::from_slots(vec![
            (slot(9, 0, 10, 0), ()),
            (slot(12, 0, 13, 30), ()),
            (slot(13, 30, 14, 0), ()),
        ]);

        let free = index.free_windows(t(8, 0), t(18, 0));
        assert_eq!(
            free,
            vec![slot(8, 0, 9, 0), slot(10, 0, 12, 0), slot(14, 0, 18, 0)]
        );
    }

    #[test]
    fn test_free_windows_fully_booked_and_empty() {
        let booked = SlotIndex::from_slots(vec![(slot(8, 0, 18, 0), ())]);
        assert!(booked.free_windows(t(8, 0), t(18, 0)).is_empty());

        let empty: SlotIndex<()> = SlotIndex::new();
        assert_eq!(empty.free_windows(t(8, 0), t(18, 0)), vec![slot(8, 0, 18, 0)]);
    }
}
