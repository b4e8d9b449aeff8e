//! # Cell — The Merkle Leaf Unit
//!
//! A cell is one unit of the partitioning layer (US: Census Block Group)
//! together with the full list of districts it belongs to. The set of
//! cells in a country partitions the country: any point lies in exactly
//! one cell.
//!
//! Slots carry boundary *identifiers*; the commitment layer derives each
//! slot's field element (`hash_string(id)` or the canonical empty-slot
//! value) when leaves are computed. Keeping ids here keeps this crate free
//! of hash dependencies and keeps the published `district_ids` list
//! exactly what was assembled.

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, InvariantViolation};
use crate::ids::{BoundaryId, CellId, CountryCode, RegionCode};
use crate::slots::{SlotIndex, SlotLayout};

/// A fixed-length district vector. `None` is the vacant-slot placeholder
/// that hashes to the canonical zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictSlots(Vec<Option<BoundaryId>>);

impl DistrictSlots {
    /// An all-vacant vector sized for the given layout.
    pub fn vacant(layout: &SlotLayout) -> Self {
        Self(vec![None; layout.len()])
    }

    /// Fixed length N for the owning country.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has zero slots (no published layout does).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Assign a slot. The first assignment wins is NOT the rule here —
    /// a second assignment to an occupied slot is a partition violation
    /// and must be surfaced by the caller with full context, so this
    /// returns the previous occupant instead of overwriting silently.
    pub fn assign(
        &mut self,
        slot: SlotIndex,
        id: BoundaryId,
        country: &CountryCode,
    ) -> Result<Option<BoundaryId>, AtlasError> {
        let len = self.0.len();
        let entry = self
            .0
            .get_mut(slot.0)
            .ok_or(InvariantViolation::SlotOutOfRange {
                country: country.as_str().to_string(),
                slot: slot.0,
                len,
            })?;
        Ok(entry.replace(id))
    }

    /// The occupant of a slot, if any.
    pub fn get(&self, slot: SlotIndex) -> Option<&BoundaryId> {
        self.0.get(slot.0).and_then(|e| e.as_ref())
    }

    /// Iterate slot entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&BoundaryId>> {
        self.0.iter().map(|e| e.as_ref())
    }
}

/// One geographic cell with its assembled district memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Stable opaque identifier (e.g. 12-digit GEOID).
    pub cell_id: CellId,
    /// The country the cell partitions.
    pub country_code: CountryCode,
    /// The subdivision the cell sits in.
    pub region_code: RegionCode,
    /// Fixed-length district vector in slot order.
    pub district_slots: DistrictSlots,
    /// Resident population, when the partitioning source publishes it.
    pub population: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us_layout() -> SlotLayout {
        SlotLayout::for_country(&CountryCode::new("US").unwrap()).unwrap()
    }

    #[test]
    fn vacant_matches_layout_length() {
        let slots = DistrictSlots::vacant(&us_layout());
        assert_eq!(slots.len(), 14);
        assert!(slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn assign_reports_previous_occupant() {
        let us = CountryCode::new("US").unwrap();
        let mut slots = DistrictSlots::vacant(&us_layout());
        let first = slots
            .assign(SlotIndex(0), BoundaryId::new("0601"), &us)
            .unwrap();
        assert_eq!(first, None);
        let second = slots
            .assign(SlotIndex(0), BoundaryId::new("0602"), &us)
            .unwrap();
        assert_eq!(second, Some(BoundaryId::new("0601")));
        assert_eq!(slots.get(SlotIndex(0)), Some(&BoundaryId::new("0602")));
    }

    #[test]
    fn out_of_range_slot_is_invariant_violation() {
        let us = CountryCode::new("US").unwrap();
        let mut slots = DistrictSlots::vacant(&us_layout());
        let err = slots
            .assign(SlotIndex(99), BoundaryId::new("X"), &us)
            .unwrap_err();
        assert!(err.kind().is_fatal());
    }
}
