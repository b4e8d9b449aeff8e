//! # District Slot Layouts
//!
//! A cell's district vector has a fixed per-country length, and each slot
//! index is a fixed semantic position: slot 0 is always the national lower
//! house, slot 1 the upper legislative chamber, and so on. The mapping from
//! [`LayerType`] to slot index is data published here, not code paths.
//!
//! Changing an existing layout entry is a breaking change to every leaf
//! hash in that country; layouts may only grow.

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;
use crate::ids::CountryCode;
use crate::layer::LayerType;

/// A slot position within a cell's district vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(pub usize);

/// The fixed semantic slot layout for one country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotLayout {
    country: CountryCode,
    /// `slots[i]` is the layer occupying slot `i`.
    slots: Vec<LayerType>,
}

/// The United States layout: 14 slots over Census Block Group cells.
const US_SLOTS: [LayerType; 14] = [
    LayerType::Congressional,
    LayerType::StateUpper,
    LayerType::StateLower,
    LayerType::County,
    LayerType::City,
    LayerType::CouncilWard,
    LayerType::SchoolUnified,
    LayerType::SchoolElementary,
    LayerType::SchoolSecondary,
    LayerType::VotingPrecinct,
    LayerType::Fire,
    LayerType::Water,
    LayerType::Transit,
    LayerType::Judicial,
];

/// The United Kingdom layout: parliamentary constituencies plus local
/// government wards and councils.
const GB_SLOTS: [LayerType; 4] = [
    LayerType::Congressional,
    LayerType::County,
    LayerType::City,
    LayerType::CouncilWard,
];

impl SlotLayout {
    /// Look up the published layout for a country.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for countries without a published layout; layouts are
    /// added by release, never inferred.
    pub fn for_country(country: &CountryCode) -> Result<Self, AtlasError> {
        let slots: &[LayerType] = match country.as_str() {
            "US" => &US_SLOTS,
            "GB" => &GB_SLOTS,
            other => {
                return Err(AtlasError::InvalidInput(format!(
                    "no published slot layout for country {other}"
                )))
            }
        };
        Ok(Self {
            country: country.clone(),
            slots: slots.to_vec(),
        })
    }

    /// The country this layout belongs to.
    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    /// Number of slots (the fixed N for this country).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the layout is empty (never true for published layouts).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot a layer occupies, or `None` for layers this country does
    /// not commit (including all reference layers).
    pub fn slot_of(&self, layer: LayerType) -> Option<SlotIndex> {
        if layer.is_reference() {
            return None;
        }
        self.slots.iter().position(|l| *l == layer).map(SlotIndex)
    }

    /// The layer occupying a slot.
    pub fn layer_at(&self, slot: SlotIndex) -> Option<LayerType> {
        self.slots.get(slot.0).copied()
    }

    /// Iterate `(SlotIndex, LayerType)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, LayerType)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, l)| (SlotIndex(i), *l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> SlotLayout {
        SlotLayout::for_country(&CountryCode::new("US").unwrap()).unwrap()
    }

    #[test]
    fn us_layout_has_fourteen_slots() {
        assert_eq!(us().len(), 14);
    }

    #[test]
    fn slot_zero_is_national_lower_house() {
        assert_eq!(us().layer_at(SlotIndex(0)), Some(LayerType::Congressional));
        assert_eq!(us().slot_of(LayerType::Congressional), Some(SlotIndex(0)));
    }

    #[test]
    fn slot_one_is_upper_legislative() {
        assert_eq!(us().slot_of(LayerType::StateUpper), Some(SlotIndex(1)));
    }

    #[test]
    fn reference_layers_never_get_a_slot() {
        for layer in [LayerType::CensusTract, LayerType::Zip, LayerType::Metro] {
            assert_eq!(us().slot_of(layer), None);
        }
    }

    #[test]
    fn unslotted_proof_layers_return_none() {
        // Valid layer, but the US layout does not commit it.
        assert_eq!(us().slot_of(LayerType::Library), None);
    }

    #[test]
    fn unknown_country_is_invalid_input() {
        let zz = CountryCode::new("ZZ").unwrap();
        assert!(SlotLayout::for_country(&zz).is_err());
    }

    #[test]
    fn layout_mapping_is_a_bijection_over_its_slots() {
        let layout = us();
        for (idx, layer) in layout.iter() {
            assert_eq!(layout.slot_of(layer), Some(idx));
            assert_eq!(layout.layer_at(idx), Some(layer));
        }
    }
}
