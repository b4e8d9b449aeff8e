//! # Cell Assembler
//!
//! Spatially joins the partitioning layer (US: Census Block Groups)
//! against every district layer the country commits, producing one
//! [`Cell`] per partition unit with a fully populated slot vector.
//!
//! Join rule: a cell belongs to the unique boundary of a layer that
//! contains the cell's representative point — an interior point, never
//! the centroid, because a centroid can fall outside a concave polygon.
//! A layer not covering the point leaves its slot vacant; two boundaries
//! of one layer covering it is a partition violation and aborts the
//! build.

use std::collections::BTreeMap;

use geo::{InteriorPoint, MultiPolygon};

use atlas_core::{
    AtlasError, Boundary, BoundaryId, Cell, CellId, CountryCode, DistrictSlots,
    InvariantViolation, LayerType, RegionCode, SlotLayout,
};
use atlas_geo::GeometryIndex;

/// One unit of the partitioning layer.
#[derive(Debug, Clone)]
pub struct PartitionUnit {
    /// Stable cell identifier (e.g. 12-digit GEOID).
    pub cell_id: CellId,
    /// Subdivision the unit belongs to.
    pub region_code: RegionCode,
    /// Normalized unit geometry.
    pub geometry: MultiPolygon<f64>,
    /// Resident population, when published.
    pub population: Option<u64>,
}

/// Assemble the cell set for a country.
///
/// `layers` maps each committed layer to its normalized boundaries.
/// Layers without a slot in the country's layout are ignored (reference
/// layers never arrive here; unslotted proof layers are simply not
/// committed by this country).
///
/// # Errors
///
/// - `InvalidInput` when the partition itself has overlapping units or a
///   unit has no interior point.
/// - `InvariantViolated(OverlappingBoundaries)` when two boundaries of
///   one layer contain the same representative point.
pub fn assemble_cells(
    country: &CountryCode,
    units: &[PartitionUnit],
    layers: &BTreeMap<LayerType, Vec<Boundary>>,
) -> Result<Vec<Cell>, AtlasError> {
    let layout = SlotLayout::for_country(country)?;

    // The partition invariant holds for the partitioning layer itself.
    let unit_index = GeometryIndex::new(units.iter().map(|u| u.geometry.clone()).collect());
    unit_index.assert_partition().map_err(|e| {
        AtlasError::InvalidInput(format!("partitioning layer of {country}: {e}"))
    })?;

    // One spatial index per slotted layer.
    let mut layer_indexes: BTreeMap<LayerType, (GeometryIndex, Vec<BoundaryId>)> = BTreeMap::new();
    for (layer, boundaries) in layers {
        if layout.slot_of(*layer).is_none() {
            tracing::debug!(%layer, %country, "layer has no slot in this country; skipping");
            continue;
        }
        let index = GeometryIndex::new(boundaries.iter().map(|b| b.geometry.clone()).collect());
        let ids = boundaries.iter().map(|b| b.id.clone()).collect();
        layer_indexes.insert(*layer, (index, ids));
    }

    let mut cells = Vec::with_capacity(units.len());
    for unit in units {
        let point = unit.geometry.interior_point().ok_or_else(|| {
            AtlasError::InvalidInput(format!(
                "partition unit {} has no interior point",
                unit.cell_id
            ))
        })?;

        let mut slots = DistrictSlots::vacant(&layout);
        for (layer, (index, ids)) in &layer_indexes {
            let coverage = index.covering(point);
            match coverage.containing.as_slice() {
                // Layer vacant here: canonical zero stays in the slot.
                [] => {}
                [unique] => {
                    let slot = layout
                        .slot_of(*layer)
                        .ok_or_else(|| AtlasError::InvalidInput(format!(
                            "layer {layer} lost its slot mid-assembly"
                        )))?;
                    slots.assign(slot, ids[*unique].clone(), country)?;
                }
                many => {
                    let mut boundary_ids: Vec<BoundaryId> =
                        many.iter().map(|i| ids[*i].clone()).collect();
                    boundary_ids.sort();
                    return Err(AtlasError::InvariantViolated(
                        InvariantViolation::OverlappingBoundaries {
                            layer: *layer,
                            cell_id: unit.cell_id.clone(),
                            boundary_ids,
                        },
                    ));
                }
            }
        }

        cells.push(Cell {
            cell_id: unit.cell_id.clone(),
            country_code: country.clone(),
            region_code: unit.region_code.clone(),
            district_slots: slots,
            population: unit.population,
        });
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{AuthorityLevel, ErrorKind, SlotIndex};
    use geo::polygon;

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
        ]])
    }

    fn us() -> CountryCode {
        CountryCode::new("US").unwrap()
    }

    fn unit(id: &str, x0: f64) -> PartitionUnit {
        PartitionUnit {
            cell_id: CellId::new(id),
            region_code: RegionCode::new("US-CA").unwrap(),
            geometry: square(x0, 0.0, 1.0),
            population: Some(1200),
        }
    }

    fn boundary(id: &str, layer: LayerType, geometry: MultiPolygon<f64>) -> Boundary {
        Boundary {
            id: BoundaryId::new(id),
            name: id.to_string(),
            layer_type: layer,
            country: us(),
            region: Some(RegionCode::new("US-CA").unwrap()),
            geometry,
            vintage: 2024,
            authority_level: AuthorityLevel::new(5).unwrap(),
            provenance: None,
        }
    }

    #[test]
    fn joins_each_cell_to_its_containing_district() {
        // Two congressional districts, each covering one cell.
        let mut layers = BTreeMap::new();
        layers.insert(
            LayerType::Congressional,
            vec![
                boundary("0601", LayerType::Congressional, square(0.0, 0.0, 1.0)),
                boundary("0602", LayerType::Congressional, square(1.0, 0.0, 1.0)),
            ],
        );
        let cells = assemble_cells(&us(), &[unit("c1", 0.0), unit("c2", 1.0)], &layers).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(
            cells[0].district_slots.get(SlotIndex(0)),
            Some(&BoundaryId::new("0601"))
        );
        assert_eq!(
            cells[1].district_slots.get(SlotIndex(0)),
            Some(&BoundaryId::new("0602"))
        );
    }

    #[test]
    fn uncovered_layers_leave_the_slot_vacant() {
        // A fire district exists but covers neither cell.
        let mut layers = BTreeMap::new();
        layers.insert(
            LayerType::Fire,
            vec![boundary("F9", LayerType::Fire, square(50.0, 50.0, 1.0))],
        );
        let cells = assemble_cells(&us(), &[unit("c1", 0.0)], &layers).unwrap();
        let fire_slot = SlotLayout::for_country(&us())
            .unwrap()
            .slot_of(LayerType::Fire)
            .unwrap();
        assert_eq!(cells[0].district_slots.get(fire_slot), None);
    }

    #[test]
    fn overlapping_boundaries_abort_with_full_context() {
        // Two congressional districts both contain cell c1's point.
        let mut layers = BTreeMap::new();
        layers.insert(
            LayerType::Congressional,
            vec![
                boundary("B", LayerType::Congressional, square(0.0, 0.0, 1.0)),
                boundary("A", LayerType::Congressional, square(0.0, 0.0, 2.0)),
            ],
        );
        let err = assemble_cells(&us(), &[unit("060370001001", 0.0)], &layers).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolated);
        match err {
            AtlasError::InvariantViolated(InvariantViolation::OverlappingBoundaries {
                layer,
                cell_id,
                boundary_ids,
            }) => {
                assert_eq!(layer, LayerType::Congressional);
                assert_eq!(cell_id, CellId::new("060370001001"));
                // Sorted, both named.
                assert_eq!(
                    boundary_ids,
                    vec![BoundaryId::new("A"), BoundaryId::new("B")]
                );
            }
            other => panic!("wrong violation: {other:?}"),
        }
    }

    #[test]
    fn overlapping_partition_units_are_rejected_up_front() {
        let layers = BTreeMap::new();
        let err = assemble_cells(
            &us(),
            &[unit("c1", 0.0), unit("c2", 0.5)],
            &layers,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn unslotted_layers_are_ignored() {
        // Library districts are a valid layer the US layout does not commit.
        let mut layers = BTreeMap::new();
        layers.insert(
            LayerType::Library,
            vec![boundary("L1", LayerType::Library, square(0.0, 0.0, 1.0))],
        );
        let cells = assemble_cells(&us(), &[unit("c1", 0.0)], &layers).unwrap();
        assert!(cells[0].district_slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn population_flows_through() {
        let cells = assemble_cells(&us(), &[unit("c1", 0.0)], &BTreeMap::new()).unwrap();
        assert_eq!(cells[0].population, Some(1200));
    }
}
