//! # Leaf Hashes
//!
//! Two leaf shapes exist in the system:
//!
//! - **Boundary leaves** (per-layer trees):
//!   `hash_n(layer_digest, id_digest, geometry_digest, authority, provenance_digest?)`.
//!   The provenance digest participates iff the boundary carries
//!   provenance — observable in the leaf hash, but never a proof input.
//! - **Cell leaves** (region trees): `hash_n(cell_id_digest, slot_0 … slot_N)`,
//!   where an occupied slot contributes `hash_string(boundary_id)` and a
//!   vacant one the canonical empty-slot constant.
//!
//! Geometry digests are SHA-256-to-field over the canonical GeoJSON text,
//! so two sources shipping byte-different but geometrically identical
//! polygons produce the same leaf.

use atlas_core::{AtlasError, Boundary, CanonicalBytes, Cell};
use atlas_crypto::{empty_slot, hash_n, hash_string, FieldElement};
use atlas_geo::canonical_geojson;

use crate::builder::{Leaf, LeafKey};
use crate::error::MerkleError;

/// Compute the provenance-bearing leaf for a boundary.
///
/// # Errors
///
/// `ReferenceLayer` for census-tract/zip/metro boundaries — those are
/// validation context, never commitments.
pub fn boundary_leaf(boundary: &Boundary) -> Result<Leaf, MerkleError> {
    if boundary.layer_type.is_reference() {
        return Err(MerkleError::ReferenceLayer(
            boundary.layer_type.to_string(),
        ));
    }

    let mut inputs = vec![
        hash_string(boundary.layer_type.as_str()),
        hash_string(boundary.id.as_str()),
        hash_string(canonical_geojson(&boundary.geometry)),
        FieldElement::from(u64::from(boundary.authority_level.get())),
    ];
    if let Some(provenance) = &boundary.provenance {
        let canonical = CanonicalBytes::new(provenance)
            .map_err(|e| MerkleError::Canonical(e.to_string()))?;
        inputs.push(hash_string(canonical.as_bytes()));
    }

    Ok(Leaf {
        key: LeafKey {
            primary: boundary.layer_type.as_str().to_string(),
            secondary: boundary.id.as_str().to_string(),
        },
        value: hash_n(&inputs),
    })
}

/// Compute the slot-vector leaf for a cell.
///
/// Slot order is the country's fixed semantic order; the digest sequence
/// is `cell_id` first, then every slot in index order, vacant slots
/// contributing the canonical zero.
pub fn cell_leaf(cell: &Cell) -> Leaf {
    let mut inputs = Vec::with_capacity(1 + cell.district_slots.len());
    inputs.push(hash_string(cell.cell_id.as_str()));
    inputs.extend(cell.district_slots.iter().map(slot_hash));

    Leaf {
        key: LeafKey {
            primary: cell.region_code.as_str().to_string(),
            secondary: cell.cell_id.as_str().to_string(),
        },
        value: hash_n(&inputs),
    }
}

/// The field element a slot entry contributes to its cell leaf.
pub fn slot_hash(entry: Option<&atlas_core::BoundaryId>) -> FieldElement {
    match entry {
        Some(id) => hash_string(id.as_str()),
        None => empty_slot(),
    }
}

/// Convenience: `From<MerkleError>` loses no context going to `AtlasError`.
pub fn leaf_for_boundary(boundary: &Boundary) -> Result<Leaf, AtlasError> {
    boundary_leaf(boundary).map_err(AtlasError::from)
}
