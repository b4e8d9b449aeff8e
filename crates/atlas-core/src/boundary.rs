//! # Boundary — A Single Administrative Polygon
//!
//! The normalized form every upstream feature is coerced into. A
//! `Boundary` is immutable once produced by the normalizer; redistricting
//! supersedes it with a new value, it is never edited in place.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::error::AtlasError;
use crate::ids::{BoundaryId, CountryCode, RegionCode};
use crate::layer::LayerType;
use crate::temporal::Timestamp;

/// How authoritative a source is for its layer, 1 (lowest) to 5 (highest).
///
/// Federal statistical agencies sit at 5; scraped municipal portals at 1–2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuthorityLevel(u8);

impl AuthorityLevel {
    /// Construct a level in `1..=5`.
    pub fn new(level: u8) -> Result<Self, AtlasError> {
        if !(1..=5).contains(&level) {
            return Err(AtlasError::InvalidInput(format!(
                "authority level must be 1..=5, got {level}"
            )));
        }
        Ok(Self(level))
    }

    /// The numeric level.
    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Origin metadata bound into a leaf hash when present.
///
/// Binding provenance into the commitment makes "where did this polygon
/// come from" verifiable after the fact, at the cost of root churn when a
/// source re-publishes identical geometry under a new retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// The endpoint the payload was fetched from.
    pub source_url: String,
    /// SHA-256 hex of the raw upstream payload.
    pub content_hash: String,
    /// When the payload was retrieved.
    pub retrieved_at: Timestamp,
    /// The publishing organization (e.g. "US Census Bureau").
    pub organization: String,
}

/// One normalized administrative polygon.
///
/// Invariants (enforced by the normalizer, assumed everywhere else):
/// geometry is a valid OGC polygon — closed rings, no self-intersection,
/// exterior counter-clockwise, holes clockwise — with coordinates inside
/// `[-180, 180] × [-90, 90]` snapped to 6 decimal degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    /// Opaque identifier, unique within `(country, layer_type)`.
    pub id: BoundaryId,
    /// Display name from the upstream source.
    pub name: String,
    /// The layer this boundary belongs to.
    pub layer_type: LayerType,
    /// The country that publishes the boundary.
    pub country: CountryCode,
    /// Subdivision the boundary sits in, when the layer is sub-national.
    pub region: Option<RegionCode>,
    /// Normalized geometry in WGS84.
    pub geometry: MultiPolygon<f64>,
    /// Release year of the upstream vintage.
    pub vintage: u16,
    /// How authoritative the source is.
    pub authority_level: AuthorityLevel,
    /// Origin metadata; bound into the leaf hash when present.
    pub provenance: Option<Provenance>,
}

impl Boundary {
    /// The jurisdiction path used in logs and reports:
    /// `US/US-CA/congressional` or `US/congressional` for national layers.
    pub fn jurisdiction(&self) -> String {
        match &self.region {
            Some(r) => format!("{}/{}/{}", self.country, r, self.layer_type),
            None => format!("{}/{}", self.country, self.layer_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn sample() -> Boundary {
        Boundary {
            id: BoundaryId::new("0601"),
            name: "District 1".into(),
            layer_type: LayerType::Congressional,
            country: CountryCode::new("US").unwrap(),
            region: Some(RegionCode::new("US-CA").unwrap()),
            geometry: MultiPolygon(vec![polygon![
                (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
            ]]),
            vintage: 2024,
            authority_level: AuthorityLevel::new(5).unwrap(),
            provenance: None,
        }
    }

    #[test]
    fn authority_level_bounds() {
        assert!(AuthorityLevel::new(0).is_err());
        assert!(AuthorityLevel::new(6).is_err());
        assert_eq!(AuthorityLevel::new(3).unwrap().get(), 3);
    }

    #[test]
    fn jurisdiction_includes_region_when_present() {
        assert_eq!(sample().jurisdiction(), "US/US-CA/congressional");
        let mut national = sample();
        national.region = None;
        assert_eq!(national.jurisdiction(), "US/congressional");
    }

    #[test]
    fn boundary_serde_round_trip() {
        let b = sample();
        let json = serde_json::to_string(&b).unwrap();
        let back: Boundary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, b.id);
        assert_eq!(back.geometry, b.geometry);
    }
}
