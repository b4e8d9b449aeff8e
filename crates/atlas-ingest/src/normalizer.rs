//! # Boundary Normalizer
//!
//! Turns a raw FeatureCollection into an ordered sequence of canonical
//! [`Boundary`] values. Output order follows upstream delivery order —
//! the builder applies its own canonical sort later, so delivery order
//! only matters for reproducing logs.
//!
//! Per-feature failures split two ways: geometry and id problems drop the
//! feature with a warning; an unresolvable region halts the whole layer
//! unless the spec routes unknowns to the `None` bucket. If the drop rate
//! exceeds the configured ceiling, the layer itself is rejected — a
//! source that loses more than a percent of its features is not a source
//! to commit.

use serde_json::Value;

use atlas_core::{AtlasError, Boundary, BoundaryId, Provenance};
use atlas_geo::{normalize_geometry, parse_feature_collection, ParsedGeometry};

use crate::error::NormalizeError;
use crate::layer_spec::LayerSpec;

/// Normalizer limits.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Maximum tolerated fraction of dropped features per layer.
    pub max_drop_ratio: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_drop_ratio: 0.01,
        }
    }
}

/// A feature that did not survive normalization.
#[derive(Debug, Clone)]
pub struct DroppedFeature {
    /// Index in upstream delivery order.
    pub feature_index: usize,
    /// Why it was dropped.
    pub reason: NormalizeError,
}

/// The result of normalizing one layer.
#[derive(Debug)]
pub struct NormalizeOutcome {
    /// Surviving boundaries, in upstream delivery order.
    pub boundaries: Vec<Boundary>,
    /// Dropped features with reasons.
    pub dropped: Vec<DroppedFeature>,
}

impl NormalizeOutcome {
    /// Fraction of input features that were dropped.
    pub fn drop_ratio(&self) -> f64 {
        let total = self.boundaries.len() + self.dropped.len();
        if total == 0 {
            0.0
        } else {
            self.dropped.len() as f64 / total as f64
        }
    }
}

/// Normalize one upstream payload against its layer spec.
///
/// `provenance`, when supplied, is attached verbatim to every surviving
/// boundary and will be bound into their leaf hashes downstream.
///
/// # Errors
///
/// - `InvalidInput` when the payload is not a FeatureCollection.
/// - `InvalidInput` (from `UnknownRegion`) when a region cannot be
///   resolved and the spec forbids unknowns.
/// - `ValidationFailed` when the drop rate exceeds the ceiling.
pub fn normalize_layer(
    payload: &Value,
    spec: &LayerSpec,
    provenance: Option<&Provenance>,
    config: &NormalizerConfig,
) -> Result<NormalizeOutcome, AtlasError> {
    let features = parse_feature_collection(payload).map_err(AtlasError::from)?;
    let total = features.len();

    let mut boundaries = Vec::with_capacity(total);
    let mut dropped = Vec::new();

    for (feature_index, feature) in features.into_iter().enumerate() {
        let raw_geometry = match feature.geometry {
            ParsedGeometry::Polygonal(mp) => mp,
            ParsedGeometry::Unsupported(gtype) => {
                drop_feature(
                    &mut dropped,
                    NormalizeError::InvalidGeometry {
                        feature_index,
                        reason: format!("unsupported geometry type {gtype}"),
                    },
                    spec,
                );
                continue;
            }
            ParsedGeometry::Missing => {
                drop_feature(
                    &mut dropped,
                    NormalizeError::InvalidGeometry {
                        feature_index,
                        reason: "feature has no geometry".into(),
                    },
                    spec,
                );
                continue;
            }
        };

        let Some(id) = LayerSpec::resolve_attribute(&spec.id_attributes, &feature.properties)
        else {
            drop_feature(&mut dropped, NormalizeError::MissingId { feature_index }, spec);
            continue;
        };

        let geometry = match normalize_geometry(&raw_geometry) {
            Ok(g) => g,
            Err(e) => {
                drop_feature(
                    &mut dropped,
                    NormalizeError::InvalidGeometry {
                        feature_index,
                        reason: e.to_string(),
                    },
                    spec,
                );
                continue;
            }
        };

        let region = spec
            .resolve_region(&id, &feature.properties)
            .map_err(|id| {
                AtlasError::InvalidInput(NormalizeError::UnknownRegion { id }.to_string())
            })?;

        let name = LayerSpec::resolve_attribute(&spec.name_attributes, &feature.properties)
            .unwrap_or_else(|| id.clone());

        boundaries.push(Boundary {
            id: BoundaryId::new(id),
            name,
            layer_type: spec.layer,
            country: spec.country.clone(),
            region,
            geometry,
            vintage: spec.vintage,
            authority_level: spec.authority_level,
            provenance: provenance.cloned(),
        });
    }

    let outcome = NormalizeOutcome {
        boundaries,
        dropped,
    };
    if outcome.drop_ratio() > config.max_drop_ratio {
        return Err(AtlasError::ValidationFailed {
            layer: spec.layer.to_string(),
            score: 100.0 * (1.0 - outcome.drop_ratio()),
            detail: format!(
                "dropped {}/{} features, above the {:.2}% ceiling",
                outcome.dropped.len(),
                total,
                config.max_drop_ratio * 100.0
            ),
        });
    }
    Ok(outcome)
}

fn drop_feature(dropped: &mut Vec<DroppedFeature>, reason: NormalizeError, spec: &LayerSpec) {
    tracing::warn!(layer = %spec.layer, %reason, "dropping feature");
    let feature_index = match &reason {
        NormalizeError::InvalidGeometry { feature_index, .. }
        | NormalizeError::MissingId { feature_index } => *feature_index,
        // UnknownRegion halts the layer before reaching here.
        NormalizeError::UnknownRegion { .. } => usize::MAX,
    };
    dropped.push(DroppedFeature {
        feature_index,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{AuthorityLevel, CountryCode, ErrorKind, LayerType};
    use crate::layer_spec::RegionRule;

    fn spec() -> LayerSpec {
        LayerSpec {
            layer: LayerType::Congressional,
            country: CountryCode::new("US").unwrap(),
            id_attributes: vec!["GEOID".into()],
            name_attributes: vec!["NAME".into()],
            region_rule: RegionRule::Fixed(None),
            allow_unknown_region: false,
            vintage: 2024,
            authority_level: AuthorityLevel::new(5).unwrap(),
        }
    }

    fn square_feature(id: &str, x0: f64) -> Value {
        serde_json::json!({
            "type": "Feature",
            "properties": { "GEOID": id, "NAME": format!("District {id}") },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [x0, 0.0], [x0 + 1.0, 0.0], [x0 + 1.0, 1.0], [x0, 1.0], [x0, 0.0]
                ]]
            }
        })
    }

    fn collection(features: Vec<Value>) -> Value {
        serde_json::json!({ "type": "FeatureCollection", "features": features })
    }

    #[test]
    fn preserves_upstream_delivery_order() {
        let payload = collection(vec![
            square_feature("0603", 2.0),
            square_feature("0601", 0.0),
            square_feature("0602", 1.0),
        ]);
        let outcome =
            normalize_layer(&payload, &spec(), None, &NormalizerConfig::default()).unwrap();
        let ids: Vec<&str> = outcome.boundaries.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["0603", "0601", "0602"]);
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn point_features_are_dropped_with_warning() {
        let mut config = NormalizerConfig::default();
        config.max_drop_ratio = 0.5;
        let payload = collection(vec![
            square_feature("0601", 0.0),
            serde_json::json!({
                "type": "Feature",
                "properties": { "GEOID": "P1" },
                "geometry": { "type": "Point", "coordinates": [0.5, 0.5] }
            }),
        ]);
        let outcome = normalize_layer(&payload, &spec(), None, &config).unwrap();
        assert_eq!(outcome.boundaries.len(), 1);
        assert_eq!(outcome.dropped.len(), 1);
        assert!(matches!(
            outcome.dropped[0].reason,
            NormalizeError::InvalidGeometry { feature_index: 1, .. }
        ));
    }

    #[test]
    fn missing_id_drops_the_feature() {
        let mut config = NormalizerConfig::default();
        config.max_drop_ratio = 0.5;
        let mut nameless = square_feature("x", 0.0);
        nameless["properties"] = serde_json::json!({ "OTHER": "y" });
        let payload = collection(vec![nameless, square_feature("0601", 2.0)]);
        let outcome = normalize_layer(&payload, &spec(), None, &config).unwrap();
        assert_eq!(outcome.boundaries.len(), 1);
        assert!(matches!(
            outcome.dropped[0].reason,
            NormalizeError::MissingId { feature_index: 0 }
        ));
    }

    #[test]
    fn name_falls_back_to_id() {
        let mut feature = square_feature("0601", 0.0);
        feature["properties"] = serde_json::json!({ "GEOID": "0601" });
        let payload = collection(vec![feature]);
        let outcome =
            normalize_layer(&payload, &spec(), None, &NormalizerConfig::default()).unwrap();
        assert_eq!(outcome.boundaries[0].name, "0601");
    }

    #[test]
    fn unknown_region_halts_when_spec_forbids_unknowns() {
        let mut s = spec();
        s.region_rule = RegionRule::IdPrefix(vec![("9".into(), "US-CA".into())]);
        let payload = collection(vec![square_feature("0601", 0.0)]);
        let err = normalize_layer(&payload, &s, None, &NormalizerConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn excessive_drop_rate_fails_the_layer() {
        // One bad feature out of two: 50% drop rate against a 1% ceiling.
        let payload = collection(vec![
            square_feature("0601", 0.0),
            serde_json::json!({
                "type": "Feature",
                "properties": { "GEOID": "L1" },
                "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] }
            }),
        ]);
        let err =
            normalize_layer(&payload, &spec(), None, &NormalizerConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn provenance_is_attached_to_every_boundary() {
        let provenance = Provenance {
            source_url: "https://example.test/cd".into(),
            content_hash: "ab".repeat(32),
            retrieved_at: atlas_core::Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            organization: "US Census Bureau".into(),
        };
        let payload = collection(vec![square_feature("0601", 0.0)]);
        let outcome = normalize_layer(
            &payload,
            &spec(),
            Some(&provenance),
            &NormalizerConfig::default(),
        )
        .unwrap();
        assert_eq!(outcome.boundaries[0].provenance.as_ref(), Some(&provenance));
    }
}
