//! # Ingestion Pipeline
//!
//! The stage between fetched payloads and the assembler: normalize every
//! layer under its spec, cross-validate layers that have an independent
//! second source, and gate the build on the verdicts.
//!
//! Gating policy: any `Rejected` or `Critical` verdict fails the build
//! with `ValidationFailed`; `Warn` verdicts let the build proceed but
//! tag the snapshot with the worst quality score; `Skipped` checks never
//! block on their own — a source being down is an availability problem,
//! not a data-disagreement problem, and the engine already saw it in the
//! health report.

use std::collections::BTreeMap;

use serde_json::Value;

use atlas_core::{AtlasError, Boundary, LayerType, Provenance};
use atlas_ingest::{normalize_layer, LayerSpec, NormalizeOutcome, NormalizerConfig};
use atlas_validate::{
    cross_validate, CrossValidateConfig, ExpectedCountRegistry, QualityReport, Verdict,
};

/// One fetched payload, ready to normalize.
pub struct FetchedLayer {
    /// Which source produced it (for reports and records).
    pub source: String,
    /// The spec the payload normalizes under.
    pub spec: LayerSpec,
    /// The raw FeatureCollection.
    pub payload: Value,
    /// Retrieval provenance to bind into the boundaries.
    pub provenance: Option<Provenance>,
}

/// Normalized layers bucketed for the assembler, with drop statistics.
pub struct NormalizedLayers {
    /// Boundaries per layer, upstream delivery order preserved within
    /// each source.
    pub layers: BTreeMap<LayerType, Vec<Boundary>>,
    /// Total features dropped across all layers.
    pub dropped: usize,
}

/// Normalize every fetched layer.
///
/// Multiple payloads for the same layer (paginated portals, per-state
/// shards) concatenate in input order. Per-layer drop ceilings apply
/// inside [`normalize_layer`]; the first layer over its ceiling fails
/// the whole stage.
pub fn normalize_fetched(
    fetched: Vec<FetchedLayer>,
    config: &NormalizerConfig,
) -> Result<NormalizedLayers, AtlasError> {
    let mut layers: BTreeMap<LayerType, Vec<Boundary>> = BTreeMap::new();
    let mut dropped = 0;
    for item in fetched {
        let NormalizeOutcome {
            boundaries,
            dropped: layer_dropped,
        } = normalize_layer(&item.payload, &item.spec, item.provenance.as_ref(), config)?;
        tracing::debug!(
            source = %item.source,
            layer = %item.spec.layer,
            kept = boundaries.len(),
            dropped = layer_dropped.len(),
            "normalized layer"
        );
        dropped += layer_dropped.len();
        layers.entry(item.spec.layer).or_default().extend(boundaries);
    }
    Ok(NormalizedLayers { layers, dropped })
}

/// Cross-validate every layer that has an independent second rendition.
///
/// `primary` is the rendition the build will commit; `secondary` maps
/// layer → the independent source's rendition, where one exists. Layers
/// with no second source are not checked (not `Skipped` — `Skipped`
/// means a configured comparison could not run).
pub fn validate_layers(
    country: &str,
    primary_source: &str,
    primary: &BTreeMap<LayerType, Vec<Boundary>>,
    secondary_source: &str,
    secondary: &BTreeMap<LayerType, Option<Vec<Boundary>>>,
    registry: &ExpectedCountRegistry,
    config: &CrossValidateConfig,
) -> Vec<QualityReport> {
    secondary
        .iter()
        .map(|(layer, second_rendition)| {
            let first = primary.get(layer).map(Vec::as_slice);
            let expected = first
                .and_then(|boundaries| boundaries.first())
                .and_then(|boundary| {
                    registry.lookup(&boundary.country, boundary.region.as_ref(), *layer)
                });
            cross_validate(
                primary_source,
                first,
                secondary_source,
                second_rendition.as_deref(),
                layer.as_str(),
                country,
                expected,
                config,
            )
        })
        .collect()
}

/// Gate a build on its validation reports.
///
/// Returns the snapshot quality tag: `None` when every check accepted,
/// the worst score rendered to a string when any check warned.
///
/// # Errors
///
/// `ValidationFailed` carrying the worst offending layer when any check
/// came back `Critical` or `Rejected`.
pub fn gate_on_reports(reports: &[QualityReport]) -> Result<Option<String>, AtlasError> {
    let mut worst_warn: Option<&QualityReport> = None;
    for report in reports {
        match report.verdict {
            Verdict::Rejected | Verdict::Critical => {
                return Err(AtlasError::ValidationFailed {
                    layer: report.layer.clone(),
                    score: report.total_score,
                    detail: format!(
                        "{} vs {} over {}: verdict {:?}",
                        report.source_a, report.source_b, report.jurisdiction, report.verdict
                    ),
                });
            }
            Verdict::Warn => {
                let is_worse = worst_warn
                    .map(|current| report.total_score < current.total_score)
                    .unwrap_or(true);
                if is_worse {
                    worst_warn = Some(report);
                }
            }
            Verdict::Accepted | Verdict::Skipped => {}
        }
    }
    Ok(worst_warn.map(|report| format!("{:.1}", report.total_score)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{AuthorityLevel, CountryCode, ErrorKind};
    use atlas_ingest::RegionRule;
    use atlas_validate::CheckStatus;

    fn spec(layer: LayerType) -> LayerSpec {
        LayerSpec {
            layer,
            country: CountryCode::new("US").unwrap(),
            id_attributes: vec!["GEOID".into()],
            name_attributes: vec!["NAME".into()],
            region_rule: RegionRule::Fixed(None),
            allow_unknown_region: false,
            vintage: 2024,
            authority_level: AuthorityLevel::new(5).unwrap(),
        }
    }

    fn payload(ids: &[&str]) -> Value {
        let features: Vec<Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let x0 = i as f64 * 2.0;
                serde_json::json!({
                    "type": "Feature",
                    "properties": { "GEOID": id },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[
                            [x0, 0.0], [x0 + 1.0, 0.0], [x0 + 1.0, 1.0], [x0, 1.0], [x0, 0.0]
                        ]]
                    }
                })
            })
            .collect();
        serde_json::json!({ "type": "FeatureCollection", "features": features })
    }

    #[test]
    fn shards_of_one_layer_concatenate() {
        let fetched = vec![
            FetchedLayer {
                source: "census".into(),
                spec: spec(LayerType::Congressional),
                payload: payload(&["0601", "0602"]),
                provenance: None,
            },
            FetchedLayer {
                source: "census".into(),
                spec: spec(LayerType::Congressional),
                payload: payload(&["0603"]),
                provenance: None,
            },
            FetchedLayer {
                source: "census".into(),
                spec: spec(LayerType::County),
                payload: payload(&["06037"]),
                provenance: None,
            },
        ];
        let normalized = normalize_fetched(fetched, &NormalizerConfig::default()).unwrap();
        assert_eq!(normalized.layers[&LayerType::Congressional].len(), 3);
        assert_eq!(normalized.layers[&LayerType::County].len(), 1);
        assert_eq!(normalized.dropped, 0);
    }

    #[test]
    fn validation_covers_only_layers_with_a_second_source() {
        let fetched = vec![FetchedLayer {
            source: "census".into(),
            spec: spec(LayerType::Congressional),
            payload: payload(&["0601", "0602"]),
            provenance: None,
        }];
        let normalized = normalize_fetched(fetched, &NormalizerConfig::default()).unwrap();

        let second = normalize_fetched(
            vec![FetchedLayer {
                source: "state-gis".into(),
                spec: spec(LayerType::Congressional),
                payload: payload(&["0601", "0602"]),
                provenance: None,
            }],
            &NormalizerConfig::default(),
        )
        .unwrap();

        let mut secondary = BTreeMap::new();
        secondary.insert(
            LayerType::Congressional,
            Some(second.layers[&LayerType::Congressional].clone()),
        );

        let reports = validate_layers(
            "US",
            "census",
            &normalized.layers,
            "state-gis",
            &secondary,
            &ExpectedCountRegistry::default(),
            &CrossValidateConfig::default(),
        );
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].verdict, Verdict::Accepted);
    }

    #[test]
    fn unavailable_second_source_reports_skipped() {
        let fetched = vec![FetchedLayer {
            source: "census".into(),
            spec: spec(LayerType::Congressional),
            payload: payload(&["0601"]),
            provenance: None,
        }];
        let normalized = normalize_fetched(fetched, &NormalizerConfig::default()).unwrap();

        let mut secondary = BTreeMap::new();
        secondary.insert(LayerType::Congressional, None);

        let reports = validate_layers(
            "US",
            "census",
            &normalized.layers,
            "state-gis",
            &secondary,
            &ExpectedCountRegistry::default(),
            &CrossValidateConfig::default(),
        );
        assert_eq!(reports[0].verdict, Verdict::Skipped);
        assert_eq!(reports[0].count.status, CheckStatus::Skipped);
        // Skipped alone never blocks.
        assert_eq!(gate_on_reports(&reports).unwrap(), None);
    }

    #[test]
    fn warn_verdicts_tag_the_snapshot_with_the_worst_score() {
        let mut warn_a = QualityReport::skipped("congressional", "US", "a", "b");
        warn_a.verdict = Verdict::Warn;
        warn_a.total_score = 72.5;
        let mut warn_b = QualityReport::skipped("county", "US", "a", "b");
        warn_b.verdict = Verdict::Warn;
        warn_b.total_score = 69.9;

        let tag = gate_on_reports(&[warn_a, warn_b]).unwrap();
        assert_eq!(tag.as_deref(), Some("69.9"));
    }

    #[test]
    fn critical_verdicts_fail_the_build() {
        let mut critical = QualityReport::skipped("congressional", "US", "a", "b");
        critical.verdict = Verdict::Critical;
        critical.total_score = 45.0;

        let err = gate_on_reports(&[critical]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
