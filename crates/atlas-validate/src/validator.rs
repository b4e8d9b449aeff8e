//! # Cross-Validator
//!
//! Compares two normalized renditions of the same layer and scores their
//! agreement.
//!
//! ## Scoring
//!
//! - **Count (30)** — full marks only when both sources deliver the
//!   expected count (within a registered tolerance). When the sources
//!   agree with each other but drift from the expected count, the score
//!   decays linearly, reaching zero at 10% deviation. When the sources
//!   disagree with *each other*, the count component is zero — two
//!   authorities that cannot agree how many districts exist is exactly
//!   the disagreement this check exists to surface.
//! - **Identifier (30)** — `30 × |A ∩ B| / max(|A|, |B|)` over canonical
//!   ids.
//! - **Geometry (40)** — `40 × mean(IoU)` over matched pairs.
//!
//! ## Verdict
//!
//! IoU thresholds: ≥ 0.95 accept, 0.90–0.95 warn, 0.80–0.90 critical,
//! < 0.80 reject. The total score imposes its own floor (≥ 95 accept,
//! ≥ 60 warn, ≥ 40 critical); the final verdict is the worse of the two,
//! so perfect geometry cannot mask a count dispute and vice versa.

use std::collections::BTreeMap;

use atlas_core::Boundary;
use atlas_geo::intersection_over_union;

use crate::expected::ExpectedCount;
use crate::idnorm::normalize_id;
use crate::report::{
    CheckStatus, CountCheck, GeometryCheck, IdentifierCheck, QualityReport, Verdict, COUNT_WEIGHT,
    GEOMETRY_WEIGHT, IDENTIFIER_WEIGHT,
};

/// IoU at or above which a matched pair is acceptance-grade.
pub const IOU_ACCEPT: f64 = 0.95;
/// IoU at or above which a matched pair is warning-grade.
pub const IOU_WARN: f64 = 0.90;
/// IoU at or above which a matched pair is critical-grade.
pub const IOU_CRITICAL: f64 = 0.80;

/// Count deviation (fraction of expected) at which the score reaches 0.
const COUNT_DECAY_LIMIT: f64 = 0.10;

/// Validator configuration.
#[derive(Debug, Clone, Default)]
pub struct CrossValidateConfig {
    /// State FIPS prefix applied to bare district numbers during
    /// identifier canonicalization (state portals publish `"8"`, not
    /// `"5508"`).
    pub default_state_fips: Option<String>,
}

/// Cross-validate two renditions of one layer.
///
/// `a` or `b` being `None` means that source was unavailable; the report
/// comes back `Skipped` and the caller decides whether to block.
pub fn cross_validate(
    source_a: &str,
    a: Option<&[Boundary]>,
    source_b: &str,
    b: Option<&[Boundary]>,
    layer: &str,
    jurisdiction: &str,
    expected: Option<ExpectedCount>,
    config: &CrossValidateConfig,
) -> QualityReport {
    let (Some(a), Some(b)) = (a, b) else {
        tracing::warn!(layer, jurisdiction, "cross-validation skipped: source unavailable");
        return QualityReport::skipped(layer, jurisdiction, source_a, source_b);
    };

    let count = check_count(a.len() as u32, b.len() as u32, expected);
    let (identifier, matched) = check_identifiers(a, b, config);
    let geometry = check_geometry(&matched);

    let total_score = count.score + identifier.score + geometry.score;
    let verdict = verdict_for(total_score, &geometry);

    QualityReport {
        layer: layer.to_string(),
        jurisdiction: jurisdiction.to_string(),
        source_a: source_a.to_string(),
        source_b: source_b.to_string(),
        count,
        identifier,
        geometry,
        total_score,
        verdict,
    }
}

fn check_count(count_a: u32, count_b: u32, expected: Option<ExpectedCount>) -> CountCheck {
    let score = match expected {
        Some(e) if e.accepts(count_a) && e.accepts(count_b) => COUNT_WEIGHT,
        Some(e) if count_a == count_b => {
            // Sources agree with each other but drift from the published
            // count: linear decay, zero at 10% deviation.
            let deviation = count_a.abs_diff(e.count) as f64 / e.count.max(1) as f64;
            (COUNT_WEIGHT * (1.0 - deviation / COUNT_DECAY_LIMIT)).max(0.0)
        }
        Some(_) => 0.0,
        // No published expectation: sources agreeing with each other is
        // all that can be asked.
        None if count_a == count_b => COUNT_WEIGHT,
        None => 0.0,
    };
    let status = if score >= COUNT_WEIGHT {
        CheckStatus::Passed
    } else if score > 0.0 {
        CheckStatus::Warning
    } else {
        CheckStatus::Failed
    };
    CountCheck {
        count_a,
        count_b,
        expected: expected.map(|e| e.count),
        score,
        status,
    }
}

type MatchedPairs<'a> = Vec<(String, &'a Boundary, &'a Boundary)>;

fn check_identifiers<'a>(
    a: &'a [Boundary],
    b: &'a [Boundary],
    config: &CrossValidateConfig,
) -> (IdentifierCheck, MatchedPairs<'a>) {
    fn index<'b>(side: &'b [Boundary], fips: Option<&str>) -> BTreeMap<String, &'b Boundary> {
        side.iter()
            .map(|boundary| (normalize_id(boundary.id.as_str(), fips), boundary))
            .collect()
    }
    let fips = config.default_state_fips.as_deref();
    let map_a = index(a, fips);
    let map_b = index(b, fips);

    let mut matched: MatchedPairs<'a> = Vec::new();
    let mut only_in_a = Vec::new();
    for (id, boundary_a) in &map_a {
        match map_b.get(id) {
            Some(boundary_b) => matched.push((id.clone(), boundary_a, boundary_b)),
            None => only_in_a.push(id.clone()),
        }
    }
    let only_in_b: Vec<String> = map_b
        .keys()
        .filter(|id| !map_a.contains_key(*id))
        .cloned()
        .collect();

    let denominator = map_a.len().max(map_b.len()) as f64;
    let score = if denominator == 0.0 {
        0.0
    } else {
        IDENTIFIER_WEIGHT * matched.len() as f64 / denominator
    };
    let status = if only_in_a.is_empty() && only_in_b.is_empty() && !matched.is_empty() {
        CheckStatus::Passed
    } else if matched.is_empty() {
        CheckStatus::Failed
    } else {
        CheckStatus::Warning
    };

    (
        IdentifierCheck {
            matching: matched.len() as u32,
            only_in_a,
            only_in_b,
            score,
            status,
        },
        matched,
    )
}

fn check_geometry(matched: &MatchedPairs<'_>) -> GeometryCheck {
    if matched.is_empty() {
        return GeometryCheck {
            mean_iou: 0.0,
            below_threshold: Vec::new(),
            score: 0.0,
            status: CheckStatus::Failed,
        };
    }

    let mut below_threshold = Vec::new();
    let mut sum = 0.0;
    for (id, boundary_a, boundary_b) in matched {
        let iou = intersection_over_union(&boundary_a.geometry, &boundary_b.geometry);
        sum += iou;
        if iou < IOU_ACCEPT {
            below_threshold.push((id.clone(), iou));
        }
    }
    below_threshold.sort_by(|(_, x), (_, y)| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

    let mean_iou = sum / matched.len() as f64;
    let status = if mean_iou >= IOU_ACCEPT {
        CheckStatus::Passed
    } else if mean_iou >= IOU_WARN {
        CheckStatus::Warning
    } else {
        CheckStatus::Failed
    };
    GeometryCheck {
        mean_iou,
        below_threshold,
        score: GEOMETRY_WEIGHT * mean_iou,
        status,
    }
}

fn verdict_for(total_score: f64, geometry: &GeometryCheck) -> Verdict {
    let by_iou = if geometry.mean_iou >= IOU_ACCEPT {
        Verdict::Accepted
    } else if geometry.mean_iou >= IOU_WARN {
        Verdict::Warn
    } else if geometry.mean_iou >= IOU_CRITICAL {
        Verdict::Critical
    } else {
        Verdict::Rejected
    };
    let by_score = if total_score >= 95.0 {
        Verdict::Accepted
    } else if total_score >= 60.0 {
        Verdict::Warn
    } else if total_score >= 40.0 {
        Verdict::Critical
    } else {
        Verdict::Rejected
    };
    worse(by_iou, by_score)
}

fn worse(a: Verdict, b: Verdict) -> Verdict {
    fn rank(v: Verdict) -> u8 {
        match v {
            Verdict::Accepted => 0,
            Verdict::Warn => 1,
            Verdict::Critical => 2,
            Verdict::Rejected => 3,
            Verdict::Skipped => 4,
        }
    }
    if rank(a) >= rank(b) {
        a
    } else {
        b
    }
}
