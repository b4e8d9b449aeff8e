//! # Quality Reports
//!
//! The structured outcome of cross-validating one layer: three check
//! results, a weighted 0–100 score, and a verdict against the
//! civic-infrastructure thresholds.

use serde::{Deserialize, Serialize};

/// Weighting of the three checks in the total score.
pub const COUNT_WEIGHT: f64 = 30.0;
/// Identifier-consistency share of the total score.
pub const IDENTIFIER_WEIGHT: f64 = 30.0;
/// Geometry-agreement share of the total score.
pub const GEOMETRY_WEIGHT: f64 = 40.0;

/// Outcome of an individual check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// The check ran and met its threshold.
    Passed,
    /// The check ran and fell into the warning band.
    Warning,
    /// The check ran and fell below the warning band.
    Failed,
    /// The check could not run (source unavailable). Never a failure.
    Skipped,
}

/// Count-agreement detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountCheck {
    /// Features delivered by source A.
    pub count_a: u32,
    /// Features delivered by source B.
    pub count_b: u32,
    /// Published expected count, when one is registered.
    pub expected: Option<u32>,
    /// Score contribution, `0..=30`.
    pub score: f64,
    /// Status of this check.
    pub status: CheckStatus,
}

/// Identifier-consistency detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierCheck {
    /// Canonical ids present in both sources.
    pub matching: u32,
    /// Canonical ids only source A delivered.
    pub only_in_a: Vec<String>,
    /// Canonical ids only source B delivered.
    pub only_in_b: Vec<String>,
    /// Score contribution, `0..=30`.
    pub score: f64,
    /// Status of this check.
    pub status: CheckStatus,
}

/// Geometry-agreement detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryCheck {
    /// Mean IoU over matched pairs.
    pub mean_iou: f64,
    /// The matched pairs below the acceptance threshold, worst first,
    /// as `(canonical_id, iou)`.
    pub below_threshold: Vec<(String, f64)>,
    /// Score contribution, `0..=40`.
    pub score: f64,
    /// Status of this check.
    pub status: CheckStatus,
}

/// Final verdict for the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Agreement at civic-infrastructure grade.
    Accepted,
    /// Usable, but the disagreement must be surfaced.
    Warn,
    /// Serious disagreement; commit only with an explicit override.
    Critical,
    /// The sources disagree too much to commit.
    Rejected,
    /// One or both sources were unavailable; nothing was measured.
    Skipped,
}

impl Verdict {
    /// Whether a build may proceed on this verdict without an override.
    pub fn allows_build(&self) -> bool {
        matches!(self, Self::Accepted | Self::Warn)
    }
}

/// The full cross-validation outcome for one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// The layer that was validated.
    pub layer: String,
    /// `country` or `country/region` scope of the comparison.
    pub jurisdiction: String,
    /// Names of the two sources compared.
    pub source_a: String,
    /// Name of the second source.
    pub source_b: String,
    /// Count agreement.
    pub count: CountCheck,
    /// Identifier agreement.
    pub identifier: IdentifierCheck,
    /// Geometry agreement.
    pub geometry: GeometryCheck,
    /// Weighted total, `0..=100`.
    pub total_score: f64,
    /// The verdict.
    pub verdict: Verdict,
}

impl QualityReport {
    /// A report for a comparison that could not run.
    pub fn skipped(
        layer: impl Into<String>,
        jurisdiction: impl Into<String>,
        source_a: impl Into<String>,
        source_b: impl Into<String>,
    ) -> Self {
        Self {
            layer: layer.into(),
            jurisdiction: jurisdiction.into(),
            source_a: source_a.into(),
            source_b: source_b.into(),
            count: CountCheck {
                count_a: 0,
                count_b: 0,
                expected: None,
                score: 0.0,
                status: CheckStatus::Skipped,
            },
            identifier: IdentifierCheck {
                matching: 0,
                only_in_a: Vec::new(),
                only_in_b: Vec::new(),
                score: 0.0,
                status: CheckStatus::Skipped,
            },
            geometry: GeometryCheck {
                mean_iou: 0.0,
                below_threshold: Vec::new(),
                score: 0.0,
                status: CheckStatus::Skipped,
            },
            total_score: 0.0,
            verdict: Verdict::Skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_hundred() {
        assert_eq!(COUNT_WEIGHT + IDENTIFIER_WEIGHT + GEOMETRY_WEIGHT, 100.0);
    }

    #[test]
    fn skipped_reports_carry_no_score() {
        let r = QualityReport::skipped("congressional", "GB", "ons", "os");
        assert_eq!(r.verdict, Verdict::Skipped);
        assert_eq!(r.total_score, 0.0);
        assert_eq!(r.count.status, CheckStatus::Skipped);
    }

    #[test]
    fn only_accepted_and_warn_allow_builds() {
        assert!(Verdict::Accepted.allows_build());
        assert!(Verdict::Warn.allows_build());
        assert!(!Verdict::Critical.allows_build());
        assert!(!Verdict::Rejected.allows_build());
        assert!(!Verdict::Skipped.allows_build());
    }
}
