//! # atlas-validate — Cross-Source Validation
//!
//! Two independently authoritative sources covering the same layer in the
//! same jurisdiction should agree. This crate measures how much they do:
//! a count check against the published expected count, an identifier
//! consistency check after canonicalization, and a geometry
//! intersection-over-union check per matched pair — folded into one
//! weighted 0–100 quality score with civic-infrastructure thresholds.
//!
//! An unavailable source is reported as `Skipped`, never `Failed`;
//! whether a skipped check blocks a build is the engine's call.

pub mod expected;
pub mod idnorm;
pub mod report;
pub mod validator;

pub use expected::{ExpectedCount, ExpectedCountRegistry};
pub use idnorm::normalize_id;
pub use report::{
    CheckStatus, CountCheck, GeometryCheck, IdentifierCheck, QualityReport, Verdict,
};
pub use validator::{cross_validate, CrossValidateConfig};
