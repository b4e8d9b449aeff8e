//! # Error Taxonomy
//!
//! The closed error surface of the build engine. Every component maps its
//! internal failures into [`AtlasError`] before crossing a crate boundary,
//! so callers always observe one of five [`ErrorKind`]s:
//!
//! - `InvalidInput` — malformed data from a caller; retrying cannot help.
//! - `UpstreamUnavailable` — a provider fetch failed after its retry budget.
//! - `ValidationFailed` — cross-validation scored below threshold; callers
//!   may downgrade this to a warning.
//! - `InvariantViolated` — an internal bug; the build aborts and nothing
//!   is published.
//! - `Cancelled` — cooperative cancellation at a suspension point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{BoundaryId, CellId};
use crate::layer::LayerType;

/// The five caller-visible failure kinds.
///
/// `AtlasError::kind()` projects every error onto this enum; the engine's
/// abort/continue decisions dispatch on it and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed caller data.
    InvalidInput,
    /// Upstream source unreachable after retries.
    UpstreamUnavailable,
    /// Cross-validation below threshold.
    ValidationFailed,
    /// Internal invariant broken — always fatal.
    InvariantViolated,
    /// Cooperative cancellation.
    Cancelled,
}

impl ErrorKind {
    /// Whether a build observing this kind must abort without publishing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolated)
    }
}

/// An internal invariant that was found broken.
///
/// Each variant carries enough structure for the failure report; none of
/// them are recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Two boundaries of the same layer both contain a cell's
    /// representative point, violating the partition invariant.
    #[error("overlapping boundaries in layer {layer} over cell {cell_id}: {boundary_ids:?}")]
    OverlappingBoundaries {
        /// The layer in which the overlap was found.
        layer: LayerType,
        /// The cell whose representative point is multiply covered.
        cell_id: CellId,
        /// All boundaries that claim the point.
        boundary_ids: Vec<BoundaryId>,
    },

    /// Two leaves with the same sort key reached the builder.
    #[error("duplicate leaf key in {layer}: {id}")]
    DuplicateLeaf {
        /// The layer (or hierarchy level) of the colliding leaves.
        layer: String,
        /// The duplicated identifier.
        id: String,
    },

    /// A tree was requested over zero leaves.
    #[error("cannot build a tree with no leaves ({context})")]
    EmptyTree {
        /// Which tree level the empty input reached.
        context: String,
    },

    /// A cell referenced a slot index outside its country's layout.
    #[error("slot index {slot} out of range for layout of {country} (len {len})")]
    SlotOutOfRange {
        /// The ISO alpha-2 country whose layout was violated.
        country: String,
        /// The offending slot index.
        slot: usize,
        /// The layout length.
        len: usize,
    },
}

/// Top-level error type for Shadow Atlas.
///
/// Component crates define their own `thiserror` enums for diagnostics and
/// convert into this type at their public surface.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Malformed data supplied by a caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An upstream source could not be reached.
    #[error("upstream {source_name} unavailable after {attempts} attempt(s): {detail}")]
    UpstreamUnavailable {
        /// Logical name of the source (provider id or origin).
        source_name: String,
        /// How many attempts were made before surfacing.
        attempts: u32,
        /// Last observed failure.
        detail: String,
    },

    /// Cross-validation scored below the acceptance threshold.
    #[error("validation failed for layer {layer}: score {score:.1} — {detail}")]
    ValidationFailed {
        /// The layer that failed validation.
        layer: String,
        /// The 0–100 quality score at failure time.
        score: f64,
        /// What tipped the result below threshold.
        detail: String,
    },

    /// An internal invariant is broken. Fatal; nothing is published.
    #[error("invariant violated: {0}")]
    InvariantViolated(#[from] InvariantViolation),

    /// The build was cancelled at a suspension point.
    #[error("build cancelled")]
    Cancelled,
}

impl AtlasError {
    /// Project onto the closed [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::InvariantViolated(_) => ErrorKind::InvariantViolated,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Error during canonical byte production.
#[derive(Error, Debug)]
pub enum CanonicalError {
    /// Float values are not permitted in canonical representations;
    /// fractional quantities must be carried as strings or integers.
    #[error("float value {0} is not permitted in canonical representations")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("canonical serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

impl From<CanonicalError> for AtlasError {
    fn from(e: CanonicalError) -> Self {
        AtlasError::InvalidInput(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BoundaryId, CellId};

    #[test]
    fn kind_projection_is_stable() {
        let e = AtlasError::InvalidInput("bad feature".into());
        assert_eq!(e.kind(), ErrorKind::InvalidInput);

        let e = AtlasError::UpstreamUnavailable {
            source_name: "census-api".into(),
            attempts: 3,
            detail: "timeout".into(),
        };
        assert_eq!(e.kind(), ErrorKind::UpstreamUnavailable);

        let e = AtlasError::Cancelled;
        assert_eq!(e.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn only_invariant_violations_are_fatal() {
        let violation = InvariantViolation::OverlappingBoundaries {
            layer: LayerType::Congressional,
            cell_id: CellId::new("060370001001"),
            boundary_ids: vec![BoundaryId::new("A"), BoundaryId::new("B")],
        };
        let e = AtlasError::from(violation);
        assert_eq!(e.kind(), ErrorKind::InvariantViolated);
        assert!(e.kind().is_fatal());
        assert!(!ErrorKind::ValidationFailed.is_fatal());
        assert!(!ErrorKind::Cancelled.is_fatal());
    }

    #[test]
    fn overlap_violation_names_all_claimants() {
        let violation = InvariantViolation::OverlappingBoundaries {
            layer: LayerType::Congressional,
            cell_id: CellId::new("060370001001"),
            boundary_ids: vec![BoundaryId::new("A"), BoundaryId::new("B")],
        };
        let msg = violation.to_string();
        assert!(msg.contains("congressional"));
        assert!(msg.contains("060370001001"));
        assert!(msg.contains('A') && msg.contains('B'));
    }
}
