//! # Merkle Errors

use thiserror::Error;

use atlas_core::{AtlasError, InvariantViolation};

/// Failure in tree construction or proof handling.
#[derive(Error, Debug)]
pub enum MerkleError {
    /// Two leaves with the same sort key reached the builder.
    #[error("duplicate leaf key ({primary}, {secondary})")]
    DuplicateLeaf {
        /// Primary sort key (layer type, or hierarchy level tag).
        primary: String,
        /// Secondary sort key (boundary/cell identifier).
        secondary: String,
    },

    /// A tree was requested over zero leaves.
    #[error("cannot build a tree over zero leaves ({context})")]
    EmptyTree {
        /// Which construction hit the empty input.
        context: String,
    },

    /// A reference layer reached the leaf builder.
    #[error("layer {0} is reference-only and cannot enter a commitment")]
    ReferenceLayer(String),

    /// A proof was requested for an unknown leaf.
    #[error("no leaf for key ({primary}, {secondary})")]
    UnknownLeaf {
        /// Primary sort key searched for.
        primary: String,
        /// Secondary sort key searched for.
        secondary: String,
    },

    /// Canonical serialization of leaf metadata failed.
    #[error("leaf canonicalization failed: {0}")]
    Canonical(String),
}

impl From<MerkleError> for AtlasError {
    fn from(e: MerkleError) -> Self {
        match e {
            MerkleError::DuplicateLeaf { primary, secondary } => {
                AtlasError::InvariantViolated(InvariantViolation::DuplicateLeaf {
                    layer: primary,
                    id: secondary,
                })
            }
            MerkleError::EmptyTree { context } => {
                AtlasError::InvariantViolated(InvariantViolation::EmptyTree { context })
            }
            other => AtlasError::InvalidInput(other.to_string()),
        }
    }
}
