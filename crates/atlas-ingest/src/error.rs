//! # Ingestion Errors

use thiserror::Error;

use atlas_core::AtlasError;

/// Per-feature normalization failure.
///
/// `InvalidGeometry` and `MissingId` are warnings — the feature is
/// dropped and normalization continues. `UnknownRegion` halts the layer
/// unless its `LayerSpec` permits an unknown bucket.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The feature's geometry was unusable.
    #[error("feature {feature_index}: invalid geometry: {reason}")]
    InvalidGeometry {
        /// Zero-based index of the feature in upstream delivery order.
        feature_index: usize,
        /// Why the geometry was rejected.
        reason: String,
    },

    /// None of the spec's candidate id attributes matched.
    #[error("feature {feature_index}: no id attribute matched the layer spec")]
    MissingId {
        /// Zero-based index of the feature in upstream delivery order.
        feature_index: usize,
    },

    /// The region rule produced nothing and the spec forbids unknowns.
    #[error("boundary {id}: region could not be resolved")]
    UnknownRegion {
        /// The resolved boundary id whose region is unknown.
        id: String,
    },
}

/// Provider-level failure, after the adapter's retry budget is spent.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The fetch client could not reach the endpoint.
    #[error("source {source_name} unreachable after {attempts} attempt(s): {detail}")]
    Unreachable {
        /// Logical source name.
        source_name: String,
        /// Attempts made, including the first.
        attempts: u32,
        /// Last transport failure observed.
        detail: String,
    },

    /// The endpoint answered with something that does not parse.
    #[error("source {source_name}: malformed payload: {detail}")]
    MalformedPayload {
        /// Logical source name.
        source_name: String,
        /// Parse failure detail.
        detail: String,
    },

    /// Cancellation observed between retry attempts.
    #[error("fetch cancelled")]
    Cancelled,
}

impl From<ProviderError> for AtlasError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Unreachable {
                source_name,
                attempts,
                detail,
            } => AtlasError::UpstreamUnavailable {
                source_name,
                attempts,
                detail,
            },
            ProviderError::MalformedPayload { source_name, detail } => {
                AtlasError::InvalidInput(format!("{source_name}: {detail}"))
            }
            ProviderError::Cancelled => AtlasError::Cancelled,
        }
    }
}
