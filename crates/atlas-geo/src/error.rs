//! # Geometry Errors

use thiserror::Error;

use atlas_core::AtlasError;

/// Why a geometry was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Geometry failed OGC validity after normalization.
    #[error("invalid geometry: {0}")]
    Invalid(String),

    /// A coordinate fell outside `[-180, 180] × [-90, 90]`.
    #[error("coordinate ({lon}, {lat}) outside WGS84 bounds")]
    OutOfBounds {
        /// Longitude of the offending coordinate, rendered as text.
        lon: String,
        /// Latitude of the offending coordinate, rendered as text.
        lat: String,
    },

    /// Geometry collapsed to zero area after snapping.
    #[error("geometry is empty after normalization")]
    Empty,

    /// A geometry type this system does not commit (point, line, …).
    #[error("unsupported geometry type {0:?}; only Polygon and MultiPolygon are accepted")]
    UnsupportedType(String),
}

impl From<GeometryError> for AtlasError {
    fn from(e: GeometryError) -> Self {
        AtlasError::InvalidInput(e.to_string())
    }
}
