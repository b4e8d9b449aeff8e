//! # atlas-geo — Geometry Kernel
//!
//! Everything Shadow Atlas does with coordinates lives here: coercing
//! upstream rings into the canonical form (closed, oriented, snapped),
//! checking OGC validity, measuring agreement between two renditions of
//! the same district (IoU), joining cells to the districts that contain
//! them, and producing the canonical GeoJSON text that geometry digests
//! are computed over.
//!
//! The crate is deliberately hash-free: it produces canonical *text* and
//! geometric *facts*; `atlas-crypto` turns them into field elements.

pub mod error;
pub mod geojson;
pub mod iou;
pub mod normalize;
pub mod partition;

pub use error::GeometryError;
pub use geojson::{canonical_geojson, parse_feature_collection, Feature, ParsedGeometry};
pub use iou::intersection_over_union;
pub use normalize::{normalize_geometry, COORD_PRECISION};
pub use partition::{GeometryIndex, PointCoverage};
