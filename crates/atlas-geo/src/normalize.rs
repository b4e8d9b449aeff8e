//! # Geometry Normalization
//!
//! Coerces raw polygon coordinates into the single canonical form every
//! digest and comparison assumes:
//!
//! 1. coordinates snapped to 6 decimal degrees (≈10 cm),
//! 2. rings explicitly closed,
//! 3. exterior rings counter-clockwise, holes clockwise,
//! 4. all coordinates inside WGS84 bounds,
//! 5. OGC-valid and non-empty, or rejected.
//!
//! Two upstream renditions of the same polygon that differ only in ring
//! direction, closure convention, or sub-centimeter jitter normalize to
//! identical coordinates, which is what makes geometry digests comparable
//! across sources.

use geo::orient::{Direction, Orient};
use geo::{Area, Coord, LineString, MultiPolygon, Polygon, Validation};

use crate::error::GeometryError;

/// Decimal places coordinates are snapped to.
pub const COORD_PRECISION: u32 = 6;

const SNAP_SCALE: f64 = 1e6;

/// Snap one coordinate to the published precision.
fn snap(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (c.x * SNAP_SCALE).round() / SNAP_SCALE,
        y: (c.y * SNAP_SCALE).round() / SNAP_SCALE,
    }
}

/// Snap every coordinate of a ring and close it if open.
fn normalize_ring(ring: &LineString<f64>) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = ring.coords().copied().map(snap).collect();
    if coords.first() != coords.last() {
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
    }
    LineString::from(coords)
}

fn check_bounds(mp: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    for poly in &mp.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for c in ring.coords() {
                if !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y) {
                    return Err(GeometryError::OutOfBounds {
                        lon: c.x.to_string(),
                        lat: c.y.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Normalize a multipolygon into canonical form.
///
/// # Errors
///
/// `OutOfBounds` for coordinates outside WGS84; `Empty` when the snapped
/// geometry has no area; `Invalid` when the result is not OGC-valid
/// (self-intersection, nested shells, …).
pub fn normalize_geometry(raw: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, GeometryError> {
    let snapped = MultiPolygon(
        raw.0
            .iter()
            .map(|poly| {
                Polygon::new(
                    normalize_ring(poly.exterior()),
                    poly.interiors().iter().map(normalize_ring).collect(),
                )
            })
            .collect(),
    );

    check_bounds(&snapped)?;

    // Exterior counter-clockwise, holes clockwise.
    let oriented = snapped.orient(Direction::Default);

    if oriented.unsigned_area() == 0.0 {
        return Err(GeometryError::Empty);
    }
    if !oriented.is_valid() {
        return Err(GeometryError::Invalid(
            "geometry is not OGC-valid after normalization".into(),
        ));
    }
    Ok(oriented)
}
