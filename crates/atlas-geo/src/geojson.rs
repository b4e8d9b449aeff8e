//! # GeoJSON Parsing & Canonical Text
//!
//! Upstream payloads arrive as GeoJSON FeatureCollections with arbitrary
//! per-feature properties. This module parses them into geo types plus a
//! raw property map (attribute resolution happens in the normalizer,
//! which knows the layer's attribute priorities), and renders normalized
//! geometry back out as the canonical text form geometry digests are
//! computed over: `{"coordinates":…,"type":"MultiPolygon"}` — keys
//! sorted, no whitespace, every geometry widened to MultiPolygon.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};

use crate::error::GeometryError;

/// A parsed feature: geometry (if polygonal) plus its raw properties.
#[derive(Debug, Clone)]
pub struct Feature {
    /// The feature's geometry as delivered.
    pub geometry: ParsedGeometry,
    /// The raw GeoJSON `properties` object.
    pub properties: Map<String, Value>,
}

/// Geometry as found in the payload.
#[derive(Debug, Clone)]
pub enum ParsedGeometry {
    /// A polygonal geometry, widened to MultiPolygon.
    Polygonal(MultiPolygon<f64>),
    /// Anything else (Point, LineString, …), carried by type name so the
    /// normalizer can warn precisely.
    Unsupported(String),
    /// The feature had no geometry member at all.
    Missing,
}

/// Parse a GeoJSON FeatureCollection.
///
/// # Errors
///
/// `Invalid` when the document is not a FeatureCollection or a feature's
/// polygon coordinates are malformed. Unsupported geometry *types* are
/// not an error here — they surface per-feature so the normalizer can
/// drop them with a warning.
pub fn parse_feature_collection(doc: &Value) -> Result<Vec<Feature>, GeometryError> {
    if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(GeometryError::Invalid(
            "document is not a GeoJSON FeatureCollection".into(),
        ));
    }
    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| GeometryError::Invalid("FeatureCollection has no features array".into()))?;

    features
        .iter()
        .map(|f| {
            let properties = f
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let geometry = parse_geometry(f.get("geometry"))?;
            Ok(Feature {
                geometry,
                properties,
            })
        })
        .collect()
}

fn parse_geometry(geom: Option<&Value>) -> Result<ParsedGeometry, GeometryError> {
    let Some(geom) = geom.filter(|g| !g.is_null()) else {
        return Ok(ParsedGeometry::Missing);
    };
    let gtype = geom
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::Invalid("geometry has no type".into()))?;
    let coords = geom
        .get("coordinates")
        .ok_or_else(|| GeometryError::Invalid("geometry has no coordinates".into()))?;

    match gtype {
        "Polygon" => Ok(ParsedGeometry::Polygonal(MultiPolygon(vec![
            parse_polygon(coords)?,
        ]))),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or_else(|| GeometryError::Invalid("MultiPolygon coordinates not an array".into()))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedGeometry::Polygonal(MultiPolygon(polys)))
        }
        other => Ok(ParsedGeometry::Unsupported(other.to_string())),
    }
}

fn parse_polygon(coords: &Value) -> Result<Polygon<f64>, GeometryError> {
    let rings = coords
        .as_array()
        .ok_or_else(|| GeometryError::Invalid("Polygon coordinates not an array".into()))?;
    if rings.is_empty() {
        return Err(GeometryError::Invalid("Polygon has no rings".into()));
    }
    let mut parsed = rings.iter().map(parse_ring);
    let exterior = parsed.next().unwrap_or_else(|| {
        Err(GeometryError::Invalid("Polygon has no exterior ring".into()))
    })?;
    let interiors = parsed.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>, GeometryError> {
    let positions = ring
        .as_array()
        .ok_or_else(|| GeometryError::Invalid("ring is not an array".into()))?;
    let coords = positions
        .iter()
        .map(|pos| {
            let pair = pos
                .as_array()
                .filter(|p| p.len() >= 2)
                .ok_or_else(|| GeometryError::Invalid("position is not [lon, lat]".into()))?;
            let x = pair[0]
                .as_f64()
                .ok_or_else(|| GeometryError::Invalid("longitude is not a number".into()))?;
            let y = pair[1]
                .as_f64()
                .ok_or_else(|| GeometryError::Invalid("latitude is not a number".into()))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>, GeometryError>>()?;
    Ok(LineString::from(coords))
}

/// Render normalized geometry as canonical GeoJSON text.
///
/// Keys sort alphabetically (`coordinates` before `type`), output is
/// compact, and every geometry is emitted as MultiPolygon so that a
/// Polygon and its single-member MultiPolygon widening digest equally.
/// Callers must pass geometry that has been through
/// [`crate::normalize_geometry`]; this function serializes exactly what
/// it is given.
pub fn canonical_geojson(geometry: &MultiPolygon<f64>) -> String {
    let coordinates: Vec<Vec<Vec<[f64; 2]>>> = geometry
        .0
        .iter()
        .map(|poly| {
            std::iter::once(poly.exterior())
                .chain(poly.interiors())
                .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                .collect()
        })
        .collect();
    // serde_json's map is a BTreeMap: keys come out sorted, output
    // compact. Insertion order matches the sorted order anyway.
    serde_json::json!({
        "coordinates": coordinates,
        "type": "MultiPolygon",
    })
    .to_string()
}
