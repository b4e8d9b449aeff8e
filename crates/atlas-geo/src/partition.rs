//! # Spatial Index & Partition Joins
//!
//! An R-tree over multipolygon bounding boxes, used two ways by the cell
//! assembler:
//!
//! - **Point coverage** — find every geometry containing a cell's
//!   representative point. The assembler treats more than one hit in the
//!   same layer as a partition violation, so this returns *all* hits,
//!   never the first.
//! - **Overlap detection** — verify a candidate partition has no interior
//!   overlaps before it is trusted as a partitioning layer.
//!
//! Representative points are interior points (pole-of-inaccessibility
//! style), not centroids: a centroid can fall outside a concave district
//! and silently join a cell to its neighbor.

use geo::{BoundingRect, Contains, InteriorPoint, MultiPolygon, Point, Rect, Relate};
use rstar::{RTree, RTreeObject, AABB};

use crate::error::GeometryError;

#[derive(Debug, Clone)]
struct IndexedBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Which geometries of an index cover a queried point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointCoverage {
    /// Indices (into the construction order) of every containing geometry.
    pub containing: Vec<usize>,
}

impl PointCoverage {
    /// The unique containing geometry, if coverage is exactly one.
    pub fn unique(&self) -> Option<usize> {
        match self.containing.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }
}

/// An immutable R-tree index over a set of multipolygons.
#[derive(Debug, Clone)]
pub struct GeometryIndex {
    geoms: Vec<MultiPolygon<f64>>,
    rtree: RTree<IndexedBox>,
}

impl GeometryIndex {
    /// Index a geometry set. Order is preserved: results refer back to
    /// positions in `geoms`.
    pub fn new(geoms: Vec<MultiPolygon<f64>>) -> Self {
        let boxes = geoms
            .iter()
            .enumerate()
            .filter_map(|(idx, mp)| mp.bounding_rect().map(|bbox| IndexedBox { idx, bbox }))
            .collect();
        Self {
            rtree: RTree::bulk_load(boxes),
            geoms,
        }
    }

    /// Number of indexed geometries.
    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    /// The geometry at a given construction index.
    pub fn geometry(&self, idx: usize) -> Option<&MultiPolygon<f64>> {
        self.geoms.get(idx)
    }

    /// Every geometry whose interior or boundary contains `point`,
    /// in ascending index order.
    pub fn covering(&self, point: Point<f64>) -> PointCoverage {
        let env = AABB::from_corners([point.x(), point.y()], [point.x(), point.y()]);
        let mut containing: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&env)
            .filter(|b| self.geoms[b.idx].contains(&point))
            .map(|b| b.idx)
            .collect();
        containing.sort_unstable();
        PointCoverage { containing }
    }

    /// A guaranteed-interior representative point for a geometry.
    pub fn representative_point(&self, idx: usize) -> Result<Point<f64>, GeometryError> {
        self.geoms
            .get(idx)
            .and_then(|mp| mp.interior_point())
            .ok_or(GeometryError::Empty)
    }

    /// Verify no two indexed geometries overlap in area. Boundary touches
    /// (shared edges, corner contacts) are fine; interior overlap or
    /// containment is not.
    pub fn assert_partition(&self) -> Result<(), GeometryError> {
        for i in 0..self.geoms.len() {
            let Some(rect) = self.geoms[i].bounding_rect() else {
                continue;
            };
            let search = AABB::from_corners(rect.min().into(), rect.max().into());
            for cand in self.rtree.locate_in_envelope_intersecting(&search) {
                let j = cand.idx;
                if j <= i {
                    continue;
                }
                let im = self.geoms[i].relate(&self.geoms[j]);
                if im.is_intersects() && !im.is_touches() {
                    return Err(GeometryError::Invalid(format!(
                        "geometries {i} and {j} overlap in area; input is not a partition"
                    )));
                }
            }
        }
        Ok(())
    }
}
