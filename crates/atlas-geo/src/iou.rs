//! # Intersection-over-Union
//!
//! The geometric agreement metric between two renditions of the same
//! district: `area(A ∩ B) / area(A ∪ B)`. Symmetric by construction,
//! 1.0 for identical shapes, 0.0 for disjoint ones.

use geo::{Area, BooleanOps, MultiPolygon};

/// Compute IoU of two multipolygons.
///
/// Returns 0.0 when the union has no area (both inputs empty), so the
/// value is always a well-defined number in `[0, 1]`.
pub fn intersection_over_union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    let union_area = a.union(b).unsigned_area();
    if union_area == 0.0 {
        return 0.0;
    }
    let intersection_area = a.intersection(b).unsigned_area();
    intersection_area / union_area
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
        ]])
    }

    #[test]
    fn identical_shapes_score_one() {
        let a = square(0.0, 0.0, 1.0);
        assert!((intersection_over_union(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_shapes_score_zero() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);
        assert_eq!(intersection_over_union(&a, &b), 0.0);
    }

    #[test]
    fn half_overlap_scores_one_third() {
        // Two unit squares sharing half their area: |A∩B| = 0.5, |A∪B| = 1.5.
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.5, 0.0, 1.0);
        let iou = intersection_over_union(&a, &b);
        assert!((iou - 1.0 / 3.0).abs() < 1e-9, "got {iou}");
    }

    #[test]
    fn iou_is_symmetric() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.3, 0.4, 1.2);
        let ab = intersection_over_union(&a, &b);
        let ba = intersection_over_union(&b, &a);
        assert!((ab - ba).abs() <= 1e-9);
    }

    #[test]
    fn containment_scores_area_ratio() {
        let outer = square(0.0, 0.0, 2.0);
        let inner = square(0.5, 0.5, 1.0);
        let iou = intersection_over_union(&outer, &inner);
        assert!((iou - 0.25).abs() < 1e-9, "got {iou}");
    }

    #[test]
    fn empty_inputs_score_zero() {
        let empty = MultiPolygon::<f64>(vec![]);
        assert_eq!(intersection_over_union(&empty, &empty), 0.0);
    }
}
