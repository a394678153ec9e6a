//! 2D polygon utilities.
//!
//! Small geometric helpers shared by mesh construction and warping:
//! signed area, point-in-polygon, bounding boxes and segment intersection
//! tests over `nalgebra::Point2<f64>`.

use nalgebra::{Point2, Vector2};

/// The 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Signed area of a simple polygon (shoelace formula).
///
/// Positive for counter-clockwise winding in a y-up coordinate system.
/// Returns 0.0 for fewer than three points.
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Test whether a point lies inside a simple polygon (ray casting).
///
/// Points exactly on an edge may report either side; callers needing
/// inclusive boundaries should test with a tolerance of their own.
pub fn point_in_polygon(p: Point2<f64>, points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Axis-aligned bounding box of a point set.
///
/// Returns `None` for an empty slice.
pub fn bounding_box(points: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Test whether two open segments properly intersect.
///
/// Shared endpoints and collinear touching do not count as an intersection;
/// this is used to reject bowtie quads during mesh construction.
pub fn segments_intersect(
    a1: Point2<f64>,
    a2: Point2<f64>,
    b1: Point2<f64>,
    b2: Point2<f64>,
) -> bool {
    let d1 = cross(b2 - b1, a1 - b1);
    let d2 = cross(b2 - b1, a2 - b1);
    let d3 = cross(a2 - a1, b1 - a1);
    let d4 = cross(a2 - a1, b2 - a1);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
