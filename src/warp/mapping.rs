//! Local coordinate mappings over individual faces.
//!
//! A warp moves a pixel between two corresponding faces through the face's
//! local `(u, v)` frame: invert the target face's mapping at the pixel
//! centre, then evaluate the source face's mapping at the same `(u, v)`.
//! Triangles use an affine frame, quads a bilinear one.

use nalgebra::{Point2, Vector2};

use crate::geom::cross;

/// Slack on the unit-box containment test. Pixels whose centre lies within
/// this margin of a face border are accepted by both neighbouring faces,
/// which avoids pinhole gaps from floating point at shared edges.
const UV_EPS: f64 = 1e-6;

/// Denominators below this are treated as degenerate.
const DENOM_EPS: f64 = 1e-12;

/// An affine mapping between the unit triangle and a world-space triangle.
///
/// `(u, v) = (0, 0)` is the first vertex, `(1, 0)` the second and `(0, 1)`
/// the third.
#[derive(Debug, Clone, Copy)]
pub struct TriMap {
    a: Point2<f64>,
    e: Vector2<f64>,
    f: Vector2<f64>,
}

impl TriMap {
    /// Build the mapping for a triangle given its vertices in ring order.
    pub fn new(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Self {
        Self {
            a,
            e: b - a,
            f: c - a,
        }
    }

    /// The world-space point at local coordinates `(u, v)`.
    #[inline]
    pub fn point(&self, u: f64, v: f64) -> Point2<f64> {
        self.a + self.e * u + self.f * v
    }

    /// The local coordinates of a world-space point, or `None` when the
    /// point lies outside the triangle or the triangle is degenerate.
    pub fn uv(&self, p: Point2<f64>) -> Option<(f64, f64)> {
        let denom = cross(self.e, self.f);
        if denom.abs() < DENOM_EPS {
            return None;
        }
        let h = p - self.a;
        let u = cross(h, self.f) / denom;
        let v = cross(self.e, h) / denom;
        if u >= -UV_EPS && v >= -UV_EPS && u + v <= 1.0 + UV_EPS {
            Some((u, v))
        } else {
            None
        }
    }
}

/// A bilinear mapping between the unit square and a world-space quad.
///
/// `(u, v)` traverses the quad's vertices in ring order: `(0, 0)`, `(1, 0)`,
/// `(1, 1)`, `(0, 1)`. The inverse solves the bilinear equations exactly
/// (a quadratic in `v`), so it stays correct on non-parallelogram quads.
#[derive(Debug, Clone, Copy)]
pub struct QuadMap {
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
    d: Point2<f64>,
}

impl QuadMap {
    /// Build the mapping for a quad given its vertices in ring order.
    pub fn new(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, d: Point2<f64>) -> Self {
        Self { a, b, c, d }
    }

    /// The world-space point at local coordinates `(u, v)`.
    #[inline]
    pub fn point(&self, u: f64, v: f64) -> Point2<f64> {
        let top = self.a + (self.b - self.a) * u;
        let bottom = self.d + (self.c - self.d) * u;
        top + (bottom - top) * v
    }

    /// The local coordinates of a world-space point, or `None` when the
    /// point lies outside the quad or the quad is degenerate.
    pub fn uv(&self, p: Point2<f64>) -> Option<(f64, f64)> {
        let e = self.b - self.a;
        let f = self.d - self.a;
        let g = (self.a - self.b) + (self.c - self.d);
        let h = p - self.a;

        let k2 = cross(g, f);
        let k1 = cross(e, f) + cross(h, g);
        let k0 = cross(h, e);

        let mut roots = [f64::NAN; 2];
        let num_roots = if k2.abs() < DENOM_EPS {
            // Parallelogram: the quadratic collapses to a linear equation
            if k1.abs() < DENOM_EPS {
                return None;
            }
            roots[0] = -k0 / k1;
            1
        } else {
            let disc = k1 * k1 - 4.0 * k2 * k0;
            if disc < 0.0 {
                return None;
            }
            let sq = disc.sqrt();
            roots[0] = (-k1 + sq) / (2.0 * k2);
            roots[1] = (-k1 - sq) / (2.0 * k2);
            2
        };

        for &v in &roots[..num_roots] {
            let denom_x = e.x + g.x * v;
            let u = if denom_x.abs() > DENOM_EPS {
                (h.x - f.x * v) / denom_x
            } else {
                let denom_y = e.y + g.y * v;
                if denom_y.abs() < DENOM_EPS {
                    continue;
                }
                (h.y - f.y * v) / denom_y
            };
            if (-UV_EPS..=1.0 + UV_EPS).contains(&u) && (-UV_EPS..=1.0 + UV_EPS).contains(&v) {
                return Some((u, v));
            }
        }
        None
    }
}

/// The mapping for a face of either arity.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FaceMap {
    Tri(TriMap),
    Quad(QuadMap),
}

impl FaceMap {
    /// Build the mapping for a face's vertex positions in ring order.
    /// `None` for arities other than 3 and 4.
    pub(crate) fn from_ring(pts: &[Point2<f64>]) -> Option<FaceMap> {
        match pts {
            [a, b, c] => Some(FaceMap::Tri(TriMap::new(*a, *b, *c))),
            [a, b, c, d] => Some(FaceMap::Quad(QuadMap::new(*a, *b, *c, *d))),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn point(&self, u: f64, v: f64) -> Point2<f64> {
        match self {
            FaceMap::Tri(m) => m.point(u, v),
            FaceMap::Quad(m) => m.point(u, v),
        }
    }

    #[inline]
    pub(crate) fn uv(&self, p: Point2<f64>) -> Option<(f64, f64)> {
        match self {
            FaceMap::Tri(m) => m.uv(p),
            FaceMap::Quad(m) => m.uv(p),
        }
    }
}
