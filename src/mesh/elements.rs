//! Vertex, edge and face value types.
//!
//! All three are plain data owned by the [`Mesh`](super::Mesh) arenas and
//! cross-reference each other by index, so cloning a mesh for comparison is
//! a straight memcpy of three vectors.

use nalgebra::Point2;

use super::index::{EdgeId, VertexId, VertexTag};

/// A mesh vertex: a 2D position plus its structural identity.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position of the vertex in image coordinates.
    pub position: Point2<f64>,
    /// Structural identity, stable across shapes.
    pub tag: VertexTag,
}

/// An edge between two vertices.
///
/// `reference_length` is populated only on meshes produced by
/// [`Mesh::compare`](super::Mesh::compare) and holds the length of the
/// structurally corresponding edge in the reference mesh.
#[derive(Debug, Clone)]
pub struct Edge {
    /// First endpoint.
    pub a: VertexId,
    /// Second endpoint.
    pub b: VertexId,
    /// Euclidean length, derived at construction.
    pub length: f64,
    /// Length of the corresponding edge in a comparison partner.
    pub reference_length: Option<f64>,
}

impl Edge {
    /// The log2 ratio of this edge's length to its reference length.
    ///
    /// `None` unless the owning mesh was produced by `compare`. Positive
    /// values mean this edge is longer than its reference (local
    /// expansion), negative values local contraction.
    #[inline]
    pub fn log2_ratio(&self) -> Option<f64> {
        self.reference_length.map(|r| (self.length / r).log2())
    }

    /// Whether the edge joins the given vertex.
    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }
}

/// A simple polygonal face of three or four vertices.
#[derive(Debug, Clone)]
pub struct Face {
    /// Vertices in ring order.
    pub vertices: Vec<VertexId>,
    /// Bounding edges, parallel to the vertex ring.
    pub edges: Vec<EdgeId>,
    /// Name of the shape segment covering this face, if any.
    pub segment_name: Option<String>,
}

impl Face {
    /// Whether this face is a triangle.
    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }

    /// Whether this face is a quad.
    #[inline]
    pub fn is_quad(&self) -> bool {
        self.vertices.len() == 4
    }
}

/// A named contiguous region of the outline.
///
/// Supplied by the (external) segmentation provider; used only to tag the
/// faces whose peripheral vertices all fall within the region, so the
/// renderer can colour biologically distinct substructures.
#[derive(Debug, Clone)]
pub struct ShapeSegment {
    /// Name of the region.
    pub name: String,
    /// First border index of the region (inclusive).
    pub start: usize,
    /// Last border index of the region (inclusive); may wrap past index 0.
    pub end: usize,
}

impl ShapeSegment {
    /// Whether the region covers the given border index on an outline of
    /// `outline_len` points. Handles ranges that wrap past index 0.
    pub fn contains(&self, border_index: usize, outline_len: usize) -> bool {
        let idx = border_index % outline_len.max(1);
        if self.start <= self.end {
            idx >= self.start && idx <= self.end
        } else {
            idx >= self.start || idx <= self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log2_ratio() {
        let mut e = Edge {
            a: VertexId::new(0),
            b: VertexId::new(1),
            length: 2.0,
            reference_length: None,
        };
        assert_eq!(e.log2_ratio(), None);

        e.reference_length = Some(1.0);
        assert!((e.log2_ratio().unwrap() - 1.0).abs() < 1e-12);

        e.reference_length = Some(2.0);
        assert!(e.log2_ratio().unwrap().abs() < 1e-12);

        e.reference_length = Some(4.0);
        assert!((e.log2_ratio().unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_contains_plain_range() {
        let seg = ShapeSegment {
            name: "acrosome".into(),
            start: 10,
            end: 20,
        };
        assert!(seg.contains(10, 100));
        assert!(seg.contains(15, 100));
        assert!(seg.contains(20, 100));
        assert!(!seg.contains(9, 100));
        assert!(!seg.contains(21, 100));
    }

    #[test]
    fn test_segment_contains_wrapping_range() {
        let seg = ShapeSegment {
            name: "tail hook".into(),
            start: 90,
            end: 10,
        };
        assert!(seg.contains(95, 100));
        assert!(seg.contains(0, 100));
        assert!(seg.contains(10, 100));
        assert!(!seg.contains(50, 100));
    }
}
