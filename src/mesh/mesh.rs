//! The landmark-anchored shape mesh.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::geom;

use super::builder;
use super::elements::{Edge, Face, ShapeSegment, Vertex};
use super::index::{EdgeId, FaceId, LandmarkId, VertexId};

/// Controls how many vertices a mesh places around and inside a shape.
///
/// For a density factor `d`, each border span between consecutive landmarks
/// receives `4 * d` peripheral slots and each internal chord carries
/// `2 * d - 1` grid vertices. A factor of 1 reduces the internal grid to a
/// single midpoint skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshDensity(u32);

impl MeshDensity {
    /// Create a density with the given factor. Factors below 1 are clamped.
    pub fn new(factor: u32) -> Self {
        Self(factor.max(1))
    }

    /// The raw density factor.
    #[inline]
    pub fn factor(self) -> u32 {
        self.0
    }

    /// Peripheral vertex slots per border span.
    #[inline]
    pub fn vertices_per_span(self) -> usize {
        4 * self.0 as usize
    }

    /// Internal grid vertices per chord.
    #[inline]
    pub fn internal_columns(self) -> usize {
        2 * self.0 as usize - 1
    }
}

impl Default for MeshDensity {
    fn default() -> Self {
        Self(2)
    }
}

/// A landmark-anchored mesh over a closed 2D outline.
///
/// The mesh owns arenas of vertices, edges and faces created once at
/// construction and immutable thereafter. Vertex identity (the
/// [`VertexTag`](super::VertexTag) sequence) depends only on the density
/// and the number of landmarks, never on the outline geometry, so any two
/// meshes built with the same parameters correspond element-for-element.
/// This is what allows
/// signal patterns from differently shaped nuclei to be compared and warped
/// into a common frame.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use nucleomesh::prelude::*;
/// use nucleomesh::nalgebra::Point2;
///
/// let outline: Vec<Point2<f64>> = (0..200)
///     .map(|i| {
///         let t = std::f64::consts::TAU * i as f64 / 200.0;
///         Point2::new(30.0 + 20.0 * t.sin(), 30.0 + 20.0 * t.cos())
///     })
///     .collect();
///
/// let mut landmarks = BTreeMap::new();
/// landmarks.insert(LandmarkId::Reference, 0);
/// landmarks.insert(LandmarkId::Orientation, 100);
///
/// let mesh = Mesh::build(&outline, &landmarks, MeshDensity::new(2)).unwrap();
/// assert_eq!(mesh.num_peripheral_vertices(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,
    pub(crate) density: MeshDensity,
    pub(crate) landmark_count: usize,
    pub(crate) peripheral_count: usize,
}

impl Mesh {
    /// Build a mesh from a closed outline, a landmark map and a density.
    ///
    /// The outline is an ordered, closed, non-self-intersecting polygon.
    /// `landmarks` maps each landmark to a border index into `outline`;
    /// [`LandmarkId::Reference`] is mandatory. Every landmark is forced
    /// onto a fixed, density-determined peripheral slot so that slot
    /// assignment is identical across all shapes sharing the same density
    /// and landmark set.
    pub fn build(
        outline: &[Point2<f64>],
        landmarks: &BTreeMap<LandmarkId, usize>,
        density: MeshDensity,
    ) -> Result<Mesh> {
        builder::build_mesh(outline, landmarks, density, None)
    }

    /// Build a mesh and tag faces with named shape segments.
    ///
    /// Faces whose peripheral vertices all fall within one segment's
    /// border-index range inherit that segment's name; purely internal
    /// faces stay untagged.
    pub fn build_with_segments(
        outline: &[Point2<f64>],
        landmarks: &BTreeMap<LandmarkId, usize>,
        density: MeshDensity,
        segments: &[ShapeSegment],
    ) -> Result<Mesh> {
        builder::build_mesh(outline, landmarks, density, Some(segments))
    }

    // ==================== Accessors ====================

    /// The density this mesh was built with.
    #[inline]
    pub fn density(&self) -> MeshDensity {
        self.density
    }

    /// The number of landmarks this mesh was built with.
    #[inline]
    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    /// Total number of vertices, peripheral and internal.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of peripheral vertices.
    #[inline]
    pub fn num_peripheral_vertices(&self) -> usize {
        self.peripheral_count
    }

    /// Number of internal vertices.
    #[inline]
    pub fn num_internal_vertices(&self) -> usize {
        self.vertices.len() - self.peripheral_count
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// All vertices in arena order (peripheral slots first, then the
    /// internal grid row by row).
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edges in construction order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All faces in construction order.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// The vertex ID of a peripheral slot.
    #[inline]
    pub fn peripheral_id(&self, slot: usize) -> VertexId {
        debug_assert!(slot < self.peripheral_count);
        VertexId::new(slot)
    }

    /// The vertex ID of an internal grid position.
    #[inline]
    pub fn internal_id(&self, row: usize, col: usize) -> VertexId {
        let cols = self.density.internal_columns();
        debug_assert!(row >= 1 && row < self.peripheral_count / 2);
        debug_assert!(col < cols);
        VertexId::new(self.peripheral_count + (row - 1) * cols + col)
    }

    /// Find the edge joining two vertices, if one exists.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_ids()
            .find(|&e| self.edges[e.index()].contains(a) && self.edges[e.index()].contains(b))
    }

    // ==================== Geometry ====================

    /// Axis-aligned bounding box of the mesh.
    pub fn bounding_box(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = self.vertices[0].position;
        let mut max = min;
        for v in &self.vertices {
            min.x = min.x.min(v.position.x);
            min.y = min.y.min(v.position.y);
            max.x = max.x.max(v.position.x);
            max.y = max.y.max(v.position.y);
        }
        (min, max)
    }

    /// The positions of a face's vertices in ring order.
    pub fn face_positions(&self, id: FaceId) -> Vec<Point2<f64>> {
        self.faces[id.index()]
            .vertices
            .iter()
            .map(|v| self.vertices[v.index()].position)
            .collect()
    }

    /// The centroid of a face.
    pub fn face_centroid(&self, id: FaceId) -> Point2<f64> {
        let face = &self.faces[id.index()];
        let mut sum = nalgebra::Vector2::zeros();
        for v in &face.vertices {
            sum += self.vertices[v.index()].position.coords;
        }
        Point2::from(sum / face.vertices.len() as f64)
    }

    /// The mean log2 deformation ratio of a face's bounding edges.
    ///
    /// `None` unless this mesh was produced by [`Mesh::compare`].
    pub fn face_ratio(&self, id: FaceId) -> Option<f64> {
        let face = &self.faces[id.index()];
        let mut sum = 0.0;
        for e in &face.edges {
            sum += self.edges[e.index()].log2_ratio()?;
        }
        Some(sum / face.edges.len() as f64)
    }

    /// The largest absolute log2 ratio over all edges, for scaling a
    /// colour gradient. `None` unless this mesh was produced by `compare`.
    pub fn max_abs_log2_ratio(&self) -> Option<f64> {
        self.edges
            .iter()
            .map(|e| e.log2_ratio().map(f64::abs))
            .try_fold(0.0_f64, |acc, r| r.map(|r| acc.max(r)))
    }

    /// Find the face containing the given point, if any.
    pub fn face_containing(&self, p: Point2<f64>) -> Option<FaceId> {
        self.face_ids()
            .find(|&f| geom::point_in_polygon(p, &self.face_positions(f)))
    }

    // ==================== Comparison ====================

    /// Whether this mesh shares the other's vertex/edge/face structure.
    pub fn is_comparable_to(&self, other: &Mesh) -> bool {
        self.topology_mismatch(other).is_none()
    }

    /// Compare this mesh against a structurally identical reference.
    ///
    /// Returns a new mesh geometrically equal to `self` whose edges carry
    /// the corresponding edge length of `reference`, from which per-edge
    /// and per-face log2 deformation ratios are derived. Neither input is
    /// mutated. Matching is purely structural; it succeeds only when both
    /// meshes were built with the same density and landmark set.
    pub fn compare(&self, reference: &Mesh) -> Result<Mesh> {
        if let Some(details) = self.topology_mismatch(reference) {
            return Err(MeshError::TopologyMismatch { details });
        }

        debug!(
            "comparing mesh of {} edges against reference",
            self.edges.len()
        );

        let mut result = self.clone();
        for (edge, reference_edge) in result.edges.iter_mut().zip(reference.edges.iter()) {
            edge.reference_length = Some(reference_edge.length);
        }
        Ok(result)
    }

    /// Describe the first structural difference from `other`, or `None`
    /// when the meshes correspond element-for-element.
    pub(crate) fn topology_mismatch(&self, other: &Mesh) -> Option<String> {
        if self.vertices.len() != other.vertices.len() {
            return Some(format!(
                "{} vertices vs {}",
                self.vertices.len(),
                other.vertices.len()
            ));
        }
        if self.edges.len() != other.edges.len() {
            return Some(format!("{} edges vs {}", self.edges.len(), other.edges.len()));
        }
        if self.faces.len() != other.faces.len() {
            return Some(format!("{} faces vs {}", self.faces.len(), other.faces.len()));
        }
        for (i, (a, b)) in self.vertices.iter().zip(other.vertices.iter()).enumerate() {
            if a.tag != b.tag {
                return Some(format!("vertex {} is {} vs {}", i, a.tag, b.tag));
            }
        }
        for (i, (a, b)) in self.edges.iter().zip(other.edges.iter()).enumerate() {
            if a.a != b.a || a.b != b.b {
                return Some(format!("edge {} joins different vertices", i));
            }
        }
        for (i, (a, b)) in self.faces.iter().zip(other.faces.iter()).enumerate() {
            if a.vertices != b.vertices {
                return Some(format!("face {} has different vertices", i));
            }
        }
        None
    }

    // ==================== Straightening ====================

    /// Reposition the mesh so the internal skeleton forms a vertical line.
    ///
    /// Returns a new mesh with identical topology whose chord rows are
    /// stacked at uniform vertical spacing between the two pole vertices,
    /// spanning this mesh's bounding-box height and width. Edge lengths are
    /// re-derived; where an edge carries a reference length its log2 ratio
    /// is preserved so a compared mesh can be rendered unrolled without
    /// losing its deformation colouring. `self` is never mutated.
    pub fn straighten(&self) -> Mesh {
        let (min, max) = self.bounding_box();
        let width = max.x - min.x;
        let height = max.y - min.y;

        let half = self.peripheral_count / 2;
        let cols = self.density.internal_columns();
        let y_step = height / half as f64;
        let x_step = width / 2.0;

        debug!("straightening mesh of {} chord rows", half - 1);

        let mut result = self.clone();
        result.vertices[0].position = Point2::new(0.0, 0.0);
        result.vertices[half].position = Point2::new(0.0, height);

        for row in 1..half {
            let y = row as f64 * y_step;
            result.vertices[row].position = Point2::new(-x_step, y);
            result.vertices[self.peripheral_count - row].position = Point2::new(x_step, y);
            for col in 0..cols {
                let t = (col + 1) as f64 / (cols + 1) as f64;
                let id = self.internal_id(row, col);
                result.vertices[id.index()].position =
                    Point2::new(-x_step + 2.0 * x_step * t, y);
            }
        }

        for edge in result.edges.iter_mut() {
            let old_length = edge.length;
            let a = result.vertices[edge.a.index()].position;
            let b = result.vertices[edge.b.index()].position;
            edge.length = (b - a).norm();
            // Rescale the reference so length/reference is unchanged
            if let Some(reference) = edge.reference_length {
                edge.reference_length = Some(edge.length * reference / old_length);
            }
        }

        result
    }
}
