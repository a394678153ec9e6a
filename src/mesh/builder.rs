//! Mesh construction.
//!
//! Turns a closed outline, a landmark map and a density into the fixed
//! vertex/edge/face structure shared by every mesh with the same
//! parameters. Construction is entirely deterministic: element order
//! depends only on the density and the landmark count, so two meshes built
//! with the same parameters correspond index-for-index.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::geom;

use super::elements::{Edge, Face, ShapeSegment, Vertex};
use super::index::{EdgeId, LandmarkId, VertexId, VertexTag};
use super::mesh::{Mesh, MeshDensity};

/// Faces with absolute area below this are rejected as degenerate.
const AREA_EPS: f64 = 1e-9;

pub(crate) fn build_mesh(
    outline: &[Point2<f64>],
    landmarks: &BTreeMap<LandmarkId, usize>,
    density: MeshDensity,
    segments: Option<&[ShapeSegment]>,
) -> Result<Mesh> {
    let n = outline.len();

    if !landmarks.contains_key(&LandmarkId::Reference) {
        return Err(MeshError::MissingLandmark {
            landmark: LandmarkId::Reference,
        });
    }
    for (&landmark, &index) in landmarks {
        if index >= n {
            return Err(MeshError::MissingLandmark { landmark });
        }
    }

    let spans = landmarks.len();
    let slots_per_span = density.vertices_per_span();
    let required = spans * slots_per_span;
    if n < required {
        return Err(MeshError::DegenerateOutline {
            points: n,
            required,
        });
    }

    // Landmark border indices in outline order, starting at the reference
    let reference = landmarks[&LandmarkId::Reference];
    let mut anchors: Vec<usize> = landmarks.values().copied().collect();
    anchors.sort_by_key(|&ix| (ix + n - reference) % n);
    if anchors.windows(2).any(|w| w[0] == w[1]) {
        return Err(MeshError::DegenerateOutline {
            points: n,
            required,
        });
    }

    // Peripheral vertices: each span between consecutive landmarks is
    // divided into equal strides of border index, so slot assignment
    // depends on point count along the border rather than arc length.
    // Landmark k therefore always lands exactly on slot k * slots_per_span.
    let mut vertices: Vec<Vertex> = Vec::with_capacity(required * 2);
    let mut slot_border: Vec<usize> = Vec::with_capacity(required);
    for (k, &start) in anchors.iter().enumerate() {
        let end = anchors[(k + 1) % spans];
        let mut span_len = (end + n - start) % n;
        if span_len == 0 {
            // Single landmark: the span is the whole outline
            span_len = n;
        }
        for j in 0..slots_per_span {
            let t = start as f64 + span_len as f64 * j as f64 / slots_per_span as f64;
            let base = t.floor();
            let i0 = base as usize % n;
            let a = outline[i0];
            let b = outline[(i0 + 1) % n];
            let slot = vertices.len();
            vertices.push(Vertex {
                position: a + (b - a) * (t - base),
                tag: VertexTag::Peripheral(slot),
            });
            slot_border.push(t.round() as usize % n);
        }
    }

    let peripheral_count = vertices.len();
    let half = peripheral_count / 2;
    let cols = density.internal_columns();

    // Internal grid: chord row r joins peripheral slots r and N - r, with
    // `cols` vertices at fixed fractional positions along the chord.
    for row in 1..half {
        let a = vertices[row].position;
        let b = vertices[peripheral_count - row].position;
        for col in 0..cols {
            let t = (col + 1) as f64 / (cols + 1) as f64;
            vertices.push(Vertex {
                position: a + (b - a) * t,
                tag: VertexTag::Internal { row, col },
            });
        }
    }

    let peripheral_id = |slot: usize| VertexId::new(slot % peripheral_count);
    let internal_id = |row: usize, col: usize| {
        VertexId::new(peripheral_count + (row - 1) * cols + col)
    };

    // The vertices along chord row r, from slot r across to slot N - r.
    // Rows 0 and `half` are the landmark poles with no chord.
    let stations = |row: usize| -> Vec<VertexId> {
        let mut s = Vec::with_capacity(cols + 2);
        s.push(peripheral_id(row));
        for col in 0..cols {
            s.push(internal_id(row, col));
        }
        s.push(peripheral_id(peripheral_count - row));
        s
    };

    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_lookup: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
    let mut link = |a: VertexId, b: VertexId| {
        let key = if a <= b { (a, b) } else { (b, a) };
        *edge_lookup.entry(key).or_insert_with(|| {
            let id = EdgeId::new(edges.len());
            let length =
                (vertices[b.index()].position - vertices[a.index()].position).norm();
            edges.push(Edge {
                a,
                b,
                length,
                reference_length: None,
            });
            id
        })
    };

    // Outline ring
    for slot in 0..peripheral_count {
        link(peripheral_id(slot), peripheral_id(slot + 1));
    }
    // Chords
    for row in 1..half {
        let s = stations(row);
        for pair in s.windows(2) {
            link(pair[0], pair[1]);
        }
    }
    // Rails between adjacent chords
    for row in 1..half.saturating_sub(1) {
        for col in 0..cols {
            link(internal_id(row, col), internal_id(row + 1, col));
        }
    }
    // Fans joining the poles to their nearest chord
    if half >= 2 {
        for col in 0..cols {
            link(peripheral_id(0), internal_id(1, col));
            link(peripheral_id(half), internal_id(half - 1, col));
        }
    }

    let find_edge = |a: VertexId, b: VertexId| -> EdgeId {
        let key = if a <= b { (a, b) } else { (b, a) };
        edge_lookup[&key]
    };

    let mut faces: Vec<Face> = Vec::new();
    let mut push_face = |ring: &[VertexId]| -> Result<()> {
        let pts: Vec<Point2<f64>> =
            ring.iter().map(|v| vertices[v.index()].position).collect();
        if geom::polygon_area(&pts).abs() < AREA_EPS {
            return Err(MeshError::InvalidFace { face: faces.len() });
        }
        if pts.len() == 4
            && (geom::segments_intersect(pts[0], pts[1], pts[2], pts[3])
                || geom::segments_intersect(pts[1], pts[2], pts[3], pts[0]))
        {
            return Err(MeshError::InvalidFace { face: faces.len() });
        }
        let bounding = (0..ring.len())
            .map(|i| find_edge(ring[i], ring[(i + 1) % ring.len()]))
            .collect();
        faces.push(Face {
            vertices: ring.to_vec(),
            edges: bounding,
            segment_name: None,
        });
        Ok(())
    };

    // Triangle fan at the reference pole
    let first = stations(1);
    for pair in first.windows(2) {
        push_face(&[peripheral_id(0), pair[0], pair[1]])?;
    }
    // Quad strips between adjacent chords
    for row in 1..half.saturating_sub(1) {
        let sa = stations(row);
        let sb = stations(row + 1);
        for c in 0..cols + 1 {
            push_face(&[sa[c], sa[c + 1], sb[c + 1], sb[c]])?;
        }
    }
    // Triangle fan at the opposite pole
    let last = stations(half - 1);
    for pair in last.windows(2) {
        push_face(&[pair[1], pair[0], peripheral_id(half)])?;
    }

    // Tag faces whose peripheral vertices all fall in one segment
    if let Some(segments) = segments {
        for face in &mut faces {
            let borders: Vec<usize> = face
                .vertices
                .iter()
                .filter_map(|v| match vertices[v.index()].tag {
                    VertexTag::Peripheral(slot) => Some(slot_border[slot]),
                    VertexTag::Internal { .. } => None,
                })
                .collect();
            if borders.is_empty() {
                continue;
            }
            for segment in segments {
                if borders.iter().all(|&b| segment.contains(b, n)) {
                    face.segment_name = Some(segment.name.clone());
                    break;
                }
            }
        }
    }

    debug!(
        "built mesh: {} vertices ({} peripheral), {} edges, {} faces",
        vertices.len(),
        peripheral_count,
        edges.len(),
        faces.len()
    );

    Ok(Mesh {
        vertices,
        edges,
        faces,
        density,
        landmark_count: spans,
        peripheral_count,
    })
}
