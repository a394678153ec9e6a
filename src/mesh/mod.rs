//! Core mesh data structures.
//!
//! This module provides the landmark-anchored mesh representation and
//! related types.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], built over a closed outline by
//! [`Mesh::build`]. Its structure is a ring of peripheral vertices joined
//! by chords carrying an internal grid, with triangle fans at the two
//! landmark poles and quad strips in between. The structure is a pure
//! function of the [`MeshDensity`] and the landmark set, so meshes from
//! different shapes correspond element-for-element and can be compared or
//! warped between.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an edge
//! - [`FaceId`] - Identifies a face
//!
//! Vertices additionally carry a [`VertexTag`], their structural identity
//! across meshes.
//!
//! # Construction
//!
//! ```
//! use std::collections::BTreeMap;
//! use nucleomesh::mesh::{LandmarkId, Mesh, MeshDensity};
//! use nalgebra::Point2;
//!
//! let outline: Vec<Point2<f64>> = (0..200)
//!     .map(|i| {
//!         let t = std::f64::consts::TAU * i as f64 / 200.0;
//!         Point2::new(30.0 + 20.0 * t.sin(), 30.0 + 20.0 * t.cos())
//!     })
//!     .collect();
//! let mut landmarks = BTreeMap::new();
//! landmarks.insert(LandmarkId::Reference, 0);
//!
//! let mesh = Mesh::build(&outline, &landmarks, MeshDensity::default()).unwrap();
//! assert!(mesh.num_faces() > 0);
//! ```

mod builder;
mod elements;
mod index;
#[allow(clippy::module_inception)]
mod mesh;

pub use elements::{Edge, Face, ShapeSegment, Vertex};
pub use index::{EdgeId, FaceId, LandmarkId, VertexId, VertexTag};
pub use mesh::{Mesh, MeshDensity};
