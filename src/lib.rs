//! # Nucleomesh
//!
//! Landmark-anchored 2D shape meshes for comparing and warping
//! cell-nucleus microscopy images.
//!
//! Nucleomesh drapes a fixed mesh over a nucleus outline so that every
//! vertex, edge and face has the same structural identity on every cell
//! measured with the same parameters. That correspondence supports two
//! analyses no per-shape triangulation can offer:
//!
//! - **Comparison**: per-edge log2 length ratios between a cell and a
//!   reference shape localize where the nucleus expanded or contracted.
//! - **Warping**: a signal raster measured on one cell can be re-rendered
//!   inside the shape of another (typically a population consensus),
//!   normalizing away shape variation before signal patterns are averaged.
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::BTreeMap;
//! use nucleomesh::prelude::*;
//! use nalgebra::Point2;
//!
//! // An outline from the (external) segmentation pipeline
//! let outline: Vec<Point2<f64>> = (0..200)
//!     .map(|i| {
//!         let t = std::f64::consts::TAU * i as f64 / 200.0;
//!         Point2::new(30.0 + 20.0 * t.sin(), 30.0 + 20.0 * t.cos())
//!     })
//!     .collect();
//!
//! let mut landmarks = BTreeMap::new();
//! landmarks.insert(LandmarkId::Reference, 0);
//! landmarks.insert(LandmarkId::Orientation, 100);
//!
//! let mesh = Mesh::build(&outline, &landmarks, MeshDensity::new(2))?;
//! assert_eq!(mesh.num_peripheral_vertices(), 16);
//!
//! // Compare a shape against itself: every ratio is zero
//! let compared = mesh.compare(&mesh)?;
//! for edge in compared.edges() {
//!     assert!(edge.log2_ratio().unwrap().abs() < 1e-9);
//! }
//! # Ok::<(), nucleomesh::error::MeshError>(())
//! ```
//!
//! ## Warping a signal raster
//!
//! ```no_run
//! use nucleomesh::prelude::*;
//! # fn inputs() -> (Mesh, Mesh, Raster) { unimplemented!() }
//! let (cell_mesh, consensus_mesh, signal) = inputs();
//!
//! let binding = RasterBinding::new(&cell_mesh, &signal)?;
//! let normalized = binding.warp(&consensus_mesh)?;
//! # Ok::<(), nucleomesh::error::WarpError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod colour;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod raster;
pub mod warp;

pub use nalgebra;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use nucleomesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::colour::{gradient_colour, Colour};
    pub use crate::error::{MeshError, Result, WarpError};
    pub use crate::mesh::{
        Edge, EdgeId, Face, FaceId, LandmarkId, Mesh, MeshDensity, ShapeSegment, Vertex, VertexId,
        VertexTag,
    };
    pub use crate::raster::Raster;
    pub use crate::warp::{warp, Progress, RasterBinding, WarpOptions};
}
