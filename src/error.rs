//! Error types for nucleomesh.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::mesh::LandmarkId;

/// Result type alias using [`MeshError`].
pub type Result<T, E = MeshError> = std::result::Result<T, E>;

/// Errors that can occur while building or comparing meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The outline has too few border points for the requested density.
    #[error("outline has {points} points but the mesh requires at least {required}")]
    DegenerateOutline {
        /// Number of points in the supplied outline.
        points: usize,
        /// Minimum number of points required by the density and landmark set.
        required: usize,
    },

    /// A required landmark is absent or its border index is out of bounds.
    #[error("landmark {landmark:?} is missing or outside the outline")]
    MissingLandmark {
        /// The offending landmark.
        landmark: LandmarkId,
    },

    /// A zero-area or self-intersecting face was produced during construction.
    #[error("face {face} is degenerate (zero area or self-intersecting)")]
    InvalidFace {
        /// Index of the offending face in construction order.
        face: usize,
    },

    /// Two meshes do not share the same vertex/edge/face structure.
    #[error("meshes have different topology: {details}")]
    TopologyMismatch {
        /// Description of the first structural difference found.
        details: String,
    },
}

/// Errors that can occur while binding or warping rasters.
#[derive(Error, Debug)]
pub enum WarpError {
    /// The source raster does not cover the bound mesh's bounding box.
    #[error(
        "raster is {actual_width}x{actual_height} but the mesh extends to ({needed_x:.1}, {needed_y:.1})"
    )]
    RasterTooSmall {
        /// Width of the supplied raster.
        actual_width: usize,
        /// Height of the supplied raster.
        actual_height: usize,
        /// Largest x coordinate reached by the mesh.
        needed_x: f64,
        /// Largest y coordinate reached by the mesh.
        needed_y: f64,
    },

    /// A raster was constructed from a buffer of the wrong length.
    #[error("raster data length mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected buffer length (width * height).
        expected: usize,
        /// Actual buffer length supplied.
        actual: usize,
    },

    /// The warp target does not share the bound mesh's topology.
    #[error("meshes have different topology: {details}")]
    TopologyMismatch {
        /// Description of the first structural difference found.
        details: String,
    },

    /// A face of the bound mesh has no structural counterpart in the target.
    #[error("face {face} has no corresponding face in the target mesh")]
    FaceCorrespondenceFailed {
        /// Index of the face without a counterpart.
        face: usize,
    },

    /// The warp was stopped through its options' cancel flag.
    #[error("warp cancelled after {completed} of {total} faces")]
    Cancelled {
        /// Faces fully rasterized before cancellation was observed.
        completed: usize,
        /// Total number of faces the warp would have covered.
        total: usize,
    },
}
