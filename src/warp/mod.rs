//! Mesh-to-mesh raster warping.
//!
//! Warping re-renders the signal raster of one nucleus inside the shape of
//! another. Bind a mesh to the raster it was measured on with
//! [`RasterBinding::new`], then call [`RasterBinding::warp`] with any
//! structurally identical target mesh. Each output pixel inside a target
//! face is mapped through the face's local `(u, v)` frame into the
//! corresponding source face and filled by bilinear sampling; pixels
//! outside every face stay [`Raster::BACKGROUND`].
//!
//! # Example
//!
//! ```no_run
//! use nucleomesh::prelude::*;
//! # fn get_meshes() -> (Mesh, Mesh, Raster) { unimplemented!() }
//! let (source_mesh, target_mesh, signal) = get_meshes();
//!
//! let binding = RasterBinding::new(&source_mesh, &signal)?;
//! let warped = binding.warp(&target_mesh)?;
//! # Ok::<(), nucleomesh::error::WarpError>(())
//! ```

pub mod mapping;
pub mod progress;

pub use mapping::{QuadMap, TriMap};
pub use progress::Progress;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;
use nalgebra::Point2;
use rayon::prelude::*;

use crate::error::WarpError;
use crate::mesh::{FaceId, Mesh};
use crate::raster::Raster;

use mapping::FaceMap;

/// Options for raster warps.
#[derive(Debug, Clone)]
pub struct WarpOptions {
    /// Whether to rasterize faces in parallel (default: true).
    pub parallel: bool,

    /// Cooperative cancellation flag, checked between face iterations.
    /// Raising it makes an in-flight warp return [`WarpError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            cancel: None,
        }
    }
}

impl WarpOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Attach a cancellation flag shared with the caller.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the attached cancel flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// A mesh bound to the signal raster it was measured on.
///
/// Binding verifies once that the raster covers the mesh, so every warp
/// from this source can sample it without bounds anxiety. The binding
/// borrows both inputs and never mutates them.
#[derive(Debug)]
pub struct RasterBinding<'a> {
    mesh: &'a Mesh,
    source: &'a Raster,
}

impl<'a> RasterBinding<'a> {
    /// Bind a mesh to its source raster.
    ///
    /// Fails with [`WarpError::RasterTooSmall`] when the mesh's bounding
    /// box extends outside the raster.
    pub fn new(mesh: &'a Mesh, source: &'a Raster) -> Result<Self, WarpError> {
        let (min, max) = mesh.bounding_box();
        if min.x < 0.0
            || min.y < 0.0
            || max.x >= source.width() as f64
            || max.y >= source.height() as f64
        {
            return Err(WarpError::RasterTooSmall {
                actual_width: source.width(),
                actual_height: source.height(),
                needed_x: max.x,
                needed_y: max.y,
            });
        }
        Ok(Self { mesh, source })
    }

    /// Bind a mesh to its source raster.
    ///
    /// Convenience alias for [`RasterBinding::new`].
    pub fn bind(mesh: &'a Mesh, source: &'a Raster) -> Result<Self, WarpError> {
        Self::new(mesh, source)
    }

    /// The bound mesh.
    #[inline]
    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    /// The bound raster.
    #[inline]
    pub fn source(&self) -> &Raster {
        self.source
    }

    /// The fraction of the mesh's total signal falling inside one face.
    ///
    /// Every pixel centre covered by the mesh is attributed to the first
    /// face containing it; the result is the attributed intensity sum of
    /// `face` divided by the sum over all faces. Pixels outside every face
    /// are excluded from the total. Returns 0.0 when the mesh covers no
    /// signal at all.
    pub fn signal_proportion(&self, face: FaceId) -> f64 {
        let (min, max) = self.mesh.bounding_box();
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil() as usize).min(self.source.width().saturating_sub(1));
        let y1 = (max.y.ceil() as usize).min(self.source.height().saturating_sub(1));

        let mut face_sum = 0.0_f64;
        let mut total = 0.0_f64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let centre = Point2::new(x as f64, y as f64);
                let Some(owner) = self.mesh.face_containing(centre) else {
                    continue;
                };
                let value = f64::from(self.source.get(x, y).unwrap_or(Raster::BACKGROUND));
                total += value;
                if owner == face {
                    face_sum += value;
                }
            }
        }

        if total > 0.0 {
            face_sum / total
        } else {
            0.0
        }
    }

    /// Warp the bound raster onto a target mesh with default options.
    pub fn warp(&self, target: &Mesh) -> Result<Raster, WarpError> {
        self.warp_with_progress(target, &WarpOptions::default(), &Progress::none())
    }

    /// Warp the bound raster onto a target mesh.
    pub fn warp_with_options(
        &self,
        target: &Mesh,
        options: &WarpOptions,
    ) -> Result<Raster, WarpError> {
        self.warp_with_progress(target, options, &Progress::none())
    }

    /// Warp the bound raster onto a target mesh, reporting per-face
    /// progress.
    ///
    /// The output raster is sized to the target mesh's bounding box, so the
    /// target should live in non-negative coordinates (translate it first
    /// if necessary). The target must share the bound mesh's topology;
    /// pixel values are carried between structurally corresponding faces,
    /// never between geometrically nearby ones.
    pub fn warp_with_progress(
        &self,
        target: &Mesh,
        options: &WarpOptions,
        progress: &Progress,
    ) -> Result<Raster, WarpError> {
        if let Some(details) = self.mesh.topology_mismatch(target) {
            return Err(WarpError::TopologyMismatch { details });
        }

        let (_, max) = target.bounding_box();
        let width = max.x.ceil() as usize + 1;
        let height = max.y.ceil() as usize + 1;
        let num_faces = target.num_faces();

        debug!(
            "warping {} faces onto a {}x{} raster",
            num_faces, width, height
        );

        let face_pixels = |i: usize| -> Result<Vec<(usize, usize, f32)>, WarpError> {
            let id = FaceId::new(i);
            let target_ring = target.face_positions(id);
            let target_map = FaceMap::from_ring(&target_ring)
                .ok_or(WarpError::FaceCorrespondenceFailed { face: i })?;
            let source_map = FaceMap::from_ring(&self.mesh.face_positions(id))
                .ok_or(WarpError::FaceCorrespondenceFailed { face: i })?;

            let x0 = target_ring
                .iter()
                .map(|p| p.x)
                .fold(f64::INFINITY, f64::min)
                .floor()
                .max(0.0) as usize;
            let y0 = target_ring
                .iter()
                .map(|p| p.y)
                .fold(f64::INFINITY, f64::min)
                .floor()
                .max(0.0) as usize;
            let x1 = (target_ring
                .iter()
                .map(|p| p.x)
                .fold(f64::NEG_INFINITY, f64::max)
                .ceil() as usize)
                .min(width - 1);
            let y1 = (target_ring
                .iter()
                .map(|p| p.y)
                .fold(f64::NEG_INFINITY, f64::max)
                .ceil() as usize)
                .min(height - 1);

            let mut pixels = Vec::new();
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let centre = Point2::new(x as f64, y as f64);
                    if let Some((u, v)) = target_map.uv(centre) {
                        let src = source_map.point(u, v);
                        pixels.push((x, y, self.source.sample_bilinear(src.x, src.y)));
                    }
                }
            }
            Ok(pixels)
        };

        let per_face: Result<Vec<Vec<(usize, usize, f32)>>, WarpError> = if options.parallel {
            let done = AtomicUsize::new(0);
            (0..num_faces)
                .into_par_iter()
                .map(|i| {
                    if options.is_cancelled() {
                        return Err(WarpError::Cancelled {
                            completed: done.load(Ordering::Relaxed),
                            total: num_faces,
                        });
                    }
                    let pixels = face_pixels(i)?;
                    let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.report(completed, num_faces, "warping faces");
                    Ok(pixels)
                })
                .collect()
        } else {
            (0..num_faces)
                .map(|i| {
                    if options.is_cancelled() {
                        return Err(WarpError::Cancelled {
                            completed: i,
                            total: num_faces,
                        });
                    }
                    let pixels = face_pixels(i)?;
                    progress.report(i + 1, num_faces, "warping faces");
                    Ok(pixels)
                })
                .collect()
        };

        let mut output = Raster::new(width, height);
        for pixels in per_face? {
            for (x, y, value) in pixels {
                output.set(x, y, value);
            }
        }
        Ok(output)
    }
}

/// Bind `source_mesh` to `source` and warp onto `target` in one call.
pub fn warp(source_mesh: &Mesh, source: &Raster, target: &Mesh) -> Result<Raster, WarpError> {
    RasterBinding::new(source_mesh, source)?.warp(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{LandmarkId, MeshDensity};
    use std::collections::BTreeMap;

    fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Vec<Point2<f64>> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(cx + r * t.sin(), cy + r * t.cos())
            })
            .collect()
    }

    fn ellipse(cx: f64, cy: f64, a: f64, b: f64, n: usize) -> Vec<Point2<f64>> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(cx + a * t.sin(), cy + b * t.cos())
            })
            .collect()
    }

    fn two_landmarks() -> BTreeMap<LandmarkId, usize> {
        let mut landmarks = BTreeMap::new();
        landmarks.insert(LandmarkId::Reference, 0);
        landmarks.insert(LandmarkId::Orientation, 100);
        landmarks
    }

    /// A linear intensity pattern; bilinear sampling reproduces it exactly.
    fn gradient_raster(width: usize, height: usize) -> Raster {
        let mut r = Raster::new(width, height);
        for y in 0..height {
            for x in 0..width {
                r.set(x, y, 10.0 + x as f32 + 2.0 * y as f32);
            }
        }
        r
    }

    #[test]
    fn test_bind_rejects_undersized_raster() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let small = Raster::new(32, 32);
        match RasterBinding::new(&mesh, &small) {
            Err(WarpError::RasterTooSmall {
                actual_width: 32,
                actual_height: 32,
                ..
            }) => {}
            other => panic!("expected RasterTooSmall, got {:?}", other),
        }

        let big = Raster::new(64, 64);
        assert!(RasterBinding::new(&mesh, &big).is_ok());
    }

    #[test]
    fn test_bind_rejects_negative_coordinates() {
        let mesh = Mesh::build(&circle(10.0, 10.0, 15.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let raster = Raster::new(64, 64);
        assert!(matches!(
            RasterBinding::new(&mesh, &raster),
            Err(WarpError::RasterTooSmall { .. })
        ));
    }

    #[test]
    fn test_warp_rejects_topology_mismatch() {
        let landmarks = two_landmarks();
        let source_mesh =
            Mesh::build(&circle(30.0, 30.0, 20.0, 200), &landmarks, MeshDensity::new(2)).unwrap();
        let target_mesh =
            Mesh::build(&circle(30.0, 30.0, 20.0, 200), &landmarks, MeshDensity::new(3)).unwrap();
        let raster = Raster::new(64, 64);
        let binding = RasterBinding::new(&source_mesh, &raster).unwrap();
        assert!(matches!(
            binding.warp(&target_mesh),
            Err(WarpError::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn test_self_warp_reproduces_source() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let binding = RasterBinding::new(&mesh, &source).unwrap();
        let out = binding.warp(&mesh).unwrap();

        let mut covered = 0;
        for y in 0..out.height() {
            for x in 0..out.width() {
                let value = out.get(x, y).unwrap();
                if value != Raster::BACKGROUND {
                    covered += 1;
                    let expected = 10.0 + x as f32 + 2.0 * y as f32;
                    assert!(
                        (value - expected).abs() < 0.01,
                        "pixel ({}, {}): {} != {}",
                        x,
                        y,
                        value,
                        expected
                    );
                }
            }
        }
        // The circle covers roughly pi * 20^2 pixels
        assert!(covered > 800, "only {} pixels covered", covered);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let binding = RasterBinding::new(&mesh, &source).unwrap();

        let parallel = binding.warp(&mesh).unwrap();
        let sequential = binding
            .warp_with_options(&mesh, &WarpOptions::default().sequential())
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_warp_between_shapes_and_back() {
        let landmarks = two_landmarks();
        let density = MeshDensity::new(3);
        let circle_mesh =
            Mesh::build(&circle(30.0, 35.0, 20.0, 200), &landmarks, density).unwrap();
        let ellipse_mesh =
            Mesh::build(&ellipse(30.0, 35.0, 20.0, 30.0, 200), &landmarks, density).unwrap();

        let source = gradient_raster(64, 72);
        let onto_ellipse = RasterBinding::new(&circle_mesh, &source)
            .unwrap()
            .warp(&ellipse_mesh)
            .unwrap();

        // Signal appears inside the ellipse
        assert!(onto_ellipse.get(30, 35).unwrap() > 0.0);

        let back = RasterBinding::new(&ellipse_mesh, &onto_ellipse)
            .unwrap()
            .warp(&circle_mesh)
            .unwrap();

        // Pixels well inside the circle survive the round trip. The
        // pattern is linear but the composed per-face mapping is not, so
        // a small resampling error remains.
        for y in 0..back.height() {
            for x in 0..back.width() {
                let dx = x as f64 - 30.0;
                let dy = y as f64 - 35.0;
                if (dx * dx + dy * dy).sqrt() < 10.0 {
                    let value = back.get(x, y).unwrap();
                    let expected = 10.0 + x as f32 + 2.0 * y as f32;
                    assert!(
                        (value - expected).abs() < 0.5,
                        "pixel ({}, {}): {} != {}",
                        x,
                        y,
                        value,
                        expected
                    );
                }
            }
        }
    }

    #[test]
    fn test_uncovered_pixels_stay_background() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let out = RasterBinding::new(&mesh, &source)
            .unwrap()
            .warp(&mesh)
            .unwrap();

        // The raster corner lies outside every face
        assert_eq!(out.get(0, 0), Some(Raster::BACKGROUND));
    }

    #[test]
    fn test_progress_reports_every_face() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let binding = RasterBinding::new(&mesh, &source).unwrap();

        let calls = std::sync::Arc::new(AtomicUsize::new(0));
        let calls_clone = std::sync::Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        binding
            .warp_with_progress(&mesh, &WarpOptions::default().sequential(), &progress)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), mesh.num_faces());
    }

    #[test]
    fn test_bind_is_equivalent_to_new() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let binding = RasterBinding::bind(&mesh, &source).unwrap();
        assert!(binding.warp(&mesh).is_ok());

        let small = Raster::new(32, 32);
        assert!(matches!(
            RasterBinding::bind(&mesh, &small),
            Err(WarpError::RasterTooSmall { .. })
        ));
    }

    #[test]
    fn test_raised_cancel_flag_stops_warp() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let binding = RasterBinding::new(&mesh, &source).unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        let options = WarpOptions::default()
            .sequential()
            .with_cancel_flag(Arc::clone(&flag));
        match binding.warp_with_options(&mesh, &options) {
            Err(WarpError::Cancelled { completed: 0, total }) => {
                assert_eq!(total, mesh.num_faces());
            }
            other => panic!("expected Cancelled, got {:?}", other),
        }

        // Lowering the flag lets the same options complete normally
        flag.store(false, Ordering::SeqCst);
        assert!(binding.warp_with_options(&mesh, &options).is_ok());

        // The parallel path honours the flag as well
        flag.store(true, Ordering::SeqCst);
        let parallel = WarpOptions::default().with_cancel_flag(Arc::clone(&flag));
        assert!(matches!(
            binding.warp_with_options(&mesh, &parallel),
            Err(WarpError::Cancelled { .. })
        ));
    }

    #[test]
    fn test_cancel_raised_mid_warp() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let binding = RasterBinding::new(&mesh, &source).unwrap();

        // A progress callback that cancels after the first face completes
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);
        let progress = Progress::new(move |done, _, _| {
            if done >= 1 {
                flag_clone.store(true, Ordering::SeqCst);
            }
        });
        let options = WarpOptions::default().sequential().with_cancel_flag(flag);
        match binding.warp_with_progress(&mesh, &options, &progress) {
            Err(WarpError::Cancelled { completed, total }) => {
                assert_eq!(completed, 1);
                assert_eq!(total, mesh.num_faces());
            }
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn test_signal_proportion_localizes_signal() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();

        // All signal in a single pixel: its owning face holds everything
        let mut source = Raster::new(64, 64);
        source.set(30, 38, 5.0);
        let binding = RasterBinding::new(&mesh, &source).unwrap();

        let owner = mesh.face_containing(Point2::new(30.0, 38.0)).unwrap();
        assert!((binding.signal_proportion(owner) - 1.0).abs() < 1e-9);

        let other = mesh.face_ids().find(|&f| f != owner).unwrap();
        assert_eq!(binding.signal_proportion(other), 0.0);
    }

    #[test]
    fn test_signal_proportions_sum_to_one() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let mut source = Raster::new(64, 64);
        source.data_mut().fill(1.0);
        let binding = RasterBinding::new(&mesh, &source).unwrap();

        // Each covered pixel is attributed to exactly one face
        let sum: f64 = mesh
            .face_ids()
            .map(|f| binding.signal_proportion(f))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9, "proportions sum to {}", sum);

        for f in mesh.face_ids() {
            let p = binding.signal_proportion(f);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_convenience_warp() {
        let mesh = Mesh::build(&circle(30.0, 30.0, 20.0, 200), &two_landmarks(), MeshDensity::new(2))
            .unwrap();
        let source = gradient_raster(64, 64);
        let out = warp(&mesh, &source, &mesh).unwrap();
        assert!(out.get(30, 30).unwrap() > 0.0);
    }
}
