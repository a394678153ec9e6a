//! Owned 2D raster of signal intensities.
//!
//! A [`Raster`] is a dense row-major grid of `f32` pixel values, the form in
//! which nuclear signal images arrive from the (external) image pipeline and
//! in which warped images are returned to the renderer. Uncovered pixels
//! hold [`Raster::BACKGROUND`].

use crate::error::WarpError;

/// A dense row-major grid of `f32` pixel values.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Raster {
    /// The value of pixels not covered by any mesh face.
    pub const BACKGROUND: f32 = 0.0;

    /// Create a raster filled with the background value.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![Self::BACKGROUND; width * height],
        }
    }

    /// Create a raster from an existing row-major buffer.
    ///
    /// Fails with [`WarpError::SizeMismatch`] if the buffer length is not
    /// `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self, WarpError> {
        let expected = width * height;
        if data.len() != expected {
            return Err(WarpError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The underlying row-major pixel buffer.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the underlying pixel buffer.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Fetch a pixel, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Write a pixel. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Sample the raster at a continuous coordinate with bilinear
    /// interpolation, clamping at the borders.
    ///
    /// Sampling an integer coordinate returns the pixel value exactly.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> f32 {
        if self.width == 0 || self.height == 0 {
            return Self::BACKGROUND;
        }

        let x0 = x.floor();
        let y0 = y.floor();
        let dx = (x - x0) as f32;
        let dy = (y - y0) as f32;

        let xi = x0 as isize;
        let yi = y0 as isize;

        let p00 = self.at_clamped(xi, yi);
        let p10 = self.at_clamped(xi + 1, yi);
        let p01 = self.at_clamped(xi, yi + 1);
        let p11 = self.at_clamped(xi + 1, yi + 1);

        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;
        top * (1.0 - dy) + bottom * dy
    }

    #[inline]
    fn at_clamped(&self, x: isize, y: isize) -> f32 {
        let xc = x.clamp(0, self.width as isize - 1) as usize;
        let yc = y.clamp(0, self.height as isize - 1) as usize;
        self.data[yc * self.width + xc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Raster::from_vec(2, 2, vec![0.0; 4]).is_ok());

        let err = Raster::from_vec(2, 2, vec![0.0; 3]).unwrap_err();
        match err {
            WarpError::SizeMismatch { expected, actual } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_get_set() {
        let mut r = Raster::new(3, 2);
        r.set(2, 1, 7.5);
        assert_eq!(r.get(2, 1), Some(7.5));
        assert_eq!(r.get(0, 0), Some(Raster::BACKGROUND));
        assert_eq!(r.get(3, 0), None);
        assert_eq!(r.get(0, 2), None);
    }

    #[test]
    fn test_bilinear_exact_at_integers() {
        let r = Raster::from_vec(2, 2, vec![0.0, 10.0, 20.0, 30.0]).unwrap();
        assert_eq!(r.sample_bilinear(0.0, 0.0), 0.0);
        assert_eq!(r.sample_bilinear(1.0, 0.0), 10.0);
        assert_eq!(r.sample_bilinear(0.0, 1.0), 20.0);
        assert_eq!(r.sample_bilinear(1.0, 1.0), 30.0);
    }

    #[test]
    fn test_bilinear_centre_and_clamp() {
        let r = Raster::from_vec(2, 2, vec![0.0, 10.0, 20.0, 30.0]).unwrap();

        let centre = r.sample_bilinear(0.5, 0.5);
        assert!((centre - 15.0).abs() < 1e-6);

        // Outside samples clamp to the nearest border pixel
        let clamped = r.sample_bilinear(-1.0, -1.0);
        assert!((clamped - 0.0).abs() < 1e-6);
        let clamped = r.sample_bilinear(5.0, 5.0);
        assert!((clamped - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_raster_samples_background() {
        let r = Raster::new(0, 0);
        assert_eq!(r.sample_bilinear(0.5, 0.5), Raster::BACKGROUND);
    }
}
