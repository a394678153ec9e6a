//! Deformation ratio colour mapping.
//!
//! Maps per-edge or per-face log2 deformation ratios onto a diverging
//! blue/black/red scale for overlay rendering. Contraction (negative ratio)
//! ramps towards blue, expansion (positive ratio) towards red, and an
//! undeformed region stays black.
//!
//! This is a pure function with no state; the rendering layer that consumes
//! it is an external collaborator.

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Colour {
    /// Create a colour from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The neutral colour for an undeformed region.
    pub const NEUTRAL: Colour = Colour::new(0, 0, 0);

    /// Full-intensity expansion colour.
    pub const EXPANSION: Colour = Colour::new(255, 0, 0);

    /// Full-intensity contraction colour.
    pub const CONTRACTION: Colour = Colour::new(0, 0, 255);
}

/// Map a log2 deformation ratio onto the diverging colour scale.
///
/// `ratio <= -max_ratio` saturates at [`Colour::CONTRACTION`],
/// `ratio >= max_ratio` at [`Colour::EXPANSION`], and `ratio == 0.0` is
/// [`Colour::NEUTRAL`]. In between, the blue or red channel scales linearly
/// with `|ratio| / max_ratio`.
///
/// A non-positive or non-finite `max_ratio` degenerates to pure saturation
/// by sign, so malformed scale limits never panic.
///
/// # Example
/// ```
/// use nucleomesh::colour::{gradient_colour, Colour};
///
/// assert_eq!(gradient_colour(0.0, 1.0), Colour::NEUTRAL);
/// assert_eq!(gradient_colour(2.0, 1.0), Colour::EXPANSION);
/// assert_eq!(gradient_colour(-2.0, 1.0), Colour::CONTRACTION);
/// ```
pub fn gradient_colour(ratio: f64, max_ratio: f64) -> Colour {
    if !ratio.is_finite() {
        return Colour::NEUTRAL;
    }
    if !max_ratio.is_finite() || max_ratio <= 0.0 {
        return if ratio > 0.0 {
            Colour::EXPANSION
        } else if ratio < 0.0 {
            Colour::CONTRACTION
        } else {
            Colour::NEUTRAL
        };
    }

    let t = (ratio / max_ratio).clamp(-1.0, 1.0);
    if t >= 0.0 {
        Colour::new((255.0 * t).round() as u8, 0, 0)
    } else {
        Colour::new(0, 0, (255.0 * -t).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collapse a diverging colour to a signed scalar for ordering checks.
    fn score(c: Colour) -> i32 {
        i32::from(c.r) - i32::from(c.b)
    }

    #[test]
    fn test_neutral_is_fixed_for_all_scales() {
        for m in [0.1, 1.0, 2.0, 100.0] {
            assert_eq!(gradient_colour(0.0, m), Colour::NEUTRAL);
        }
    }

    #[test]
    fn test_saturation_outside_range() {
        assert_eq!(gradient_colour(2.0, 2.0), Colour::EXPANSION);
        assert_eq!(gradient_colour(5.0, 2.0), Colour::EXPANSION);
        assert_eq!(gradient_colour(-2.0, 2.0), Colour::CONTRACTION);
        assert_eq!(gradient_colour(-5.0, 2.0), Colour::CONTRACTION);
    }

    #[test]
    fn test_monotonic_over_range() {
        let m = 2.0;
        let mut prev = score(gradient_colour(-m, m));
        let steps = 200;
        for i in 1..=steps {
            let ratio = -m + 2.0 * m * i as f64 / steps as f64;
            let s = score(gradient_colour(ratio, m));
            assert!(
                s >= prev,
                "scale not monotonic at ratio {}: {} < {}",
                ratio,
                s,
                prev
            );
            prev = s;
        }
    }

    #[test]
    fn test_midpoint_intensity() {
        let c = gradient_colour(1.0, 2.0);
        assert_eq!(c.g, 0);
        assert_eq!(c.b, 0);
        assert!((i32::from(c.r) - 128).abs() <= 1);
    }

    #[test]
    fn test_degenerate_max_ratio() {
        assert_eq!(gradient_colour(0.5, 0.0), Colour::EXPANSION);
        assert_eq!(gradient_colour(-0.5, 0.0), Colour::CONTRACTION);
        assert_eq!(gradient_colour(0.0, 0.0), Colour::NEUTRAL);
        assert_eq!(gradient_colour(0.5, f64::NAN), Colour::EXPANSION);
    }
}
