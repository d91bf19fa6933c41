//! Intensity to colour mapping.
//!
//! Intensities are first mapped to an integer colour index in
//! `[0, COLOR_RANGE]` by [`ColorScale`], then to RGBA by a [`Colormap`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pixels::Rgba;
use crate::transform::nearest;
use crate::util::{f64_to_u8, i64_to_f64};

/// Number of distinct colour indices: five bands of 256 levels.
pub const COLOR_RANGE: i32 = 5 * 256;

/// Smallest visible intensity region used as a divisor.
pub const MIN_VISIBLE_REGION: f64 = 1e-9;

/// Logarithmic intensity transform used in log-scale mode.
///
/// Returns `ln(z) + 1` for counts above one half and `0` otherwise, so a
/// single count maps to 1 and empty or negative bins never produce a
/// domain error.
#[must_use]
pub fn log_counts(z: f64) -> f64 {
    if z > 0.5 {
        z.ln() + 1.0
    } else {
        0.0
    }
}

/// Intensity window and scaling mode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorScale {
    /// Intensity (after log transform, if enabled) mapped to colour index 0.
    pub z_offset: f64,
    /// Width of the intensity window mapped onto `COLOR_RANGE`.
    pub z_visible_region: f64,
    /// Whether intensities pass through [`log_counts`] first.
    pub log_scale: bool,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            z_offset: 0.0,
            z_visible_region: 1.0,
            log_scale: false,
        }
    }
}

impl ColorScale {
    /// Window covering `[0, max]`, in log space when `log_scale` is set.
    #[must_use]
    pub fn full_range(max: f64, log_scale: bool) -> Self {
        let top = if log_scale { log_counts(max) } else { max };
        Self {
            z_offset: 0.0,
            z_visible_region: top.max(MIN_VISIBLE_REGION),
            log_scale,
        }
    }

    /// Apply the log transform if enabled.
    #[must_use]
    #[inline]
    pub fn transform(&self, z: f64) -> f64 {
        if self.log_scale {
            log_counts(z)
        } else {
            z
        }
    }

    /// Colour index of intensity `z`, rounded to nearest.
    ///
    /// The result is not clamped; values outside `[0, COLOR_RANGE]` are
    /// clamped by [`Colormap::apply_index`].
    #[must_use]
    pub fn color_index(&self, z: f64) -> i64 {
        let region = if self.z_visible_region.is_finite() {
            self.z_visible_region.max(MIN_VISIBLE_REGION)
        } else {
            MIN_VISIBLE_REGION
        };
        let z = self.transform(z);
        nearest((z - self.z_offset) / region * f64::from(COLOR_RANGE))
    }
}

/// Available colormaps for matrix visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Colormap {
    /// Five-band spectrum - black, blue, cyan, green, yellow, red.
    #[default]
    Spectrum,
    /// Green (Matrix style) - black to bright green.
    Green,
    /// Hot (Thermal) - red to yellow to white.
    Hot,
    /// Grayscale - black to white.
    Grayscale,
    /// Viridis (approximate) - blue to teal to green to yellow.
    Viridis,
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Spectrum => write!(f, "Spectrum"),
            Colormap::Green => write!(f, "Green (Matrix)"),
            Colormap::Hot => write!(f, "Hot (Thermal)"),
            Colormap::Grayscale => write!(f, "Grayscale"),
            Colormap::Viridis => write!(f, "Viridis"),
        }
    }
}

impl Colormap {
    /// All colormaps, in menu order.
    pub const ALL: [Colormap; 5] = [
        Colormap::Spectrum,
        Colormap::Green,
        Colormap::Hot,
        Colormap::Grayscale,
        Colormap::Viridis,
    ];

    /// Colour for an index from [`ColorScale::color_index`].
    #[must_use]
    pub fn apply_index(self, index: i64) -> Rgba {
        let index = index.clamp(0, i64::from(COLOR_RANGE));
        match self {
            Colormap::Spectrum => spectrum_band(index),
            _ => self.apply(i64_to_f64(index) / f64::from(COLOR_RANGE)),
        }
    }

    /// Apply the colormap to a normalized value [0, 1] and return RGBA bytes.
    #[must_use]
    pub fn apply(self, val: f64) -> Rgba {
        let val = if val.is_nan() { 0.0 } else { val.clamp(0.0, 1.0) };
        match self {
            Colormap::Spectrum => spectrum_band(nearest(val * f64::from(COLOR_RANGE))),
            Colormap::Green => {
                let v = f64_to_u8(val * 255.0);
                [0, v, 0, 255]
            }
            Colormap::Grayscale => {
                let v = f64_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Hot => {
                if val < 0.5 {
                    let g = f64_to_u8(val * 2.0 * 255.0);
                    [255, g, 0, 255]
                } else {
                    let b = f64_to_u8((val - 0.5) * 2.0 * 255.0);
                    [255, 255, b, 255]
                }
            }
            Colormap::Viridis => {
                let r = f64_to_u8(255.0 * val.powi(2));
                let g = f64_to_u8(255.0 * val);
                let b = f64_to_u8(255.0 * (1.0 - val));
                [r, g, b, 255]
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn spectrum_band(index: i64) -> Rgba {
    let index = index.clamp(0, i64::from(COLOR_RANGE) - 1);
    let level = (index % 256) as u8;
    match index / 256 {
        0 => [0, 0, level, 255],
        1 => [0, level, 255, 255],
        2 => [0, 255, 255 - level, 255],
        3 => [level, 255, 0, 255],
        _ => [255, 255 - level, 0, 255],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_color_index_linear() {
        let scale = ColorScale::full_range(510.0, false);
        assert_eq!(scale.color_index(0.0), 0);
        assert_eq!(scale.color_index(510.0), i64::from(COLOR_RANGE));
        assert_eq!(scale.color_index(255.0), 640);
    }

    #[test]
    fn test_color_index_monotonic() {
        let scale = ColorScale {
            z_offset: 3.0,
            z_visible_region: 97.0,
            log_scale: false,
        };
        let mut last = i64::MIN;
        for i in 0..2000 {
            let z = f64::from(i) * 0.071;
            let idx = scale.color_index(z);
            assert!(idx >= last, "z {z}");
            last = idx;
        }
    }

    #[test]
    fn test_collapsed_window_does_not_divide_by_zero() {
        let scale = ColorScale {
            z_offset: 5.0,
            z_visible_region: 0.0,
            log_scale: false,
        };
        assert!(scale.color_index(6.0) > i64::from(COLOR_RANGE));
        assert_eq!(scale.color_index(5.0), 0);
        let negative = ColorScale {
            z_visible_region: -4.0,
            ..scale
        };
        assert_eq!(negative.color_index(5.0), 0);
    }

    #[test]
    fn test_log_counts_floor() {
        assert_abs_diff_eq!(log_counts(0.0), 0.0);
        assert_abs_diff_eq!(log_counts(-12.0), 0.0);
        assert_abs_diff_eq!(log_counts(1.0), 1.0);
        assert_abs_diff_eq!(log_counts(std::f64::consts::E), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_log_scale_index() {
        let scale = ColorScale::full_range(1000.0, true);
        assert_eq!(scale.color_index(0.0), 0);
        assert_eq!(scale.color_index(1000.0), i64::from(COLOR_RANGE));
        assert!(scale.color_index(10.0) > scale.color_index(1.0));
    }

    #[test]
    fn test_spectrum_bands() {
        let map = Colormap::Spectrum;
        assert_eq!(map.apply_index(-10), [0, 0, 0, 255]);
        assert_eq!(map.apply_index(255), [0, 0, 255, 255]);
        assert_eq!(map.apply_index(256), [0, 0, 255, 255]);
        assert_eq!(map.apply_index(768), [0, 255, 0, 255]);
        assert_eq!(map.apply_index(5000), [255, 0, 0, 255]);
    }

    #[test]
    fn test_apply_clamps_and_is_opaque() {
        for map in Colormap::ALL {
            assert_eq!(map.apply(-1.0)[3], 255);
            assert_eq!(map.apply(2.0), map.apply(1.0));
            assert_eq!(map.apply(f64::NAN), map.apply(0.0));
        }
    }
}
