//! View configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Colormap;
use crate::error::{Error, Result};

/// Insets between the window edge and the matrix viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Borders {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Borders {
    /// Same inset on every side.
    #[must_use]
    pub fn uniform(inset: u32) -> Self {
        Self {
            left: inset,
            right: inset,
            top: inset,
            bottom: inset,
        }
    }
}

impl Default for Borders {
    fn default() -> Self {
        Self::uniform(2)
    }
}

/// Configuration for a [`View2D`](crate::View2D).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewConfig {
    /// Viewport insets.
    pub borders: Borders,
    /// Tiles kept around the visible region when weeding the cache.
    pub tile_margin: i32,
    /// Zoom factor applied by the zoom-in key (zoom-out uses the inverse).
    pub zoom_step: f64,
    /// Fraction of the viewport moved by the arrow keys.
    pub pan_fraction: f64,
    /// Factor applied to the intensity window by the `+`/`-` keys.
    pub z_window_step: f64,
    /// Initial colormap.
    pub colormap: Colormap,
    /// Start in log-scale mode.
    pub log_scale: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            borders: Borders::default(),
            tile_margin: 1,
            zoom_step: 2.0,
            pan_fraction: 0.25,
            z_window_step: 2.0,
            colormap: Colormap::default(),
            log_scale: false,
        }
    }
}

impl ViewConfig {
    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.tile_margin < 0 {
            return Err(Error::ConfigError(format!(
                "tile_margin must be non-negative, got {}",
                self.tile_margin
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(Error::ConfigError(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if !(self.pan_fraction.is_finite() && self.pan_fraction > 0.0) {
            return Err(Error::ConfigError(format!(
                "pan_fraction must be positive, got {}",
                self.pan_fraction
            )));
        }
        if !(self.z_window_step.is_finite() && self.z_window_step > 1.0) {
            return Err(Error::ConfigError(format!(
                "z_window_step must be greater than 1, got {}",
                self.z_window_step
            )));
        }
        Ok(())
    }
}
