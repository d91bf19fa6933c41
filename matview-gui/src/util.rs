//! Numeric conversion utilities for matview-gui.
//!
//! egui works in `f32` points; the view works in integer pixels.

use std::path::Path;

/// Convert f32 to i32, flooring and saturating.
#[allow(clippy::cast_possible_truncation)]
pub fn f32_to_i32(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.floor() as i32
}

/// Convert f32 to u32, flooring and clamping negatives to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn f32_to_u32(value: f32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.max(0.0).floor() as u32
}

/// Convert i32 to f32 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn i32_to_f32(value: i32) -> f32 {
    value as f32
}

/// Convert usize to f32 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

/// File name of `path` for labels, or the whole path if it has none.
pub fn file_label(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
