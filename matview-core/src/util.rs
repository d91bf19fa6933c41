//! Numeric conversion utilities for matview-core.
//!
//! These functions handle conversions between numeric types with explicit
//! handling of precision loss and saturation.

/// Convert i64 to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn i64_to_f64(value: i64) -> f64 {
    value as f64
}

/// Convert usize to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Convert f64 to i64, saturating at the integer bounds.
///
/// NaN maps to zero.
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_i64_saturating(value: f64) -> i64 {
    // `as` saturates for floats and maps NaN to 0.
    value as i64
}

/// Convert i64 to i32, saturating at the i32 bounds.
#[allow(clippy::cast_possible_truncation)]
pub fn i64_to_i32_saturating(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Convert f64 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn f64_to_u8(value: f64) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

/// Convert i64 to usize if it is a valid index below `max_exclusive`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn i64_to_index(value: i64, max_exclusive: usize) -> Option<usize> {
    if value < 0 {
        return None;
    }
    let index = value as u64;
    if index >= max_exclusive as u64 {
        return None;
    }
    Some(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_conversions() {
        assert_eq!(f64_to_i64_saturating(f64::NAN), 0);
        assert_eq!(f64_to_i64_saturating(1e300), i64::MAX);
        assert_eq!(i64_to_i32_saturating(i64::MIN), i32::MIN);
        assert_eq!(i64_to_i32_saturating(-5), -5);
    }

    #[test]
    fn test_f64_to_u8_clamps() {
        assert_eq!(f64_to_u8(-3.0), 0);
        assert_eq!(f64_to_u8(300.0), 255);
        assert_eq!(f64_to_u8(127.6), 128);
    }

    #[test]
    fn test_i64_to_index_bounds() {
        assert_eq!(i64_to_index(-1, 10), None);
        assert_eq!(i64_to_index(10, 10), None);
        assert_eq!(i64_to_index(9, 10), Some(9));
    }
}
