//! Coordinate transforms between data, tile and screen space.
//!
//! Four coordinate systems are involved in drawing a matrix:
//!
//! - **data space**: continuous matrix coordinates (e.g. energies), Y grows upward
//! - **tile space**: integer pixel coordinates at the current zoom, Y grows upward;
//!   the content of a tile-space pixel depends only on zoom and data offset
//! - **screen space**: integer window pixels, Y grows downward; related to tile
//!   space by a pure integer translation, so panning never changes tile content
//! - **colour space**: see [`crate::color`]

use crate::util::{f64_to_i64_saturating, i64_to_i32_saturating};

/// Edge length of a rendered tile in pixels.
pub const TILE_SIZE: i32 = 128;

/// Round to the nearest integer, breaking ties toward negative infinity.
///
/// Computed as `ceil(value - 0.5)`. Every data-to-pixel conversion uses this
/// rule so that half-integer boundaries round-trip consistently.
#[must_use]
#[inline]
pub fn nearest(value: f64) -> i64 {
    f64_to_i64_saturating((value - 0.5).ceil())
}

/// Index of the tile containing tile-space position `pos`.
///
/// This is `floor(pos / TILE_SIZE)`, including for negative positions
/// (`tile_id(-1) == -1`, `tile_id(-128) == -1`, `tile_id(-129) == -2`).
#[must_use]
#[inline]
pub fn tile_id(pos: i32) -> i32 {
    pos.div_euclid(TILE_SIZE)
}

/// Zoom and offset parameters relating the coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    /// Horizontal zoom in pixels per data unit.
    pub zoom_x: f64,
    /// Vertical zoom in pixels per data unit.
    pub zoom_y: f64,
    /// Data-space X offset: tile-space x = 0 corresponds to data x = `-x_offset`.
    pub x_offset: f64,
    /// Data-space Y offset: tile-space y = 0 corresponds to data y = `y_offset`.
    pub y_offset: f64,
    /// Screen x of tile-space x = 0.
    pub x_tile_offset: i32,
    /// Screen y of tile-space y = 0.
    pub y_tile_offset: i32,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self {
            zoom_x: 1.0,
            zoom_y: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
            x_tile_offset: 0,
            y_tile_offset: 0,
        }
    }
}

impl CoordinateTransform {
    /// Data-space x of tile-space position `tx` (fractional positions allowed).
    #[must_use]
    #[inline]
    pub fn x_tile_to_data(&self, tx: f64) -> f64 {
        tx / self.zoom_x - self.x_offset
    }

    /// Data-space y of tile-space position `ty` (fractional positions allowed).
    #[must_use]
    #[inline]
    pub fn y_tile_to_data(&self, ty: f64) -> f64 {
        ty / self.zoom_y + self.y_offset
    }

    /// Tile-space pixel nearest to data-space x.
    #[must_use]
    #[inline]
    pub fn data_to_x_tile(&self, x: f64) -> i32 {
        i64_to_i32_saturating(nearest((x + self.x_offset) * self.zoom_x))
    }

    /// Tile-space pixel nearest to data-space y.
    #[must_use]
    #[inline]
    pub fn data_to_y_tile(&self, y: f64) -> i32 {
        i64_to_i32_saturating(nearest((y - self.y_offset) * self.zoom_y))
    }

    /// Tile-space x of screen column `xs`.
    #[must_use]
    #[inline]
    pub fn x_screen_to_tile(&self, xs: i32) -> i32 {
        xs.saturating_sub(self.x_tile_offset)
    }

    /// Tile-space y of screen row `ys` (screen Y grows downward).
    #[must_use]
    #[inline]
    pub fn y_screen_to_tile(&self, ys: i32) -> i32 {
        self.y_tile_offset.saturating_sub(ys)
    }

    /// Screen column of tile-space x.
    #[must_use]
    #[inline]
    pub fn x_tile_to_screen(&self, tx: i32) -> i32 {
        tx.saturating_add(self.x_tile_offset)
    }

    /// Screen row of tile-space y.
    #[must_use]
    #[inline]
    pub fn y_tile_to_screen(&self, ty: i32) -> i32 {
        self.y_tile_offset.saturating_sub(ty)
    }

    /// Data-space point under screen pixel `(xs, ys)`.
    #[must_use]
    pub fn screen_to_data(&self, xs: i32, ys: i32) -> (f64, f64) {
        (
            self.x_tile_to_data(f64::from(self.x_screen_to_tile(xs))),
            self.y_tile_to_data(f64::from(self.y_screen_to_tile(ys))),
        )
    }

    /// Screen pixel nearest to the data-space point `(x, y)`.
    #[must_use]
    pub fn data_to_screen(&self, x: f64, y: f64) -> (i32, i32) {
        (
            self.x_tile_to_screen(self.data_to_x_tile(x)),
            self.y_tile_to_screen(self.data_to_y_tile(y)),
        )
    }

    /// Shift the screen/tile translation by a screen-space delta.
    ///
    /// Tile content is unaffected; only the mapping to the screen moves.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x_tile_offset = self.x_tile_offset.saturating_add(dx);
        self.y_tile_offset = self.y_tile_offset.saturating_add(dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn transform(zoom: f64, offset: f64) -> CoordinateTransform {
        CoordinateTransform {
            zoom_x: zoom,
            zoom_y: zoom,
            x_offset: offset,
            y_offset: -offset,
            x_tile_offset: 10,
            y_tile_offset: 500,
        }
    }

    #[test]
    fn test_tile_id_floor_for_negative_positions() {
        assert_eq!(tile_id(0), 0);
        assert_eq!(tile_id(127), 0);
        assert_eq!(tile_id(128), 1);
        assert_eq!(tile_id(-1), -1);
        assert_eq!(tile_id(-128), -1);
        assert_eq!(tile_id(-129), -2);
    }

    #[test]
    fn test_tile_id_matches_floor_division() {
        for pos in -1000..1000 {
            let expected = (f64::from(pos) / f64::from(TILE_SIZE)).floor();
            assert_eq!(f64::from(tile_id(pos)), expected, "pos {pos}");
        }
    }

    #[test]
    fn test_nearest_breaks_ties_downward() {
        assert_eq!(nearest(0.5), 0);
        assert_eq!(nearest(0.51), 1);
        assert_eq!(nearest(1.5), 1);
        assert_eq!(nearest(-0.5), -1);
        assert_eq!(nearest(-0.49), 0);
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        for &zoom in &[0.25, 1.0, 2.0, 3.7] {
            let t = transform(zoom, 0.5);
            for i in -200..200 {
                let x = f64::from(i) * 0.37;
                let back = t.x_tile_to_data(f64::from(t.data_to_x_tile(x)));
                assert!((back - x).abs() * zoom <= 0.5 + 1e-9, "x {x} zoom {zoom}");
                let back = t.y_tile_to_data(f64::from(t.data_to_y_tile(x)));
                assert!((back - x).abs() * zoom <= 0.5 + 1e-9, "y {x} zoom {zoom}");
            }
        }
    }

    #[test]
    fn test_half_integer_boundary() {
        let t = transform(1.0, 0.0);
        // (0.5 + 0) * 1 rounds down at the tie.
        assert_eq!(t.data_to_x_tile(0.5), 0);
        assert_eq!(t.data_to_x_tile(1.5), 1);
        assert_abs_diff_eq!(t.x_tile_to_data(f64::from(t.data_to_x_tile(1.5))), 1.0);
    }

    #[test]
    fn test_screen_y_is_inverted() {
        let t = transform(1.0, 0.0);
        assert_eq!(t.y_screen_to_tile(500), 0);
        assert_eq!(t.y_screen_to_tile(499), 1);
        assert_eq!(t.y_tile_to_screen(t.y_screen_to_tile(123)), 123);
        let (_, y_top) = t.screen_to_data(0, 100);
        let (_, y_bottom) = t.screen_to_data(0, 400);
        assert!(y_top > y_bottom);
    }

    #[test]
    fn test_shift_moves_screen_mapping_only() {
        let mut t = transform(2.0, 0.5);
        let before = t.data_to_x_tile(42.0);
        let (sx, sy) = t.data_to_screen(42.0, 17.0);
        t.shift(7, -3);
        assert_eq!(t.data_to_x_tile(42.0), before);
        assert_eq!(t.data_to_screen(42.0, 17.0), (sx + 7, sy - 3));
    }
}
