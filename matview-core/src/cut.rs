//! Polygonal cuts and their overlay onto rendered tiles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pixels::{PixelBuffer, Rgba};
use crate::tile::TileKey;
use crate::transform::CoordinateTransform;

/// A named polygon in data space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cut {
    pub name: String,
    /// Polygon vertices as `(x, y)` data coordinates.
    pub points: Vec<(f64, f64)>,
    /// Swap X and Y of every vertex before drawing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert_axes: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_cut_color"))]
    pub color: Rgba,
}

#[cfg(feature = "serde")]
fn default_cut_color() -> Rgba {
    cut_palette_color(0)
}

impl Cut {
    /// Create a cut drawn in the first palette colour.
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>, invert_axes: bool) -> Self {
        Self {
            name: name.into(),
            points,
            invert_axes,
            color: cut_palette_color(0),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Vertices in display orientation (axes swapped if `invert_axes`).
    fn display_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(move |&(x, y)| {
            if self.invert_axes { (y, x) } else { (x, y) }
        })
    }

    /// Polygon edges, including the closing edge unless the polygon is already closed.
    fn edges(&self) -> Vec<((f64, f64), (f64, f64))> {
        let points: Vec<(f64, f64)> = self.display_points().collect();
        if points.len() < 2 {
            return Vec::new();
        }
        let mut edges: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).collect();
        let (first, last) = (points[0], points[points.len() - 1]);
        if points.len() > 2 && first != last {
            edges.push((last, first));
        }
        edges
    }
}

/// Ordered collection of cuts drawn over the matrix.
#[derive(Debug, Default)]
pub struct CutOverlay {
    cuts: Vec<Cut>,
    revision: u64,
}

impl CutOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cut. Polygons are not validated.
    pub fn add_cut(&mut self, cut: Cut) {
        self.cuts.push(cut);
        self.revision += 1;
    }

    /// Append a polygon with a generated name and the next palette colour.
    pub fn add_polygon(&mut self, points: Vec<(f64, f64)>, invert_axes: bool) {
        let index = self.cuts.len();
        let cut = Cut::new(format!("cut {}", index + 1), points, invert_axes)
            .with_color(cut_palette_color(index));
        self.add_cut(cut);
    }

    /// Remove the cut at `index`.
    pub fn remove_cut(&mut self, index: usize) -> Option<Cut> {
        if index >= self.cuts.len() {
            return None;
        }
        self.revision += 1;
        Some(self.cuts.remove(index))
    }

    /// Remove every cut called `name`; returns how many were removed.
    pub fn remove_cut_named(&mut self, name: &str) -> usize {
        let before = self.cuts.len();
        self.cuts.retain(|cut| cut.name != name);
        let removed = before - self.cuts.len();
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    pub fn remove_all_cuts(&mut self) {
        if !self.cuts.is_empty() {
            self.cuts.clear();
            self.revision += 1;
        }
    }

    #[must_use]
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Counter incremented by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Draw every cut onto the buffer of tile `key`, in insertion order.
    pub fn render_cuts(
        &self,
        key: TileKey,
        transform: &CoordinateTransform,
        target: &mut PixelBuffer,
    ) {
        for cut in &self.cuts {
            render_cut(cut, key, transform, target);
        }
    }
}

/// Draw the outline of `cut` onto the buffer of tile `key`.
///
/// Vertices are mapped data → tile space → tile-local pixels; segments are
/// clipped at the buffer edges.
pub fn render_cut(
    cut: &Cut,
    key: TileKey,
    transform: &CoordinateTransform,
    target: &mut PixelBuffer,
) {
    let to_local = |(x, y): (f64, f64)| {
        key.to_local(
            f64::from(transform.data_to_x_tile(x)),
            f64::from(transform.data_to_y_tile(y)),
        )
    };
    for (a, b) in cut.edges() {
        target.draw_line(to_local(a), to_local(b), cut.color);
    }
}

/// Colour for the `index`-th cut.
#[must_use]
pub fn cut_palette_color(index: usize) -> Rgba {
    const PALETTE: [Rgba; 10] = [
        [0xff, 0xff, 0xff, 0xff],
        [0xef, 0x44, 0x44, 0xff],
        [0x4a, 0x9e, 0xff, 0xff],
        [0x10, 0xb9, 0x81, 0xff],
        [0xf5, 0x9e, 0x0b, 0xff],
        [0x8b, 0x5c, 0xff, 0xff],
        [0xf4, 0x72, 0xb6, 0xff],
        [0x22, 0xc5, 0xe5, 0xff],
        [0x84, 0xcc, 0x16, 0xff],
        [0xf9, 0x73, 0x16, 0xff],
    ];
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba = [0, 0, 0, 255];

    fn identity() -> CoordinateTransform {
        CoordinateTransform::default()
    }

    fn blank() -> PixelBuffer {
        PixelBuffer::new(128, 128, BLACK)
    }

    #[test]
    fn test_square_outline() {
        let cut = Cut::new(
            "square",
            vec![(10.0, 10.0), (10.0, 20.0), (20.0, 20.0), (20.0, 10.0)],
            false,
        );
        let mut buf = blank();
        render_cut(&cut, TileKey::new(0, 0), &identity(), &mut buf);
        // 4 edges of 11 pixels sharing 4 corners.
        assert_eq!(buf.count(cut.color), 40);
        // Tile-space (10, 10) is row 127 - 10.
        assert_eq!(buf.get(10, 117), Some(cut.color));
        assert_eq!(buf.get(15, 112), Some(BLACK));
    }

    #[test]
    fn test_cut_outside_tile_draws_nothing() {
        let cut = Cut::new("far", vec![(500.0, 500.0), (600.0, 600.0)], false);
        let mut buf = blank();
        render_cut(&cut, TileKey::new(0, 0), &identity(), &mut buf);
        assert_eq!(buf.count(BLACK), 128 * 128);
    }

    #[test]
    fn test_degenerate_cuts_are_noops() {
        let mut buf = blank();
        let empty = Cut::new("empty", Vec::new(), false);
        let single = Cut::new("single", vec![(5.0, 5.0)], false);
        render_cut(&empty, TileKey::new(0, 0), &identity(), &mut buf);
        render_cut(&single, TileKey::new(0, 0), &identity(), &mut buf);
        assert_eq!(buf.count(BLACK), 128 * 128);
    }

    #[test]
    fn test_invert_axes_swaps_coordinates() {
        let cut = Cut::new("line", vec![(5.0, 40.0), (5.0, 41.0)], true);
        let mut buf = blank();
        render_cut(&cut, TileKey::new(0, 0), &identity(), &mut buf);
        // Drawn at tile-space (40, 5) and (41, 5).
        assert_eq!(buf.get(40, 122), Some(cut.color));
        assert_eq!(buf.get(41, 122), Some(cut.color));
        assert_eq!(buf.count(cut.color), 2);
    }

    #[test]
    fn test_cut_spanning_tiles_uses_local_origin() {
        let cut = Cut::new("span", vec![(120.0, 5.0), (135.0, 5.0)], false);
        let mut left = blank();
        let mut right = blank();
        render_cut(&cut, TileKey::new(0, 0), &identity(), &mut left);
        render_cut(&cut, TileKey::new(1, 0), &identity(), &mut right);
        assert_eq!(left.count(cut.color), 8);
        assert_eq!(right.count(cut.color), 8);
        assert_eq!(right.get(0, 122), Some(cut.color));
    }

    #[test]
    fn test_later_cuts_draw_over_earlier() {
        let mut overlay = CutOverlay::new();
        overlay.add_polygon(vec![(0.0, 0.0), (10.0, 0.0)], false);
        overlay.add_polygon(vec![(5.0, 0.0), (15.0, 0.0)], false);
        let mut buf = blank();
        overlay.render_cuts(TileKey::new(0, 0), &identity(), &mut buf);
        let second = overlay.cuts()[1].color;
        assert_eq!(buf.get(5, 127), Some(second));
        assert_eq!(buf.get(4, 127), Some(overlay.cuts()[0].color));
    }

    #[test]
    fn test_overlay_mutations_bump_revision() {
        let mut overlay = CutOverlay::new();
        overlay.add_polygon(vec![(0.0, 0.0), (1.0, 1.0)], false);
        overlay.add_cut(Cut::new("gate", vec![(2.0, 2.0), (3.0, 3.0)], false));
        assert_eq!(overlay.revision(), 2);
        assert_eq!(overlay.remove_cut_named("gate"), 1);
        assert!(overlay.remove_cut(5).is_none());
        assert_eq!(overlay.revision(), 3);
        overlay.remove_all_cuts();
        assert!(overlay.is_empty());
        assert_eq!(overlay.revision(), 4);
    }
}
