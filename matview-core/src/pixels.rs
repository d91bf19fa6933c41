//! Owned RGBA pixel buffers and line rasterisation.

use crate::util::f64_to_i64_saturating;

/// RGBA color as `[r, g, b, a]` bytes.
pub type Rgba = [u8; 4];

/// Axis-aligned pixel rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Exclusive bottom edge.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// An owned RGBA pixel buffer, row 0 at the top.
///
/// This is the pixel resource behind every cached tile; dropping the buffer
/// releases it.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Allocate a buffer filled with `color`.
    #[must_use]
    pub fn new(width: usize, height: usize, color: Rgba) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes, row-major.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + 4]);
        Some(px)
    }

    /// Set pixel `(x, y)`; coordinates outside the buffer are ignored.
    pub fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + 4].copy_from_slice(&color);
        }
    }

    /// Fill the whole buffer with one colour.
    pub fn fill(&mut self, color: Rgba) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Count pixels equal to `color`.
    #[must_use]
    pub fn count(&self, color: Rgba) -> usize {
        self.data
            .chunks_exact(4)
            .filter(|px| *px == color.as_slice())
            .count()
    }

    /// Draw a one-pixel line between two points given in buffer coordinates.
    ///
    /// The segment is clipped to the buffer first, so endpoints may lie far
    /// outside it without rasterising the invisible part.
    pub fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba) {
        #[allow(clippy::cast_precision_loss)]
        let (max_x, max_y) = (self.width as f64 - 0.5, self.height as f64 - 0.5);
        let Some((a, b)) = clip_segment(from, to, (-0.5, -0.5), (max_x, max_y)) else {
            return;
        };
        let (mut x0, mut y0) = (round_px(a.0), round_px(a.1));
        let (x1, y1) = (round_px(b.0), round_px(b.1));

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) * 4)
    }
}

fn round_px(v: f64) -> i64 {
    f64_to_i64_saturating(v.round())
}

/// Liang-Barsky clipping of segment `a`-`b` against the box `min`..`max`.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    min: (f64, f64),
    max: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
        return None;
    }
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let checks = [
        (-dx, a.0 - min.0),
        (dx, max.0 - a.0),
        (-dy, a.1 - min.1),
        (dy, max.1 - a.1),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba = [0, 0, 0, 255];
    const WHITE: Rgba = [255, 255, 255, 255];

    #[test]
    fn test_put_and_get() {
        let mut buf = PixelBuffer::new(4, 3, BLACK);
        buf.put(3, 2, WHITE);
        buf.put(4, 0, WHITE);
        buf.put(-1, 0, WHITE);
        assert_eq!(buf.get(3, 2), Some(WHITE));
        assert_eq!(buf.get(4, 0), None);
        assert_eq!(buf.count(WHITE), 1);
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_horizontal_and_diagonal_lines() {
        let mut buf = PixelBuffer::new(10, 10, BLACK);
        buf.draw_line((1.0, 1.0), (8.0, 1.0), WHITE);
        assert_eq!(buf.count(WHITE), 8);

        buf.fill(BLACK);
        buf.draw_line((0.0, 0.0), (9.0, 9.0), WHITE);
        assert_eq!(buf.count(WHITE), 10);
        for i in 0..10 {
            assert_eq!(buf.get(i, i), Some(WHITE));
        }
    }

    #[test]
    fn test_line_is_clipped_to_buffer() {
        let mut buf = PixelBuffer::new(10, 10, BLACK);
        buf.draw_line((-1.0e9, 5.0), (1.0e9, 5.0), WHITE);
        assert_eq!(buf.count(WHITE), 10);

        buf.fill(BLACK);
        buf.draw_line((-50.0, -3.0), (-20.0, 40.0), WHITE);
        assert_eq!(buf.count(WHITE), 0);
    }

    #[test]
    fn test_degenerate_line_draws_single_pixel() {
        let mut buf = PixelBuffer::new(5, 5, BLACK);
        buf.draw_line((2.0, 2.0), (2.0, 2.0), WHITE);
        assert_eq!(buf.count(WHITE), 1);
        buf.draw_line((f64::NAN, 2.0), (2.0, 3.0), WHITE);
        assert_eq!(buf.count(WHITE), 1);
    }

    #[test]
    fn test_rect_contains() {
        let rect = PixelRect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
        assert!(PixelRect::new(0, 0, 0, 4).is_empty());
    }
}
