//! Off-screen surface for headless rendering.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;
use matview_core::{PixelRect, Surface, TileFrame, BACKGROUND};

use crate::Result;

/// A [`Surface`] that composites tiles into an in-memory RGBA image.
pub struct SnapshotSurface {
    image: RgbaImage,
    clip: PixelRect,
}

impl SnapshotSurface {
    /// Create a `width` × `height` surface filled with the background colour.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(BACKGROUND)),
            clip: PixelRect::new(0, 0, width, height),
        }
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the surface as PNG.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(&path, ImageFormat::Png)?;
        debug!("saved snapshot to {}", path.as_ref().display());
        Ok(())
    }
}

impl Surface for SnapshotSurface {
    fn begin_frame(&mut self, viewport: PixelRect) {
        self.clip = viewport;
    }

    fn blit(&mut self, frame: &TileFrame<'_>) {
        let (width, height) = self.image.dimensions();
        let bounds = PixelRect::new(0, 0, width, height);
        let src = frame.image;
        let bytes = src.as_bytes();
        for (row, line) in bytes.chunks_exact(src.width() * 4).enumerate() {
            let Ok(row) = i32::try_from(row) else { break };
            let y = frame.screen_y.saturating_add(row);
            for (col, px) in line.chunks_exact(4).enumerate() {
                let Ok(col) = i32::try_from(col) else { break };
                let x = frame.screen_x.saturating_add(col);
                if !(self.clip.contains(x, y) && bounds.contains(x, y)) {
                    continue;
                }
                if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
                    self.image
                        .put_pixel(x, y, Rgba([px[0], px[1], px[2], px[3]]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matview_core::{PixelBuffer, TileKey};

    #[test]
    fn test_blit_is_clipped_to_viewport() {
        let mut surface = SnapshotSurface::new(8, 8);
        surface.begin_frame(PixelRect::new(2, 2, 4, 4));
        let tile = PixelBuffer::new(4, 4, [9, 9, 9, 255]);
        surface.blit(&TileFrame {
            key: TileKey::new(0, 0),
            stamp: 0,
            image: &tile,
            screen_x: 4,
            screen_y: -1,
        });
        let image = surface.into_image();
        assert_eq!(image.get_pixel(4, 2).0, [9, 9, 9, 255]);
        assert_eq!(image.get_pixel(5, 2).0, [9, 9, 9, 255]);
        assert_eq!(image.get_pixel(6, 2).0, BACKGROUND);
        assert_eq!(image.get_pixel(4, 1).0, BACKGROUND);
        assert_eq!(image.get_pixel(3, 2).0, BACKGROUND);
    }
}
