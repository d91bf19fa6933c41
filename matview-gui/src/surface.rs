//! egui drawable for matrix views.
//!
//! Each tile image becomes a GPU texture. Textures are keyed by tile and
//! re-uploaded only when the frame stamp changes, so panning over cached
//! tiles costs no uploads.

use std::collections::HashMap;

use eframe::egui::{self, Color32, ColorImage, Painter, Pos2, Rect, TextureHandle, TextureOptions};
use log::trace;
use matview_core::{PixelRect, Surface, TileFrame, TileKey};

use crate::util::{i32_to_f32, usize_to_f32};

struct CachedTexture {
    stamp: u64,
    texture: TextureHandle,
    last_used: u64,
}

/// [`Surface`] that uploads tiles as egui textures and paints them on demand.
pub struct TextureSurface {
    ctx: egui::Context,
    textures: HashMap<TileKey, CachedTexture>,
    /// Tiles blitted by the last redraw with their view-local rectangles.
    draws: Vec<(TileKey, Rect)>,
    clip: PixelRect,
    frame: u64,
}

impl TextureSurface {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            textures: HashMap::new(),
            draws: Vec::new(),
            clip: PixelRect::default(),
            frame: 0,
        }
    }

    /// Release textures not used by the last redraw.
    pub fn finish(&mut self) {
        let frame = self.frame;
        let before = self.textures.len();
        self.textures.retain(|_, cached| cached.last_used == frame);
        let released = before - self.textures.len();
        if released > 0 {
            trace!("released {released} tile textures");
        }
    }

    /// Drop every texture, e.g. when a different matrix is shown.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.draws.clear();
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Paint the last redraw with the view origin at `origin`.
    pub fn paint(&self, painter: &Painter, origin: Pos2) {
        let clip = Rect::from_min_size(
            origin + egui::vec2(i32_to_f32(self.clip.x), i32_to_f32(self.clip.y)),
            egui::vec2(
                i32_to_f32(i32::try_from(self.clip.width).unwrap_or(i32::MAX)),
                i32_to_f32(i32::try_from(self.clip.height).unwrap_or(i32::MAX)),
            ),
        );
        let painter = painter.with_clip_rect(clip.intersect(painter.clip_rect()));
        let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        for (key, rect) in &self.draws {
            if let Some(cached) = self.textures.get(key) {
                painter.image(
                    cached.texture.id(),
                    rect.translate(origin.to_vec2()),
                    uv,
                    Color32::WHITE,
                );
            }
        }
    }
}

impl Surface for TextureSurface {
    fn begin_frame(&mut self, viewport: PixelRect) {
        self.frame += 1;
        self.draws.clear();
        self.clip = viewport;
    }

    fn blit(&mut self, frame: &TileFrame<'_>) {
        let size = [frame.image.width(), frame.image.height()];
        match self.textures.get_mut(&frame.key) {
            Some(cached) if cached.stamp == frame.stamp => {}
            Some(cached) => {
                let image = ColorImage::from_rgba_unmultiplied(size, frame.image.as_bytes());
                cached.texture.set(image, TextureOptions::NEAREST);
                cached.stamp = frame.stamp;
            }
            None => {
                let image = ColorImage::from_rgba_unmultiplied(size, frame.image.as_bytes());
                let texture = self.ctx.load_texture(
                    format!("tile_{}_{}", frame.key.x, frame.key.y),
                    image,
                    TextureOptions::NEAREST,
                );
                self.textures.insert(
                    frame.key,
                    CachedTexture {
                        stamp: frame.stamp,
                        texture,
                        last_used: self.frame,
                    },
                );
            }
        }
        if let Some(cached) = self.textures.get_mut(&frame.key) {
            cached.last_used = self.frame;
        }

        let rect = Rect::from_min_size(
            egui::pos2(i32_to_f32(frame.screen_x), i32_to_f32(frame.screen_y)),
            egui::vec2(usize_to_f32(size[0]), usize_to_f32(size[1])),
        );
        self.draws.push((frame.key, rect));
    }
}
