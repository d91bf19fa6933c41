//! Rendered tile cache.
//!
//! Tile space is cut into `TILE_SIZE` × `TILE_SIZE` blocks. A block is only
//! rendered when it is first requested and then kept until it scrolls out of
//! the visible region ([`TileCache::weed`]) or the rendering parameters
//! change ([`TileCache::flush`]).
//!
//! The cache does not check whether a stored tile still matches the current
//! zoom and colour scale; callers must flush whenever those change.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use log::{debug, trace};
use rayon::prelude::*;

use crate::color::{ColorScale, Colormap};
use crate::matrix::Matrix;
use crate::pixels::{PixelBuffer, Rgba};
use crate::transform::{nearest, tile_id, CoordinateTransform, TILE_SIZE};
use crate::util::f64_to_i64_saturating;

/// Colour of pixels outside the matrix.
pub const BACKGROUND: Rgba = [0x1a, 0x1a, 0x1a, 255];

#[allow(clippy::cast_sign_loss)]
const TILE_PIXELS: usize = TILE_SIZE as usize;

/// Block indices of a tile in tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
}

impl TileKey {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing tile-space pixel `(tx, ty)`.
    #[must_use]
    pub fn containing(tx: i32, ty: i32) -> Self {
        Self::new(tile_id(tx), tile_id(ty))
    }

    /// Packed identity: X in the high 32 bits, Y in the low 32 bits.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn id(self) -> u64 {
        (u64::from(self.x as u32) << 32) | u64::from(self.y as u32)
    }

    /// Inverse of [`TileKey::id`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_id(id: u64) -> Self {
        Self::new((id >> 32) as u32 as i32, id as u32 as i32)
    }

    /// Tile-space coordinates of the tile's bottom-left pixel.
    #[must_use]
    pub fn origin(self) -> (i32, i32) {
        (
            self.x.saturating_mul(TILE_SIZE),
            self.y.saturating_mul(TILE_SIZE),
        )
    }

    /// Buffer-local position of a tile-space point (row 0 is the top row).
    #[must_use]
    pub fn to_local(self, tx: f64, ty: f64) -> (f64, f64) {
        let (x0, y0) = self.origin();
        (
            tx - f64::from(x0),
            f64::from(y0) + f64::from(TILE_SIZE - 1) - ty,
        )
    }
}

/// A rendered tile.
#[derive(Debug)]
pub struct Tile {
    /// Position of the tile.
    pub key: TileKey,
    /// Cache epoch the tile was rendered in.
    pub epoch: u64,
    /// `TILE_SIZE` × `TILE_SIZE` RGBA pixels.
    pub image: PixelBuffer,
}

/// Everything needed to render a tile from the matrix.
pub struct TileRenderer<'a, M: Matrix + ?Sized> {
    pub matrix: &'a M,
    pub transform: &'a CoordinateTransform,
    pub scale: ColorScale,
    pub colormap: Colormap,
}

impl<M: Matrix + ?Sized> TileRenderer<'_, M> {
    /// Render one tile.
    ///
    /// Each pixel shows the largest bin content among the matrix cells whose
    /// centres fall in the pixel's data-space footprint. When zoomed in far
    /// enough that no centre falls inside, the cell under the pixel centre is
    /// used. Pixels outside the matrix get [`BACKGROUND`].
    #[must_use]
    pub fn render(&self, key: TileKey) -> PixelBuffer {
        let mut image = PixelBuffer::new(TILE_PIXELS, TILE_PIXELS, BACKGROUND);
        let (x0, y0) = key.origin();

        let columns: Vec<Option<(i64, i64)>> = (0..TILE_SIZE)
            .map(|col| {
                let tx = f64::from(x0.saturating_add(col));
                let lo = self.transform.x_tile_to_data(tx - 0.5);
                let hi = self.transform.x_tile_to_data(tx + 0.5);
                clamp_span(covered_bins(lo, hi), self.matrix.width())
            })
            .collect();

        image
            .as_bytes_mut()
            .par_chunks_mut(TILE_PIXELS * 4)
            .zip(0..TILE_SIZE)
            .for_each(|(line, row)| {
                let ty = f64::from(y0.saturating_add(TILE_SIZE - 1 - row));
                let lo = self.transform.y_tile_to_data(ty - 0.5);
                let hi = self.transform.y_tile_to_data(ty + 0.5);
                let Some(rows) = clamp_span(covered_bins(lo, hi), self.matrix.height()) else {
                    return;
                };
                for (px, column) in line.chunks_exact_mut(4).zip(&columns) {
                    let Some(cols) = *column else {
                        continue;
                    };
                    let z = self.max_content(cols, rows);
                    px.copy_from_slice(&self.colormap.apply_index(self.scale.color_index(z)));
                }
            });

        image
    }

    fn max_content(&self, cols: (i64, i64), rows: (i64, i64)) -> f64 {
        let mut z: f64 = 0.0;
        for y in rows.0..=rows.1 {
            for x in cols.0..=cols.1 {
                z = z.max(self.matrix.bin_content(x, y));
            }
        }
        z
    }
}

/// Bins whose centres lie in `(lo, hi]`, or the bin under the midpoint if none do.
fn covered_bins(lo: f64, hi: f64) -> (i64, i64) {
    let first = f64_to_i64_saturating(lo.floor()).saturating_add(1);
    let last = f64_to_i64_saturating(hi.floor());
    if first <= last {
        (first, last)
    } else {
        let centre = nearest((lo + hi) / 2.0);
        (centre, centre)
    }
}

fn clamp_span(span: (i64, i64), len: usize) -> Option<(i64, i64)> {
    let max = i64::try_from(len).ok()?.checked_sub(1)?;
    let first = span.0.max(0);
    let last = span.1.min(max);
    (first <= last).then_some((first, last))
}

/// Cache of rendered tiles keyed by packed [`TileKey::id`].
#[derive(Debug, Default)]
pub struct TileCache {
    tiles: HashMap<u64, Tile>,
    epoch: u64,
    renders: u64,
}

impl TileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached tile for `key`, rendering it first if needed.
    pub fn get_tile<M: Matrix + ?Sized>(
        &mut self,
        key: TileKey,
        renderer: &TileRenderer<'_, M>,
    ) -> &Tile {
        match self.tiles.entry(key.id()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.renders += 1;
                trace!("rendering tile ({}, {}) in epoch {}", key.x, key.y, self.epoch);
                entry.insert(Tile {
                    key,
                    epoch: self.epoch,
                    image: renderer.render(key),
                })
            }
        }
    }

    /// Drop every cached tile and start a new epoch.
    pub fn flush(&mut self) {
        debug!(
            "flushing {} tiles (epoch {} -> {})",
            self.tiles.len(),
            self.epoch,
            self.epoch + 1
        );
        self.tiles.clear();
        self.epoch += 1;
    }

    /// Drop tiles outside the given tile-index ranges widened by `margin`.
    pub fn weed(
        &mut self,
        x_range: RangeInclusive<i32>,
        y_range: RangeInclusive<i32>,
        margin: i32,
    ) {
        let x_min = x_range.start().saturating_sub(margin);
        let x_max = x_range.end().saturating_add(margin);
        let y_min = y_range.start().saturating_sub(margin);
        let y_max = y_range.end().saturating_add(margin);
        let before = self.tiles.len();
        self.tiles.retain(|_, tile| {
            (x_min..=x_max).contains(&tile.key.x) && (y_min..=y_max).contains(&tile.key.y)
        });
        let removed = before - self.tiles.len();
        if removed > 0 {
            trace!("weeded {removed} tiles");
        }
    }

    /// Whether a tile for `key` is cached.
    #[must_use]
    pub fn contains(&self, key: TileKey) -> bool {
        self.tiles.contains_key(&key.id())
    }

    /// Keys of all cached tiles, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<TileKey> {
        let mut keys: Vec<TileKey> = self.tiles.values().map(|tile| tile.key).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of cached tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Current epoch; incremented by every flush.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Total number of tiles rendered since creation.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders
    }
}
