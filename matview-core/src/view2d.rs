//! Scrollable, zoomable matrix view.
//!
//! [`View2D`] owns the zoom and pan state, the tile cache and the cut
//! overlay. Every mutation that changes tile content (zoom, intensity
//! window, log mode, colormap) flushes the cache before returning; panning
//! only moves the screen/tile translation and keeps cached tiles.

use std::ops::RangeInclusive;

use log::{debug, trace};

use crate::color::{ColorScale, Colormap};
use crate::config::ViewConfig;
use crate::cut::{Cut, CutOverlay};
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::pixels::{PixelBuffer, PixelRect};
use crate::tile::{TileCache, TileKey, TileRenderer, BACKGROUND};
use crate::transform::{nearest, tile_id, CoordinateTransform, TILE_SIZE};
use crate::util::{f64_to_i64_saturating, i64_to_i32_saturating, usize_to_f64};
use crate::view::{Button, InputEvent, Key, StatusSink, Surface, TileFrame, View};

/// Largest zoom in pixels per bin.
pub const MAX_ZOOM: f64 = 4096.0;
/// Smallest zoom in pixels per bin.
pub const MIN_ZOOM: f64 = 1e-6;

/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Idle,
    /// Primary button held; `last_*` is the previous pointer position.
    Panning { last_x: i32, last_y: i32 },
    /// Zoom changed (or is waiting for a viewport) and no redraw happened yet.
    ZoomPending,
}

/// Tile-cached view of a [`Matrix`].
pub struct View2D<M: Matrix> {
    matrix: M,
    config: ViewConfig,
    transform: CoordinateTransform,
    scale: ColorScale,
    colormap: Colormap,
    tiles: TileCache,
    cuts: CutOverlay,
    interaction: Interaction,
    /// Window size as given to `layout`.
    width: u32,
    height: u32,
    /// Last pointer position inside the window.
    cursor: Option<(i32, i32)>,
    /// Zoom-to-fit requested before the viewport size was known.
    zoom_full_pending: bool,
    /// Composition buffer for tiles with cut overlays.
    scratch: PixelBuffer,
}

impl<M: Matrix> View2D<M> {
    /// Create a view with the default configuration.
    pub fn new(matrix: M) -> Self {
        Self::build(matrix, ViewConfig::default())
    }

    /// Create a view with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid.
    pub fn with_config(matrix: M, config: ViewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(matrix, config))
    }

    #[allow(clippy::cast_sign_loss)]
    fn build(matrix: M, config: ViewConfig) -> Self {
        let scale = ColorScale::full_range(matrix.maximum(), config.log_scale);
        let colormap = config.colormap;
        Self {
            matrix,
            config,
            transform: CoordinateTransform::default(),
            scale,
            colormap,
            tiles: TileCache::new(),
            cuts: CutOverlay::new(),
            interaction: Interaction::ZoomPending,
            width: 0,
            height: 0,
            cursor: None,
            zoom_full_pending: true,
            scratch: PixelBuffer::new(TILE_SIZE as usize, TILE_SIZE as usize, BACKGROUND),
        }
    }

    /// Recompute the viewport for a window of `width` × `height` pixels.
    ///
    /// Only the set of visible tiles changes; the cache is kept. A zoom-to-fit
    /// requested before the first layout is applied here.
    pub fn layout(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let viewport = self.viewport();
        trace!(
            "layout {width}x{height}, viewport {}x{}",
            viewport.width,
            viewport.height
        );
        if self.zoom_full_pending && !viewport.is_empty() {
            self.zoom_full();
        }
    }

    /// Matrix area of the window, inside the border insets.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn viewport(&self) -> PixelRect {
        let b = self.config.borders;
        PixelRect::new(
            b.left as i32,
            b.top as i32,
            self.width.saturating_sub(b.left.saturating_add(b.right)),
            self.height.saturating_sub(b.top.saturating_add(b.bottom)),
        )
    }

    /// Fit the whole matrix into the viewport.
    pub fn zoom_full(&mut self) {
        let viewport = self.viewport();
        if viewport.is_empty() {
            self.zoom_full_pending = true;
            self.interaction = Interaction::ZoomPending;
            return;
        }
        let cols = usize_to_f64(self.matrix.width().max(1));
        let rows = usize_to_f64(self.matrix.height().max(1));
        let zoom_x = (f64::from(viewport.width) / cols).clamp(MIN_ZOOM, MAX_ZOOM);
        let zoom_y = (f64::from(viewport.height) / rows).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pixel 0 starts at the lower matrix edge (data -0.5).
        self.transform = CoordinateTransform {
            zoom_x,
            zoom_y,
            x_offset: 0.5 - 0.5 / zoom_x,
            y_offset: 0.5 / zoom_y - 0.5,
            x_tile_offset: viewport.x,
            y_tile_offset: viewport.bottom() - 1,
        };
        debug!("zoom full: {zoom_x:.4} x {zoom_y:.4} px/bin");
        self.zoom_full_pending = false;
        self.tiles.flush();
        self.interaction = Interaction::ZoomPending;
    }

    /// Scale the zoom by `fx`, `fy` keeping the data point under screen pixel
    /// `(xs, ys)` on that pixel.
    ///
    /// # Panics
    ///
    /// Panics if a factor is not a positive finite number.
    pub fn zoom_around(&mut self, fx: f64, fy: f64, xs: i32, ys: i32) {
        assert!(fx.is_finite() && fx > 0.0, "invalid zoom factor {fx}");
        assert!(fy.is_finite() && fy > 0.0, "invalid zoom factor {fy}");
        let zoom_x = (self.transform.zoom_x * fx).clamp(MIN_ZOOM, MAX_ZOOM);
        let zoom_y = (self.transform.zoom_y * fy).clamp(MIN_ZOOM, MAX_ZOOM);
        #[allow(clippy::float_cmp)]
        let unchanged = zoom_x == self.transform.zoom_x && zoom_y == self.transform.zoom_y;
        if unchanged {
            trace!("zoom unchanged at {zoom_x} x {zoom_y} px/bin");
            return;
        }
        let (ex, ey) = self.transform.screen_to_data(xs, ys);

        self.transform.zoom_x = zoom_x;
        self.transform.zoom_y = zoom_y;
        let tx = self.transform.data_to_x_tile(ex);
        let ty = self.transform.data_to_y_tile(ey);
        self.transform.x_tile_offset = xs.saturating_sub(tx);
        self.transform.y_tile_offset = ys.saturating_add(ty);

        debug!(
            "zoom around ({ex:.2}, {ey:.2}): {:.4} x {:.4} px/bin",
            self.transform.zoom_x, self.transform.zoom_y
        );
        self.zoom_full_pending = false;
        self.tiles.flush();
        self.interaction = Interaction::ZoomPending;
    }

    /// Zoom around the last pointer position, or the viewport centre if the
    /// pointer is outside the view.
    pub fn zoom_around_cursor(&mut self, fx: f64, fy: f64) {
        let (xs, ys) = self.cursor.unwrap_or_else(|| self.viewport_center());
        self.zoom_around(fx, fy, xs, ys);
    }

    /// Set absolute zoom factors, keeping the viewport centre fixed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZoom`] for zero, negative or non-finite zoom.
    pub fn set_zoom(&mut self, zoom_x: f64, zoom_y: f64) -> Result<()> {
        for zoom in [zoom_x, zoom_y] {
            if !(zoom.is_finite() && zoom > 0.0) {
                return Err(Error::InvalidZoom(zoom));
            }
        }
        let (xs, ys) = self.viewport_center();
        self.zoom_around(
            zoom_x / self.transform.zoom_x,
            zoom_y / self.transform.zoom_y,
            xs,
            ys,
        );
        Ok(())
    }

    /// Move the view by a screen-space delta. Cached tiles stay valid.
    pub fn shift_offset(&mut self, dx: i32, dy: i32) {
        self.transform.shift(dx, dy);
    }

    /// Pan so that data point `(x, y)` is at the viewport centre.
    pub fn center_on(&mut self, x: f64, y: f64) {
        let (cx, cy) = self.viewport_center();
        let (sx, sy) = self.transform.data_to_screen(x, y);
        self.shift_offset(cx.saturating_sub(sx), cy.saturating_sub(sy));
    }

    fn viewport_center(&self) -> (i32, i32) {
        let viewport = self.viewport();
        (
            viewport.x + i64_to_i32_saturating(i64::from(viewport.width / 2)),
            viewport.y + i64_to_i32_saturating(i64::from(viewport.height / 2)),
        )
    }

    /// Enable or disable log scaling; resets the intensity window.
    pub fn set_log_scale(&mut self, log_scale: bool) {
        if self.scale.log_scale == log_scale {
            return;
        }
        self.scale = ColorScale::full_range(self.matrix.maximum(), log_scale);
        self.tiles.flush();
    }

    pub fn toggle_log_scale(&mut self) {
        self.set_log_scale(!self.scale.log_scale);
    }

    /// Set the intensity window (in log space when log scaling is on).
    pub fn set_z_window(&mut self, z_offset: f64, z_visible_region: f64) {
        self.scale.z_offset = z_offset;
        self.scale.z_visible_region = z_visible_region;
        self.tiles.flush();
    }

    /// Multiply the width of the intensity window by `factor`.
    pub fn scale_z_window(&mut self, factor: f64) {
        let region = self.scale.z_visible_region * factor;
        self.set_z_window(self.scale.z_offset, region);
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        if self.colormap != colormap {
            self.colormap = colormap;
            self.tiles.flush();
        }
    }

    pub fn add_cut(&mut self, cut: Cut) {
        self.cuts.add_cut(cut);
    }

    pub fn add_polygon(&mut self, points: Vec<(f64, f64)>, invert_axes: bool) {
        self.cuts.add_polygon(points, invert_axes);
    }

    pub fn remove_cut(&mut self, index: usize) -> Option<Cut> {
        self.cuts.remove_cut(index)
    }

    pub fn remove_all_cuts(&mut self) {
        self.cuts.remove_all_cuts();
    }

    /// Tile-index ranges `(x, y)` covering the viewport.
    #[must_use]
    pub fn visible_tiles(&self) -> Option<(RangeInclusive<i32>, RangeInclusive<i32>)> {
        let viewport = self.viewport();
        if viewport.is_empty() {
            return None;
        }
        let t = &self.transform;
        let x_first = tile_id(t.x_screen_to_tile(viewport.x));
        let x_last = tile_id(t.x_screen_to_tile(viewport.right() - 1));
        let y_first = tile_id(t.y_screen_to_tile(viewport.bottom() - 1));
        let y_last = tile_id(t.y_screen_to_tile(viewport.y));
        Some((x_first..=x_last, y_first..=y_last))
    }

    /// Draw the visible tiles with cut overlays, then weed the cache.
    pub fn redraw(&mut self, surface: &mut dyn Surface) {
        let Some((x_range, y_range)) = self.visible_tiles() else {
            return;
        };
        surface.begin_frame(self.viewport());

        let renderer = TileRenderer {
            matrix: &self.matrix,
            transform: &self.transform,
            scale: self.scale,
            colormap: self.colormap,
        };
        let stamp = self.tiles.epoch() + self.cuts.revision();

        for ty in y_range.clone().rev() {
            for tx in x_range.clone() {
                let key = TileKey::new(tx, ty);
                let tile = self.tiles.get_tile(key, &renderer);
                let image = if self.cuts.is_empty() {
                    &tile.image
                } else {
                    self.scratch.clone_from(&tile.image);
                    self.cuts.render_cuts(key, &self.transform, &mut self.scratch);
                    &self.scratch
                };
                let (x0, y0) = key.origin();
                surface.blit(&TileFrame {
                    key,
                    stamp,
                    image,
                    screen_x: self.transform.x_tile_to_screen(x0),
                    screen_y: self.transform.y_tile_to_screen(y0 + (TILE_SIZE - 1)),
                });
            }
        }

        self.tiles.weed(x_range, y_range, self.config.tile_margin);
        if self.interaction == Interaction::ZoomPending && !self.zoom_full_pending {
            self.interaction = Interaction::Idle;
        }
    }

    /// Data coordinates and nearest bin under screen pixel `(xs, ys)`.
    #[must_use]
    pub fn bin_at_pixel(&self, xs: i32, ys: i32) -> (f64, f64, i64, i64) {
        let (ex, ey) = self.transform.screen_to_data(xs, ys);
        (ex, ey, nearest(ex), nearest(ey))
    }

    /// Matrix value at screen pixel `(xs, ys)`, or `None` outside the matrix.
    #[must_use]
    pub fn value_at_pixel(&self, xs: i32, ys: i32) -> Option<f64> {
        let (_, _, bx, by) = self.bin_at_pixel(xs, ys);
        self.matrix
            .contains(bx, by)
            .then(|| self.matrix.bin_content(bx, by))
    }

    fn update_status(&self, status: &mut dyn StatusSink) {
        let Some((xs, ys)) = self.cursor else {
            status.set_status("");
            return;
        };
        let (ex, ey, bx, by) = self.bin_at_pixel(xs, ys);
        let text = match self.value_at_pixel(xs, ys) {
            Some(z) => format!("x: {bx}  y: {by}  z: {z}"),
            None => format!("x: {ex:.1}  y: {ey:.1}"),
        };
        status.set_status(&text);
    }

    fn pan_step(&self) -> (i32, i32) {
        let viewport = self.viewport();
        let step = |len: u32| {
            i64_to_i32_saturating(f64_to_i64_saturating(
                (f64::from(len) * self.config.pan_fraction).round(),
            ))
            .max(1)
        };
        (step(viewport.width), step(viewport.height))
    }

    fn handle_key(&mut self, key: Key) -> bool {
        let (step_x, step_y) = self.pan_step();
        let zoom = self.config.zoom_step;
        match key {
            Key::Char('z') => self.zoom_around_cursor(zoom, zoom),
            Key::Char('x') => self.zoom_around_cursor(1.0 / zoom, 1.0 / zoom),
            Key::Char('1') => self.zoom_full(),
            Key::Char('l') => self.toggle_log_scale(),
            Key::Char('+') => self.scale_z_window(1.0 / self.config.z_window_step),
            Key::Char('-') => self.scale_z_window(self.config.z_window_step),
            Key::Left => self.shift_offset(step_x, 0),
            Key::Right => self.shift_offset(-step_x, 0),
            Key::Up => self.shift_offset(0, step_y),
            Key::Down => self.shift_offset(0, -step_y),
            Key::Char(_) => return false,
        }
        true
    }

    /// Dispatch one input event; returns `true` if a redraw is needed.
    pub fn handle_input(&mut self, event: &InputEvent, status: &mut dyn StatusSink) -> bool {
        match *event {
            InputEvent::ButtonPress {
                x,
                y,
                button: Button::Primary,
            } if self.viewport().contains(x, y) => {
                self.interaction = Interaction::Panning {
                    last_x: x,
                    last_y: y,
                };
                false
            }
            InputEvent::ButtonRelease {
                button: Button::Primary,
                ..
            } => {
                if matches!(self.interaction, Interaction::Panning { .. }) {
                    self.interaction = Interaction::Idle;
                }
                false
            }
            InputEvent::ButtonPress { .. } | InputEvent::ButtonRelease { .. } => false,
            InputEvent::Motion { x, y } => {
                self.cursor = Some((x, y));
                let moved = if let Interaction::Panning { last_x, last_y } = self.interaction {
                    self.shift_offset(x - last_x, y - last_y);
                    self.interaction = Interaction::Panning {
                        last_x: x,
                        last_y: y,
                    };
                    x != last_x || y != last_y
                } else {
                    false
                };
                self.update_status(status);
                moved
            }
            InputEvent::Scroll { x, y, steps } => {
                if steps == 0 {
                    return false;
                }
                self.cursor = Some((x, y));
                let factor = self.config.zoom_step.powi(steps);
                self.zoom_around(factor, factor, x, y);
                self.update_status(status);
                true
            }
            InputEvent::Enter => false,
            InputEvent::Leave => {
                self.cursor = None;
                status.set_status("");
                false
            }
            InputEvent::Key(key) => {
                let redraw = self.handle_key(key);
                if redraw {
                    self.update_status(status);
                }
                redraw
            }
            InputEvent::Resize { width, height } => {
                self.layout(width, height);
                true
            }
        }
    }

    #[must_use]
    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    #[must_use]
    pub fn color_scale(&self) -> &ColorScale {
        &self.scale
    }

    #[must_use]
    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    #[must_use]
    pub fn tile_cache(&self) -> &TileCache {
        &self.tiles
    }

    #[must_use]
    pub fn cuts(&self) -> &CutOverlay {
        &self.cuts
    }

    #[must_use]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    #[must_use]
    pub fn cursor(&self) -> Option<(i32, i32)> {
        self.cursor
    }
}

impl<M: Matrix> View for View2D<M> {
    fn layout(&mut self, width: u32, height: u32) {
        View2D::layout(self, width, height);
    }

    fn redraw(&mut self, surface: &mut dyn Surface) {
        View2D::redraw(self, surface);
    }

    fn handle_input(&mut self, event: &InputEvent, status: &mut dyn StatusSink) -> bool {
        View2D::handle_input(self, event, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DenseMatrix;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(TileKey, u64, i32, i32)>,
    }

    impl Surface for Recorder {
        fn blit(&mut self, frame: &TileFrame<'_>) {
            self.frames
                .push((frame.key, frame.stamp, frame.screen_x, frame.screen_y));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn view() -> View2D<DenseMatrix> {
        let matrix = DenseMatrix::from_fn(256, 256, |x, y| (x + y) as f64);
        let mut view = View2D::new(matrix);
        view.layout(516, 516);
        view
    }

    #[test]
    fn test_zoom_full_before_layout_is_deferred() {
        let mut view = View2D::new(DenseMatrix::new(10, 10));
        view.zoom_full();
        assert_eq!(view.interaction(), Interaction::ZoomPending);
        view.layout(24, 24);
        assert!((view.transform().zoom_x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_full_fits_matrix() {
        let view = view();
        let t = view.transform();
        assert!((t.zoom_x - 2.0).abs() < 1e-12);
        // Bottom-left bin at the bottom-left viewport pixel.
        assert_eq!(view.value_at_pixel(2, 513), Some(0.0));
        assert_eq!(view.value_at_pixel(513, 2), Some(510.0));
        assert_eq!(view.value_at_pixel(1, 513), None);
    }

    #[test]
    fn test_redraw_visits_visible_tiles_and_settles() {
        let mut view = view();
        let mut surface = Recorder::default();
        view.redraw(&mut surface);
        assert_eq!(surface.frames.len(), 16);
        assert_eq!(view.tile_cache().renders(), 16);
        assert_eq!(view.interaction(), Interaction::Idle);

        view.redraw(&mut surface);
        assert_eq!(view.tile_cache().renders(), 16);
    }

    #[test]
    fn test_pan_keeps_cache() {
        let mut view = view();
        let mut surface = Recorder::default();
        view.redraw(&mut surface);
        let epoch = view.tile_cache().epoch();
        let mut status = String::new();
        view.handle_input(
            &InputEvent::ButtonPress {
                x: 100,
                y: 100,
                button: Button::Primary,
            },
            &mut status,
        );
        assert!(view.handle_input(&InputEvent::Motion { x: 140, y: 90 }, &mut status));
        assert_eq!(view.transform().x_tile_offset, 42);
        assert_eq!(view.tile_cache().epoch(), epoch);
        view.handle_input(
            &InputEvent::ButtonRelease {
                x: 140,
                y: 90,
                button: Button::Primary,
            },
            &mut status,
        );
        assert_eq!(view.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_intensity_changes_flush() {
        let mut view = view();
        let mut surface = Recorder::default();
        view.redraw(&mut surface);
        let renders = view.tile_cache().renders();
        view.toggle_log_scale();
        assert!(view.tile_cache().is_empty());
        view.redraw(&mut surface);
        assert_eq!(view.tile_cache().renders(), renders * 2);

        view.set_z_window(0.0, 3.0);
        assert!(view.tile_cache().is_empty());
        view.set_colormap(Colormap::Hot);
        // One flush from the initial zoom-to-fit plus three above.
        assert_eq!(view.tile_cache().epoch(), 4);
    }

    #[test]
    fn test_status_reports_value_and_clears_on_leave() {
        let mut view = view();
        let mut status = String::new();
        view.handle_input(&InputEvent::Motion { x: 2, y: 513 }, &mut status);
        assert_eq!(status, "x: 0  y: 0  z: 0");
        view.handle_input(&InputEvent::Leave, &mut status);
        assert!(status.is_empty());
    }

    #[test]
    fn test_cut_change_changes_stamp() {
        let mut view = view();
        let mut surface = Recorder::default();
        view.redraw(&mut surface);
        let first = surface.frames[0].1;
        view.add_polygon(vec![(0.0, 0.0), (100.0, 100.0)], false);
        surface.frames.clear();
        view.redraw(&mut surface);
        assert_ne!(surface.frames[0].1, first);
        assert_eq!(view.tile_cache().renders(), 16);
    }

    #[test]
    fn test_zoom_at_limit_keeps_cache() {
        let mut view = view();
        view.set_zoom(MAX_ZOOM, MAX_ZOOM).unwrap();
        let epoch = view.tile_cache().epoch();
        let before = *view.transform();
        view.zoom_around(2.0, 2.0, 100, 100);
        assert_eq!(view.tile_cache().epoch(), epoch);
        assert_eq!(view.transform().x_tile_offset, before.x_tile_offset);
        assert_eq!(view.transform().y_tile_offset, before.y_tile_offset);
        view.zoom_around(0.5, 0.5, 100, 100);
        assert_eq!(view.tile_cache().epoch(), epoch + 1);
    }

    #[test]
    fn test_scroll_zooms_and_refreshes_status() {
        let mut view = view();
        let mut status = String::new();
        view.handle_input(&InputEvent::Motion { x: 2, y: 513 }, &mut status);
        assert_eq!(status, "x: 0  y: 0  z: 0");

        let scroll = InputEvent::Scroll {
            x: 300,
            y: 200,
            steps: 1,
        };
        assert!(view.handle_input(&scroll, &mut status));
        assert!((view.transform().zoom_x - 2.0 * view.config().zoom_step).abs() < 1e-9);
        assert_eq!(view.cursor(), Some((300, 200)));
        let (_, _, bx, by) = view.bin_at_pixel(300, 200);
        assert_eq!(status, format!("x: {bx}  y: {by}  z: {}", bx + by));

        let still = InputEvent::Scroll {
            x: 300,
            y: 200,
            steps: 0,
        };
        assert!(!view.handle_input(&still, &mut status));
    }

    #[test]
    fn test_secondary_button_does_not_pan() {
        let mut view = view();
        let mut status = String::new();
        view.handle_input(
            &InputEvent::ButtonPress {
                x: 100,
                y: 100,
                button: Button::Secondary,
            },
            &mut status,
        );
        assert!(!matches!(view.interaction(), Interaction::Panning { .. }));
        assert!(!view.handle_input(&InputEvent::Motion { x: 140, y: 90 }, &mut status));
    }

    #[test]
    fn test_set_zoom_rejects_invalid() {
        let mut view = view();
        assert_eq!(view.set_zoom(0.0, 1.0), Err(Error::InvalidZoom(0.0)));
        assert!(view.set_zoom(4.0, 4.0).is_ok());
        assert!((view.transform().zoom_y - 4.0).abs() < 1e-12);
    }
}
