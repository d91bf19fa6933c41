//! matview-core: Tile-cached rendering core for 2D matrix views.
//!
//! This crate provides the pieces needed to display a large 2D histogram
//! (for example, coincidence counts over two energy axes) in a scrollable,
//! zoomable viewport:
//! - **transform** - conversions between data, tile and screen coordinates
//! - **color** - intensity to colour mapping, with optional log scaling
//! - **tile** - the rendered tile cache
//! - **cut** - polygonal cut overlays composited onto tiles
//! - **view2d** - the view controller driving zoom, pan and redraw
//!

pub mod color;
pub mod config;
pub mod cut;
pub mod error;
pub mod matrix;
pub mod pixels;
pub mod tile;
pub mod transform;
mod util;
pub mod view;
pub mod view2d;

pub use color::{ColorScale, Colormap, COLOR_RANGE, MIN_VISIBLE_REGION};
pub use config::{Borders, ViewConfig};
pub use cut::{Cut, CutOverlay};
pub use error::{Error, Result};
pub use matrix::{DenseMatrix, Matrix};
pub use pixels::{PixelBuffer, PixelRect, Rgba};
pub use tile::{Tile, TileCache, TileKey, TileRenderer, BACKGROUND};
pub use transform::{nearest, tile_id, CoordinateTransform, TILE_SIZE};
pub use view::{Button, InputEvent, Key, StatusSink, Surface, TileFrame, View};
pub use view2d::{Interaction, View2D};
