//! Interfaces between a view and its host.
//!
//! The host (window system, headless renderer, test harness) delivers
//! [`InputEvent`]s and provides a [`Surface`] to draw on and a
//! [`StatusSink`] for short status text. Views implement [`View`].

use crate::pixels::{PixelBuffer, PixelRect};
use crate::tile::TileKey;

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

/// Keys a view reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
}

/// Input events in screen coordinates (origin top-left, Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    ButtonPress { x: i32, y: i32, button: Button },
    ButtonRelease { x: i32, y: i32, button: Button },
    Motion { x: i32, y: i32 },
    /// Wheel notches at `(x, y)`; positive zooms in.
    Scroll { x: i32, y: i32, steps: i32 },
    /// Pointer entered the view.
    Enter,
    /// Pointer left the view.
    Leave,
    Key(Key),
    Resize { width: u32, height: u32 },
}

/// A composited tile ready to be copied to the screen.
#[derive(Debug, Clone, Copy)]
pub struct TileFrame<'a> {
    pub key: TileKey,
    /// Changes whenever the content for `key` may have changed.
    pub stamp: u64,
    pub image: &'a PixelBuffer,
    /// Screen position of the image's top-left pixel.
    pub screen_x: i32,
    pub screen_y: i32,
}

/// Drawable owned by the host.
pub trait Surface {
    /// Called once per redraw before any blit, with the viewport to clip to.
    fn begin_frame(&mut self, viewport: PixelRect) {
        let _ = viewport;
    }

    /// Copy a tile image to the screen, clipped to the viewport.
    fn blit(&mut self, frame: &TileFrame<'_>);
}

/// Write-only status text display.
pub trait StatusSink {
    fn set_status(&mut self, text: &str);
}

impl StatusSink for String {
    fn set_status(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// Capabilities shared by every kind of display view.
pub trait View {
    /// Adapt to a new window size.
    fn layout(&mut self, width: u32, height: u32);

    /// Draw the visible part of the view.
    fn redraw(&mut self, surface: &mut dyn Surface);

    /// React to an input event; returns `true` if a redraw is needed.
    fn handle_input(&mut self, event: &InputEvent, status: &mut dyn StatusSink) -> bool;
}
