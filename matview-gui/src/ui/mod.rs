//! UI rendering modules.
//!
//! Contains the UI rendering logic split into separate modules:
//! - `control_panel`: Left sidebar with file, display and cut controls
//! - `main_view`: Central panel hosting the matrix view, plus the status bar
//! - `input`: Translation of egui input into view events

mod control_panel;
mod input;
mod main_view;
