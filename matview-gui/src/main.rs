//! matview GUI application entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod message;
mod surface;
mod ui;
mod util;

use std::path::PathBuf;

use app::MatviewApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "matview",
        opts,
        Box::new(|cc| Ok(Box::new(MatviewApp::new(cc, initial_file)))),
    )
}
