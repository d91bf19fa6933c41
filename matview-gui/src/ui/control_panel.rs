//! Control panel (left sidebar) rendering.

use std::path::PathBuf;

use eframe::egui::{self, RichText};
use matview_core::{Colormap, Matrix, MIN_VISIBLE_REGION};

use crate::app::MatviewApp;
use crate::util::file_label;

const MATRIX_EXTENSIONS: [&str; 7] = ["txt", "dat", "asc", "csv", "mtx", "tif", "tiff"];

/// File actions requested from the panel, run after it is drawn.
enum PanelAction {
    OpenMatrix(PathBuf),
    LoadCuts(PathBuf),
    SaveCuts(PathBuf),
}

fn section_header(ui: &mut egui::Ui, title: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(title).strong());
    ui.separator();
}

impl MatviewApp {
    /// Render the left sidebar.
    pub(crate) fn render_side_panel(&mut self, ctx: &egui::Context) {
        let mut action = None;
        egui::SidePanel::left("control_panel")
            .resizable(false)
            .exact_width(250.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.render_controls(ui);
                });
            });

        let result = match action {
            Some(PanelAction::OpenMatrix(path)) => {
                self.load_file(path);
                return;
            }
            Some(PanelAction::LoadCuts(path)) => self
                .load_cut_file(&path)
                .map(|n| format!("Loaded {n} cuts")),
            Some(PanelAction::SaveCuts(path)) => self
                .save_cut_file(&path)
                .map(|n| format!("Saved {n} cuts")),
            None => return,
        };
        self.message = match result {
            Ok(text) => text,
            Err(e) => format!("Error: {e:#}"),
        };
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) -> Option<PanelAction> {
        let mut action = None;

        section_header(ui, "File");
        if ui.button("Open matrix…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Matrix", &MATRIX_EXTENSIONS)
                .pick_file()
            {
                action = Some(PanelAction::OpenMatrix(path));
            }
        }
        if let Some(path) = &self.selected_file {
            ui.label(file_label(path));
        }

        let Some(view) = self.view.as_mut() else {
            return action;
        };

        let matrix = view.matrix();
        ui.label(format!("{} × {} bins", matrix.width(), matrix.height()));
        ui.label(format!("Maximum: {}", matrix.maximum()));

        section_header(ui, "Display");
        let mut log_scale = view.color_scale().log_scale;
        if ui.checkbox(&mut log_scale, "Log scale (l)").changed() {
            view.set_log_scale(log_scale);
            self.needs_redraw = true;
        }

        let mut colormap = view.colormap();
        egui::ComboBox::from_label("Colormap")
            .selected_text(colormap.to_string())
            .show_ui(ui, |ui| {
                for option in Colormap::ALL {
                    ui.selectable_value(&mut colormap, option, option.to_string());
                }
            });
        if colormap != view.colormap() {
            view.set_colormap(colormap);
            self.needs_redraw = true;
        }

        let scale = *view.color_scale();
        let mut z_low = scale.z_offset;
        let mut z_high = scale.z_offset + scale.z_visible_region;
        let speed = (scale.z_visible_region / 200.0).max(MIN_VISIBLE_REGION);
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label("Window");
            changed |= ui.add(egui::DragValue::new(&mut z_low).speed(speed)).changed();
            ui.label("–");
            changed |= ui.add(egui::DragValue::new(&mut z_high).speed(speed)).changed();
        });
        if changed {
            view.set_z_window(z_low, (z_high - z_low).max(MIN_VISIBLE_REGION));
            self.needs_redraw = true;
        }

        section_header(ui, "Zoom");
        ui.horizontal(|ui| {
            let step = view.config().zoom_step;
            if ui.button("Zoom in (z)").clicked() {
                view.zoom_around_cursor(step, step);
                self.needs_redraw = true;
            }
            if ui.button("Zoom out (x)").clicked() {
                view.zoom_around_cursor(step.recip(), step.recip());
                self.needs_redraw = true;
            }
        });
        if ui.button("Zoom full (1)").clicked() {
            view.zoom_full();
            self.needs_redraw = true;
        }
        let transform = view.transform();
        ui.label(format!("{:.3} × {:.3} px/bin", transform.zoom_x, transform.zoom_y));

        section_header(ui, "Cuts");
        let mut remove = None;
        for (index, cut) in view.cuts().cuts().iter().enumerate() {
            ui.horizontal(|ui| {
                let [r, g, b, _] = cut.color;
                ui.colored_label(egui::Color32::from_rgb(r, g, b), "■");
                ui.label(format!("{} ({} points)", cut.name, cut.points.len()));
                if ui.small_button("✕").clicked() {
                    remove = Some(index);
                }
            });
        }
        if let Some(index) = remove {
            view.remove_cut(index);
            self.needs_redraw = true;
        }
        ui.horizontal(|ui| {
            if ui.button("Load…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Cuts", &["json"])
                    .pick_file()
                {
                    action = Some(PanelAction::LoadCuts(path));
                }
            }
            if ui.button("Save…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Cuts", &["json"])
                    .save_file()
                {
                    action = Some(PanelAction::SaveCuts(path));
                }
            }
            if ui.button("Clear").clicked() {
                view.remove_all_cuts();
                self.needs_redraw = true;
            }
        });

        section_header(ui, "Tile cache");
        let cache = view.tile_cache();
        ui.label(format!(
            "{} tiles cached, {} rendered, epoch {}",
            cache.len(),
            cache.renders(),
            cache.epoch()
        ));
        ui.label(format!("{} textures", self.surface.texture_count()));

        section_header(ui, "Keys");
        ui.label(
            RichText::new(
                "drag: pan   wheel: zoom\n\
                 z / x: zoom in / out   1: fit\n\
                 l: log scale   + / -: window\n\
                 arrows: pan",
            )
            .small(),
        );

        action
    }
}
