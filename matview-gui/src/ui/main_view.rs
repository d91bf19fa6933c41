//! Main view (central panel) and status bar rendering.

use eframe::egui::{self, Color32, Sense};
use matview_core::{InputEvent, BACKGROUND};

use crate::app::MatviewApp;
use crate::ui::input;
use crate::util::f32_to_u32;

const VIEW_BG: Color32 = Color32::from_rgb(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2]);

impl MatviewApp {
    /// Render the central panel with the matrix view.
    pub(crate) fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(VIEW_BG))
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(rect, Sense::click_and_drag());
                let Some(view) = self.view.as_mut() else {
                    ui.centered_and_justified(|ui| ui.label("No matrix loaded"));
                    return;
                };

                let size = (f32_to_u32(rect.width()), f32_to_u32(rect.height()));
                if size != self.view_size {
                    self.view_size = size;
                    let resize = InputEvent::Resize {
                        width: size.0,
                        height: size.1,
                    };
                    self.needs_redraw |= view.handle_input(&resize, &mut self.status);
                }

                for event in input::collect(ctx, rect, &response, &mut self.pointer_inside) {
                    self.needs_redraw |= view.handle_input(&event, &mut self.status);
                }

                if self.needs_redraw {
                    view.redraw(&mut self.surface);
                    self.surface.finish();
                    self.needs_redraw = false;
                }
                self.surface.paint(ui.painter(), rect.min);
            });
    }

    /// Render the bottom status bar: cursor readout and load messages.
    pub(crate) fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.monospace(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.is_loading {
                        ui.spinner();
                    }
                    ui.label(&self.message);
                });
            });
        });
    }
}
