//! Main application state and logic.
//!
//! Contains the `MatviewApp` struct which owns the matrix view, the texture
//! surface it draws into and the channel used by the background loader.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Instant;

use anyhow::Context as _;
use eframe::egui;
use log::{info, warn};
use matview_core::{DenseMatrix, View2D, ViewConfig};

use crate::message::AppMessage;
use crate::surface::TextureSurface;
use crate::util::file_label;

/// Main application state.
pub struct MatviewApp {
    /// Currently loaded (or loading) matrix file.
    pub(crate) selected_file: Option<PathBuf>,
    /// Configuration applied to every new view.
    pub(crate) config: ViewConfig,

    /// View of the loaded matrix.
    pub(crate) view: Option<View2D<DenseMatrix>>,
    /// Drawable the view renders into.
    pub(crate) surface: TextureSurface,
    /// Size of the central panel in view pixels.
    pub(crate) view_size: (u32, u32),
    /// Whether the pointer was over the view last frame.
    pub(crate) pointer_inside: bool,
    /// Redraw the view before painting.
    pub(crate) needs_redraw: bool,

    /// Cursor readout written by the view.
    pub(crate) status: String,
    /// Load results and errors.
    pub(crate) message: String,
    pub(crate) is_loading: bool,

    /// Message receiver for async operations.
    pub(crate) rx: Receiver<AppMessage>,
    /// Message sender for async operations.
    pub(crate) tx: Sender<AppMessage>,
}

/// Decode a matrix file on a worker thread.
fn load_file_worker(path: PathBuf, tx: &Sender<AppMessage>) {
    let start = Instant::now();
    let result = matview_io::load_matrix(&path)
        .with_context(|| format!("failed to load {}", path.display()));
    let msg = match result {
        Ok(matrix) => AppMessage::LoadComplete(Box::new(matrix), path, start.elapsed()),
        Err(e) => AppMessage::LoadError(format!("{e:#}")),
    };
    if tx.send(msg).is_err() {
        warn!("UI closed before loading finished");
    }
}

impl MatviewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_file: Option<PathBuf>) -> Self {
        let (tx, rx) = channel();
        let mut app = Self {
            selected_file: None,
            config: ViewConfig::default(),
            view: None,
            surface: TextureSurface::new(cc.egui_ctx.clone()),
            view_size: (0, 0),
            pointer_inside: false,
            needs_redraw: false,
            status: String::new(),
            message: String::new(),
            is_loading: false,
            rx,
            tx,
        };
        if let Some(path) = initial_file {
            app.load_file(path);
        }
        app
    }

    /// Load a matrix file asynchronously.
    pub fn load_file(&mut self, path: PathBuf) {
        self.selected_file = Some(path.clone());
        self.is_loading = true;
        self.message = format!("Loading {}...", path.display());

        let tx = self.tx.clone();
        thread::spawn(move || load_file_worker(path, &tx));
    }

    /// Replace the current view with one for `matrix`.
    fn show_matrix(&mut self, matrix: DenseMatrix) -> anyhow::Result<()> {
        let mut view = View2D::with_config(matrix, self.config.clone())
            .context("invalid view configuration")?;
        let (width, height) = self.view_size;
        view.layout(width, height);
        view.zoom_full();
        self.surface.clear();
        self.status.clear();
        self.view = Some(view);
        self.needs_redraw = true;
        Ok(())
    }

    /// Add the cuts stored in a JSON file to the view.
    pub(crate) fn load_cut_file(&mut self, path: &Path) -> anyhow::Result<usize> {
        let view = self.view.as_mut().context("no matrix loaded")?;
        let cuts = matview_io::load_cuts(path)
            .with_context(|| format!("failed to read cuts from {}", path.display()))?;
        let count = cuts.len();
        for cut in cuts {
            view.add_cut(cut);
        }
        self.needs_redraw = true;
        Ok(count)
    }

    /// Write the view's cuts to a JSON file.
    pub(crate) fn save_cut_file(&self, path: &Path) -> anyhow::Result<usize> {
        let view = self.view.as_ref().context("no matrix loaded")?;
        matview_io::save_cuts(view.cuts().cuts(), path)
            .with_context(|| format!("failed to write cuts to {}", path.display()))?;
        Ok(view.cuts().len())
    }

    /// Handle pending messages from async workers.
    pub fn handle_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::LoadComplete(matrix, path, dur) => {
                    self.is_loading = false;
                    info!("loaded {} in {:.2?}", path.display(), dur);
                    self.message = format!(
                        "Loaded {} in {:.2}s",
                        file_label(&path),
                        dur.as_secs_f64()
                    );
                    if let Err(e) = self.show_matrix(*matrix) {
                        self.message = format!("Error: {e:#}");
                    }
                }
                AppMessage::LoadError(e) => {
                    self.is_loading = false;
                    self.message = format!("Error: {e}");
                }
            }
        }
    }
}

impl eframe::App for MatviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_messages();
        self.render_side_panel(ctx);
        self.render_status_bar(ctx);
        self.render_central_panel(ctx);

        if self.is_loading {
            ctx.request_repaint();
        }
    }
}
