//! matview CLI
//!
//! Headless rendering of matrix views to PNG and quick matrix summaries.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use matview_core::{Colormap, DenseMatrix, Matrix, View2D, ViewConfig};
use matview_io::SnapshotSurface;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    MatviewIo(#[from] matview_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] matview_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Colormap selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColormapArg {
    /// Five-band spectrum (black, blue, cyan, green, yellow, red)
    Spectrum,
    /// Black to green
    Green,
    /// Red to yellow to white
    Hot,
    /// Black to white
    Grayscale,
    /// Blue to green to yellow
    Viridis,
}

impl From<ColormapArg> for Colormap {
    fn from(arg: ColormapArg) -> Self {
        match arg {
            ColormapArg::Spectrum => Colormap::Spectrum,
            ColormapArg::Green => Colormap::Green,
            ColormapArg::Hot => Colormap::Hot,
            ColormapArg::Grayscale => Colormap::Grayscale,
            ColormapArg::Viridis => Colormap::Viridis,
        }
    }
}

/// Tile-cached 2D histogram viewer, headless front end.
#[derive(Parser)]
#[command(name = "matview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a matrix file (text or TIFF) to a PNG image
    Render {
        /// Input matrix file
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Image width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "600")]
        height: u32,

        /// View configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use logarithmic intensity scaling
        #[arg(long)]
        log: bool,

        /// Colormap
        #[arg(short, long, value_enum)]
        colormap: Option<ColormapArg>,

        /// Cuts to overlay (JSON)
        #[arg(long)]
        cuts: Option<PathBuf>,

        /// Zoom in pixels per bin (default: fit the whole matrix)
        #[arg(long)]
        zoom: Option<f64>,

        /// Data point to center the view on
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        center: Option<Vec<f64>>,

        /// Upper end of the intensity window (default: matrix maximum)
        #[arg(long)]
        z_max: Option<f64>,
    },

    /// Show information about a matrix file
    Info {
        /// Input matrix file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

struct RenderOptions {
    width: u32,
    height: u32,
    zoom: Option<f64>,
    center: Option<Vec<f64>>,
    z_max: Option<f64>,
    cuts: Option<PathBuf>,
}

fn render(
    matrix: DenseMatrix,
    config: ViewConfig,
    options: &RenderOptions,
) -> Result<SnapshotSurface> {
    let mut view = View2D::with_config(matrix, config)?;
    view.layout(options.width, options.height);
    if let Some(zoom) = options.zoom {
        view.set_zoom(zoom, zoom)?;
    }
    if let Some(&[x, y]) = options.center.as_deref() {
        view.center_on(x, y);
    }
    if let Some(z_max) = options.z_max {
        let z_max = if view.color_scale().log_scale {
            matview_core::color::log_counts(z_max)
        } else {
            z_max
        };
        view.set_z_window(0.0, z_max);
    }
    if let Some(path) = &options.cuts {
        for cut in matview_io::load_cuts(path)? {
            view.add_cut(cut);
        }
    }

    let mut surface = SnapshotSurface::new(options.width, options.height);
    view.redraw(&mut surface);
    info!(
        "rendered {} tiles, {} cuts",
        view.tile_cache().renders(),
        view.cuts().len()
    );
    Ok(surface)
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            width,
            height,
            config,
            log,
            colormap,
            cuts,
            zoom,
            center,
            z_max,
        } => {
            let start = Instant::now();
            let mut view_config = match &config {
                Some(path) => matview_io::load_config(path)?,
                None => ViewConfig::default(),
            };
            if log {
                view_config.log_scale = true;
            }
            if let Some(colormap) = colormap {
                view_config.colormap = colormap.into();
            }

            let matrix = matview_io::load_matrix(&input)?;
            info!(
                "loaded {} ({}x{})",
                input.display(),
                matrix.width(),
                matrix.height()
            );
            let options = RenderOptions {
                width,
                height,
                zoom,
                center,
                z_max,
                cuts,
            };
            let surface = render(matrix, view_config, &options)?;
            surface.save_png(&output)?;

            println!(
                "Wrote {} ({}x{}) in {:.2?}",
                output.display(),
                width,
                height,
                start.elapsed()
            );
        }

        Commands::Info { input, json } => {
            let matrix = matview_io::load_matrix(&input)?;
            let nonzero = matrix.data().iter().filter(|&&v| v > 0.0).count();
            if json {
                let summary = serde_json::json!({
                    "file": input.display().to_string(),
                    "width": matrix.width(),
                    "height": matrix.height(),
                    "maximum": matrix.maximum(),
                    "total": matrix.total(),
                    "nonzero_bins": nonzero,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("File: {}", input.display());
                println!("Size: {} x {} bins", matrix.width(), matrix.height());
                println!("Maximum: {}", matrix.maximum());
                println!("Total: {}", matrix.total());
                println!("Non-zero bins: {nonzero}");
            }
        }
    }

    Ok(())
}
