//! matview-io: file formats for matview.
//!
//! Matrix readers (text and TIFF, memory-mapped via memmap2), matrix
//! writers, JSON persistence of cuts and view configuration, and an
//! off-screen [`SnapshotSurface`] for rendering views to PNG.
//!

mod cuts;
mod error;
mod reader;
mod snapshot;
mod writer;

pub use cuts::{load_config, load_cuts, save_cuts, CutFile};
pub use error::{Error, Result};
pub use reader::{decode_tiff, load_matrix, parse_text, MappedFileReader, MatrixFormat};
pub use snapshot::SnapshotSurface;
pub use writer::{save_matrix_text, save_matrix_tiff};
