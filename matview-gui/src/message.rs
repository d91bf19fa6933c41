//! Application message types for async communication.
//!
//! Matrix files are decoded on a worker thread; the result is sent to the
//! UI thread over a channel.

use std::path::PathBuf;
use std::time::Duration;

use matview_core::DenseMatrix;

/// Messages sent from background workers to the UI thread.
pub enum AppMessage {
    /// Matrix file loaded: matrix, source path and time taken.
    LoadComplete(Box<DenseMatrix>, PathBuf, Duration),

    /// Matrix file loading failed.
    LoadError(String),
}
