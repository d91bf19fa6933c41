//! Error types for matview-core.
//!
//! Rendering and cache operations are total and never return errors; the
//! only fallible entry points are the ones that accept user configuration.

use thiserror::Error;

/// Result type alias for matview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for matview operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A zoom factor that is zero, negative or not finite.
    #[error("invalid zoom factor: {0}")]
    InvalidZoom(f64),
}
