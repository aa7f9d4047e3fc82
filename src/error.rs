//! Error types for tree loading and layout configuration.

use thiserror::Error;

/// Result type for treemap operations.
pub type Result<T> = std::result::Result<T, TreemapError>;

/// Errors that can occur while building trees or configuring a layout.
#[derive(Error, Debug)]
pub enum TreemapError {
    /// Layout size is negative or not finite.
    #[error("invalid layout size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },

    /// Aspect ratio target is not a finite positive number.
    #[error("invalid aspect ratio {0}")]
    InvalidRatio(f64),

    /// Padding contains a negative or non-finite side.
    #[error("invalid padding {0:?}")]
    InvalidPadding([f64; 4]),

    /// Tree input could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
