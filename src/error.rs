//! Error types for gog-render operations.
//!
//! Only the fallible surfaces (file output, configuration, registries) return
//! [`Error`]. Degenerate axes and non-finite data are represented as values:
//! invalid maps and `None` coordinates, which renderers skip silently.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gog-render operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// Invalid dimensions for a raster or vector surface.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Data length mismatch between two parallel vectors.
    #[error("Data length mismatch: x has {x_len} elements, y has {y_len} elements")]
    DataLengthMismatch {
        /// Length of x data.
        x_len: usize,
        /// Length of y data.
        y_len: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// A color map has no stop at bin 0 or its bins are not increasing.
    #[error("Invalid color map: {0}")]
    InvalidColorMap(String),

    /// Lookup of an unknown id in a registry.
    #[error("Unknown {kind} id: {id}")]
    UnknownId {
        /// Registry kind ("color map", "plot family").
        kind: &'static str,
        /// Requested id.
        id: String,
    },
}
