//! Error types for the adaptive median filter.

use thiserror::Error;

/// Errors reported by the filter before any pixel is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: {width}x{height} image needs {expected} pixels, got {len}", expected = .width * .height)]
    DimensionMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
