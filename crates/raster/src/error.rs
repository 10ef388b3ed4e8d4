//! Raster error types.

use thiserror::Error;

/// Errors that can occur while rendering chart images.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The window does not hold exactly one image's worth of rows.
    #[error("window length mismatch: expected {expected} rows, got {actual}")]
    WindowLength {
        /// Rows required by the image type.
        expected: usize,
        /// Rows supplied.
        actual: usize,
    },

    /// The image type cannot be rendered.
    #[error("invalid image type: {0}")]
    InvalidImageType(#[from] pictor_types::CoreError),
}
