//! Dataset error types.

use thiserror::Error;

/// Errors that can occur while writing, reading or building datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// An append batch whose fields disagree in length or shape.
    #[error("alignment error: field '{field}' has {actual} entries, expected {expected}")]
    Alignment {
        /// Offending field.
        field: &'static str,
        /// Entries required to stay aligned.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },

    /// Container contents or state are unusable.
    #[error("storage error: {0}")]
    Storage(String),

    /// Parquet encoding/decoding failure.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow array construction failure.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file could not be ingested.
    #[error("input {path}: {source}")]
    Input {
        /// Input file path.
        path: String,
        /// Underlying ingestion error.
        #[source]
        source: pictor_data::DataError,
    },

    /// Rendering failure.
    #[error("raster error: {0}")]
    Raster(#[from] pictor_raster::RasterError),

    /// Configuration or image type error.
    #[error("config error: {0}")]
    Config(#[from] pictor_types::CoreError),

    /// Build report serialization failure.
    #[error("report serialization error: {0}")]
    ReportSerialize(String),
}

impl DatasetError {
    /// Returns true if the error is confined to one input file.
    ///
    /// Such errors may be skipped under `FailurePolicy::Skip`; everything else
    /// leaves the container in an unknown state.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, DatasetError::Input { .. } | DatasetError::Raster(_))
    }
}
