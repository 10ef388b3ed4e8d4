//! Data-layer error types.

use thiserror::Error;

/// Errors that can occur while loading or preprocessing price rows.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required file was not found on disk.
    #[error("File not found: {0} ({1})")]
    FileNotFound(String, String),

    /// CSV parsing or decoding failed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A row carries no usable date.
    #[error("Malformed row {row}: cannot parse date {value:?}")]
    MalformedRow {
        /// One-based record number within its file (header excluded).
        row: usize,
        /// Raw date text (empty when the field is missing).
        value: String,
    },

    /// Data violated a row invariant.
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}
