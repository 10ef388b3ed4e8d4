//! Pictor Data
//!
//! CSV ingestion, row repair/normalization, and streaming moving averages.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Data-layer error types.
pub mod error;
/// CSV loading into raw text rows.
pub mod loader;
/// Streaming NaN-aware moving average.
pub mod moving_average;
/// Raw row to `PriceRow` conversion.
pub mod preprocess;
/// Ordering and OHLC checks on preprocessed rows.
pub mod validation;

/// Re-export: data-layer error type.
pub use error::DataError;
/// Re-export: raw text row.
pub use loader::RawRow;
/// Re-export: load raw rows from a CSV file.
pub use loader::load_raw_rows;
/// Re-export: load raw rows from any reader.
pub use loader::read_raw_rows;
/// Re-export: streaming moving average.
pub use moving_average::MovingAverage;
/// Re-export: row preprocessor.
pub use preprocess::RowPreprocessor;
/// Re-export: preprocess with default settings.
pub use preprocess::preprocess_rows;
/// Re-export: date-order check.
pub use validation::check_chronological;
/// Re-export: OHLC invariant check.
pub use validation::validate_price_rows;
