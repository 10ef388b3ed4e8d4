//! Pictor Dataset
//!
//! Column-aligned chart-image datasets stored as Parquet, plus the pipeline
//! that fills them from per-ticker CSV histories.
//!
//! ## Lifecycle
//!
//! 1. [`DatasetWriter::reset`] creates an empty container, discarding any
//!    previous dataset under the same name.
//! 2. [`DatasetWriter::append`] extends every field by the same count.
//! 3. [`DatasetWriter::finish`] seals the container.
//! 4. [`DatasetReader::open`] serves rows by index in lock-step.
//!
//! [`DatasetBuilder`] drives the whole sequence for a set of input files.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// In-memory append batches.
pub mod batch;
/// Build pipeline and report.
pub mod builder;
/// Dataset error types.
pub mod error;
/// Container reader and horizon labelling.
pub mod reader;
/// Field names and Arrow schema.
pub mod schema;
/// Append-only container writer.
pub mod writer;

/// Re-export: append batch.
pub use batch::DatasetBatch;
/// Re-export: build pipeline.
pub use builder::{
    BuildOptions, BuildReport, DatasetBuilder, SkippedFile, process_file, run_build,
    run_build_from_json, ticker_from_path,
};
/// Re-export: dataset error type.
pub use error::DatasetError;
/// Re-export: container reader.
pub use reader::{DatasetReader, DatasetRow};
/// Re-export: container writer.
pub use writer::{DatasetSummary, DatasetWriter, WriteOptions};
