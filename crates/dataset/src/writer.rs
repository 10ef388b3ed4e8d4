//! Growable dataset container.
//!
//! A dataset lives in a single Parquet file. [`DatasetWriter::reset`] is the
//! initialize-empty phase: it truncates whatever was stored under the path.
//! After that the writer is append-only; every [`DatasetWriter::append`]
//! becomes one row group covering all fields, so fields can never drift apart.
//! [`DatasetWriter::finish`] seals the file; a writer dropped without it leaves
//! an unreadable container.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, FixedSizeListArray, Float32Array, StringArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use pictor_types::ImageType;
use pictor_types::config::DEFAULT_COMPRESSION_LEVEL;

use crate::batch::DatasetBatch;
use crate::error::DatasetError;
use crate::schema::{dataset_schema, image_item_field, image_list_size};

/// Container write options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Gzip level applied to every field
    pub compression_level: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Summary of a sealed container.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DatasetSummary {
    /// Container path
    pub path: PathBuf,
    /// Rows in every field
    pub rows: usize,
    /// Row groups written (one per non-empty append)
    pub appends: usize,
    /// Image type the images were rendered with
    pub image_type: ImageType,
}

/// Append-only writer over a freshly reset dataset container.
pub struct DatasetWriter {
    path: PathBuf,
    image_type: ImageType,
    schema: SchemaRef,
    writer: ArrowWriter<File>,
    rows: usize,
    appends: usize,
}

impl DatasetWriter {
    /// Creates an empty container at `path`, discarding previous contents.
    ///
    /// # Errors
    /// - [`DatasetError::Io`] when the file cannot be created.
    /// - [`DatasetError::Parquet`] for an invalid compression level.
    pub fn reset(
        path: impl AsRef<Path>,
        image_type: &ImageType,
        options: WriteOptions,
    ) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        image_type.validate()?;
        let schema: SchemaRef = Arc::new(dataset_schema(image_type)?);

        let props = WriterProperties::builder()
            .set_compression(Compression::GZIP(GzipLevel::try_new(
                options.compression_level,
            )?))
            .build();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        tracing::debug!(path = %path.display(), image_type = %image_type.name, "dataset reset");

        Ok(Self {
            path,
            image_type: image_type.clone(),
            schema,
            writer,
            rows: 0,
            appends: 0,
        })
    }

    /// Appends a batch to every field at once. Returns the rows added.
    ///
    /// An empty (but aligned) batch is a no-op. A misaligned batch is rejected
    /// before anything is written.
    ///
    /// # Errors
    /// - [`DatasetError::Alignment`] when the batch fields disagree.
    /// - [`DatasetError::Arrow`] / [`DatasetError::Parquet`] on encoding or IO failure.
    pub fn append(&mut self, batch: &DatasetBatch) -> Result<usize, DatasetError> {
        let rows = batch.check_alignment(&self.image_type)?;
        if rows == 0 {
            return Ok(0);
        }

        let record_batch = self.to_record_batch(batch)?;
        self.writer.write(&record_batch)?;
        self.writer.flush()?;

        self.rows += rows;
        self.appends += 1;
        tracing::debug!(rows, total = self.rows, "dataset append");
        Ok(rows)
    }

    /// Rows currently stored in every field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Returns `true` if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Container path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Image type of the stored images.
    #[must_use]
    pub fn image_type(&self) -> &ImageType {
        &self.image_type
    }

    /// Writes the footer and closes the container.
    ///
    /// # Errors
    /// [`DatasetError::Parquet`] when the footer cannot be written.
    pub fn finish(self) -> Result<DatasetSummary, DatasetError> {
        self.writer.close()?;
        Ok(DatasetSummary {
            path: self.path,
            rows: self.rows,
            appends: self.appends,
            image_type: self.image_type,
        })
    }

    fn to_record_batch(&self, batch: &DatasetBatch) -> Result<RecordBatch, DatasetError> {
        let mut pixels = Vec::with_capacity(batch.len() * self.image_type.image_len());
        for image in &batch.images {
            pixels.extend(image.iter().copied());
        }
        let images = FixedSizeListArray::try_new(
            image_item_field(),
            image_list_size(&self.image_type)?,
            Arc::new(Float32Array::from(pixels)),
            None,
        )?;

        let floats = |values: &[f32]| -> ArrayRef {
            Arc::new(Float32Array::from_iter_values(values.iter().copied()))
        };
        let columns: Vec<ArrayRef> = vec![
            Arc::new(images),
            floats(&batch.high),
            floats(&batch.low),
            floats(&batch.open),
            floats(&batch.close),
            floats(&batch.volume),
            floats(&batch.mvg_average),
            Arc::new(StringArray::from_iter_values(batch.date.iter())),
            Arc::new(StringArray::from_iter_values(batch.ticker.iter())),
        ];

        Ok(RecordBatch::try_new(self.schema.clone(), columns)?)
    }
}

impl std::fmt::Debug for DatasetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetWriter")
            .field("path", &self.path)
            .field("image_type", &self.image_type)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}
