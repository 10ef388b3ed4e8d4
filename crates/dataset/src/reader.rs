//! Random access into a sealed dataset container.
//!
//! Scalar and text fields are loaded once on open. Images stay on disk and
//! are decoded one at a time from their row group.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, FixedSizeListArray, Float32Array, StringArray};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use ndarray::Array3;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pictor_types::ImageType;

use crate::error::DatasetError;
use crate::schema::{
    CLOSE, DATE, HIGH, IMAGES, LOW, MVG_AVERAGE, OPEN, SCALAR_FIELDS, TICKER, VOLUME,
    image_type_from_metadata,
};

/// One stored row, all fields at the same index.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow<'a> {
    /// Chart image
    pub image: Array3<f32>,
    /// High price
    pub high: f32,
    /// Low price
    pub low: f32,
    /// Open price
    pub open: f32,
    /// Close price
    pub close: f32,
    /// Volume
    pub volume: f32,
    /// Moving average
    pub mvg_average: f32,
    /// Date, `YYYY-MM-DD`
    pub date: &'a str,
    /// Ticker
    pub ticker: &'a str,
}

/// Lock-step view of a dataset container.
#[derive(Debug, Clone)]
pub struct DatasetReader {
    path: PathBuf,
    image_type: ImageType,
    row_group_starts: Vec<usize>,
    high: Vec<f32>,
    low: Vec<f32>,
    open: Vec<f32>,
    close: Vec<f32>,
    volume: Vec<f32>,
    mvg_average: Vec<f32>,
    date: Vec<String>,
    ticker: Vec<String>,
}

impl DatasetReader {
    /// Opens the container at `path`, loading every field except the images.
    ///
    /// # Errors
    /// - [`DatasetError::Io`] / [`DatasetError::Parquet`] when the file cannot be read.
    /// - [`DatasetError::Arrow`] when a field is missing.
    /// - [`DatasetError::Storage`] when columns or metadata are mistyped or
    ///   not aligned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let image_type = image_type_from_metadata(builder.schema().metadata())?;

        let mut row_group_starts = Vec::with_capacity(builder.metadata().num_row_groups());
        let mut rows = 0usize;
        for group in builder.metadata().row_groups() {
            row_group_starts.push(rows);
            rows += usize::try_from(group.num_rows()).map_err(|_| {
                DatasetError::Storage(format!("negative row count in {}", path.display()))
            })?;
        }

        let mut fields: Vec<&str> = SCALAR_FIELDS.to_vec();
        fields.extend([DATE, TICKER]);
        let mask = ProjectionMask::roots(
            builder.parquet_schema(),
            root_indices(builder.schema(), &fields)?,
        );
        let reader = builder.with_projection(mask).build()?;

        let mut dataset = Self {
            path,
            image_type,
            row_group_starts,
            high: Vec::with_capacity(rows),
            low: Vec::with_capacity(rows),
            open: Vec::with_capacity(rows),
            close: Vec::with_capacity(rows),
            volume: Vec::with_capacity(rows),
            mvg_average: Vec::with_capacity(rows),
            date: Vec::with_capacity(rows),
            ticker: Vec::with_capacity(rows),
        };
        for batch in reader {
            dataset.extend(&batch?)?;
        }
        dataset.check_alignment(rows)?;
        Ok(dataset)
    }

    fn extend(&mut self, batch: &RecordBatch) -> Result<(), DatasetError> {
        for (name, target) in [
            (HIGH, &mut self.high),
            (LOW, &mut self.low),
            (OPEN, &mut self.open),
            (CLOSE, &mut self.close),
            (VOLUME, &mut self.volume),
            (MVG_AVERAGE, &mut self.mvg_average),
        ] {
            target.extend_from_slice(column::<Float32Array>(batch, name)?.values());
        }
        for (name, target) in [(DATE, &mut self.date), (TICKER, &mut self.ticker)] {
            let strings = column::<StringArray>(batch, name)?;
            target.extend((0..strings.len()).map(|i| strings.value(i).to_string()));
        }
        Ok(())
    }

    fn check_alignment(&self, expected: usize) -> Result<(), DatasetError> {
        let lens = [
            (HIGH, self.high.len()),
            (LOW, self.low.len()),
            (OPEN, self.open.len()),
            (CLOSE, self.close.len()),
            (VOLUME, self.volume.len()),
            (MVG_AVERAGE, self.mvg_average.len()),
            (DATE, self.date.len()),
            (TICKER, self.ticker.len()),
        ];
        match lens.iter().find(|(_, len)| *len != expected) {
            Some((field, len)) => Err(DatasetError::Storage(format!(
                "field '{field}' holds {len} rows, row groups hold {expected}"
            ))),
            None => Ok(()),
        }
    }

    /// Row group and offset within it holding `index`.
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len() {
            return None;
        }
        let group = self
            .row_group_starts
            .partition_point(|&start| start <= index)
            .checked_sub(1)?;
        Some((group, index - self.row_group_starts[group]))
    }

    /// Container path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Image type recorded in the container.
    #[must_use]
    pub fn image_type(&self) -> &ImageType {
        &self.image_type
    }

    /// Rows in every field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.date.len()
    }

    /// Returns `true` if the container holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    /// Row groups in the container (one per append).
    #[must_use]
    pub fn num_row_groups(&self) -> usize {
        self.row_group_starts.len()
    }

    /// Decodes the image at `index`, `None` past the end.
    ///
    /// Only the images column of the row group holding `index` is read.
    ///
    /// # Errors
    /// IO, Parquet or Arrow failures, or [`DatasetError::Storage`] when the
    /// stored image does not match the recorded shape.
    pub fn image(&self, index: usize) -> Result<Option<Array3<f32>>, DatasetError> {
        let Some((group, offset)) = self.locate(index) else {
            return Ok(None);
        };

        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&self.path)?)?;
        let mask = ProjectionMask::roots(
            builder.parquet_schema(),
            root_indices(builder.schema(), &[IMAGES])?,
        );
        let mut reader = builder
            .with_row_groups(vec![group])
            .with_projection(mask)
            .with_offset(offset)
            .with_limit(1)
            .build()?;
        let batch = reader.next().transpose()?.ok_or_else(|| {
            DatasetError::Storage(format!("row {index} missing from row group {group}"))
        })?;

        let images = column::<FixedSizeListArray>(&batch, IMAGES)?;
        if images.is_empty() {
            return Err(DatasetError::Storage(format!("row {index} has no image")));
        }
        let values = images.value(0);
        let values = values
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| invalid_column(IMAGES))?;
        Array3::from_shape_vec(self.image_type.image_shape(), values.values().to_vec())
            .map(Some)
            .map_err(|e| DatasetError::Storage(format!("image {index}: {e}")))
    }

    /// Every field at `index`, `None` past the end.
    ///
    /// # Errors
    /// See [`DatasetReader::image`].
    pub fn row(&self, index: usize) -> Result<Option<DatasetRow<'_>>, DatasetError> {
        let Some(image) = self.image(index)? else {
            return Ok(None);
        };
        Ok(Some(DatasetRow {
            image,
            high: self.high[index],
            low: self.low[index],
            open: self.open[index],
            close: self.close[index],
            volume: self.volume[index],
            mvg_average: self.mvg_average[index],
            date: &self.date[index],
            ticker: &self.ticker[index],
        }))
    }

    /// Close prices, one per row.
    #[must_use]
    pub fn closes(&self) -> &[f32] {
        &self.close
    }

    /// Tickers, one per row.
    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.ticker
    }

    /// Dates, one per row.
    #[must_use]
    pub fn dates(&self) -> &[String] {
        &self.date
    }

    /// Indices usable as training examples for a `horizon`-step label.
    ///
    /// An index `i` qualifies when `i + horizon` is stored, both closes are
    /// finite, and both rows belong to the same ticker.
    #[must_use]
    pub fn horizon_indices(&self, horizon: usize) -> Vec<usize> {
        (0..self.len().saturating_sub(horizon))
            .filter(|&i| self.horizon_label(i, horizon).is_some())
            .collect()
    }

    /// `Some(true)` when the close `horizon` rows ahead is strictly higher.
    ///
    /// `None` when the pair is not a valid example (see
    /// [`DatasetReader::horizon_indices`]).
    #[must_use]
    pub fn horizon_label(&self, index: usize, horizon: usize) -> Option<bool> {
        let target = index.checked_add(horizon)?;
        let (now, later) = (*self.close.get(index)?, *self.close.get(target)?);
        if horizon == 0
            || !now.is_finite()
            || !later.is_finite()
            || self.ticker[index] != self.ticker[target]
        {
            return None;
        }
        Some(later > now)
    }
}

fn root_indices(schema: &Schema, names: &[&str]) -> Result<Vec<usize>, DatasetError> {
    names
        .iter()
        .map(|name| schema.index_of(name).map_err(DatasetError::from))
        .collect()
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, DatasetError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DatasetError::Storage(format!("missing column '{name}'")))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| invalid_column(name))
}

fn invalid_column(name: &str) -> DatasetError {
    DatasetError::Storage(format!("column '{name}' has an unexpected type"))
}
