//! Column-aligned append batches.

use ndarray::Array3;
use pictor_types::{ImageType, PriceRow};

use crate::error::DatasetError;
use crate::schema::{CLOSE, DATE, HIGH, IMAGES, LOW, MVG_AVERAGE, OPEN, TICKER, VOLUME};

/// Rows waiting to be appended, one entry per field per row.
///
/// Fields are public so callers can assemble batches column by column; the
/// writer rejects any batch whose fields disagree in length.
#[derive(Debug, Clone, Default)]
pub struct DatasetBatch {
    /// Chart images, each `(3, pixel_height, 3 * window_length)`
    pub images: Vec<Array3<f32>>,
    /// High prices
    pub high: Vec<f32>,
    /// Low prices
    pub low: Vec<f32>,
    /// Open prices
    pub open: Vec<f32>,
    /// Close prices
    pub close: Vec<f32>,
    /// Volumes
    pub volume: Vec<f32>,
    /// Moving averages
    pub mvg_average: Vec<f32>,
    /// Dates, `YYYY-MM-DD`
    pub date: Vec<String>,
    /// Tickers
    pub ticker: Vec<String>,
}

impl DatasetBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty batch with room for `capacity` rows per field.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            images: Vec::with_capacity(capacity),
            high: Vec::with_capacity(capacity),
            low: Vec::with_capacity(capacity),
            open: Vec::with_capacity(capacity),
            close: Vec::with_capacity(capacity),
            volume: Vec::with_capacity(capacity),
            mvg_average: Vec::with_capacity(capacity),
            date: Vec::with_capacity(capacity),
            ticker: Vec::with_capacity(capacity),
        }
    }

    /// Adds one image with the metadata of the window's last row.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, image: Array3<f32>, row: &PriceRow, window_length: usize, ticker: &str) {
        self.images.push(image);
        self.high.push(row.high as f32);
        self.low.push(row.low as f32);
        self.open.push(row.open as f32);
        self.close.push(row.close as f32);
        self.volume.push(row.volume as f32);
        self.mvg_average
            .push(row.moving_average(window_length) as f32);
        self.date.push(row.date_string());
        self.ticker.push(ticker.to_string());
    }

    /// Number of rows, taken from the images field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if the batch holds no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Per-field entry counts in container column order.
    #[must_use]
    pub fn field_lens(&self) -> [(&'static str, usize); 9] {
        [
            (IMAGES, self.images.len()),
            (HIGH, self.high.len()),
            (LOW, self.low.len()),
            (OPEN, self.open.len()),
            (CLOSE, self.close.len()),
            (VOLUME, self.volume.len()),
            (MVG_AVERAGE, self.mvg_average.len()),
            (DATE, self.date.len()),
            (TICKER, self.ticker.len()),
        ]
    }

    /// Checks that every field has the same length and every image the shape
    /// of `image_type`. Returns the common length.
    ///
    /// # Errors
    /// [`DatasetError::Alignment`] naming the first offending field.
    pub fn check_alignment(&self, image_type: &ImageType) -> Result<usize, DatasetError> {
        let expected = self.len();
        if let Some((field, actual)) = self
            .field_lens()
            .into_iter()
            .find(|(_, len)| *len != expected)
        {
            return Err(DatasetError::Alignment {
                field,
                expected,
                actual,
            });
        }

        let (channels, height, width) = image_type.image_shape();
        if let Some(image) = self
            .images
            .iter()
            .find(|image| image.dim() != (channels, height, width))
        {
            return Err(DatasetError::Alignment {
                field: IMAGES,
                expected: image_type.image_len(),
                actual: image.len(),
            });
        }
        Ok(expected)
    }
}
