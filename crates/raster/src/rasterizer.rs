//! Window-to-image rendering.

use ndarray::Array3;
use pictor_types::image_type::{IMAGE_CHANNELS, PIXELS_PER_CANDLE};
use pictor_types::{ImageType, PriceRow};

use crate::error::RasterError;
use crate::scale::{Scale, WindowRange};

/// Channel holding the high-low bars and open/close marks.
pub const PRICE_CHANNEL: usize = 0;
/// Channel holding the moving-average trend line.
pub const TREND_CHANNEL: usize = 1;
/// Channel holding the volume bars.
pub const VOLUME_CHANNEL: usize = 2;

// Column offsets inside a row's 3-pixel block.
const LEFT: usize = 0;
const CENTER: usize = 1;
const RIGHT: usize = 2;

/// Renders windows of rows for one [`ImageType`].
#[derive(Debug, Clone)]
pub struct Rasterizer {
    image_type: ImageType,
}

impl Rasterizer {
    /// Creates a rasterizer for a validated image type.
    ///
    /// # Errors
    /// [`RasterError::InvalidImageType`] if the parameters are out of range.
    pub fn new(image_type: ImageType) -> Result<Self, RasterError> {
        image_type.validate()?;
        Ok(Self { image_type })
    }

    /// The image type being rendered.
    #[must_use]
    pub fn image_type(&self) -> &ImageType {
        &self.image_type
    }

    /// Renders one full window.
    ///
    /// # Errors
    /// [`RasterError::WindowLength`] unless `window` holds exactly
    /// `window_length` rows.
    pub fn rasterize(&self, window: &[PriceRow]) -> Result<Array3<f32>, RasterError> {
        if window.len() != self.image_type.window_length {
            return Err(RasterError::WindowLength {
                expected: self.image_type.window_length,
                actual: window.len(),
            });
        }
        Ok(self.render(window))
    }

    /// Renders every full window of `rows`, pairing each image with the
    /// window's last row.
    ///
    /// A history of `n` rows yields `n - window_length + 1` images (none when
    /// shorter than one window).
    pub fn images<'a>(
        &'a self,
        rows: &'a [PriceRow],
    ) -> impl Iterator<Item = (Array3<f32>, &'a PriceRow)> + 'a {
        rows.windows(self.image_type.window_length)
            .filter_map(move |window| window.last().map(|last| (self.render(window), last)))
    }

    fn render(&self, window: &[PriceRow]) -> Array3<f32> {
        let height = self.image_type.pixel_height;
        let window_length = self.image_type.window_length;
        let mut image = Array3::<f32>::zeros(self.image_type.image_shape());

        let range = WindowRange::of(window, window_length);
        let price_scale = range.price_scale(height);
        let volume_scale = range.volume_scale(height);

        for (index, row) in window.iter().enumerate() {
            let mut block = Block {
                image: &mut image,
                offset: index * PIXELS_PER_CANDLE,
            };

            if let Some(scale) = price_scale {
                block.draw_price(row, scale);

                let prior = index
                    .checked_sub(1)
                    .map_or(f64::NAN, |i| window[i].moving_average(window_length));
                let next = window
                    .get(index + 1)
                    .map_or(f64::NAN, |r| r.moving_average(window_length));
                block.draw_trend(prior, row.moving_average(window_length), next, scale);
            }

            if let Some(scale) = volume_scale {
                block.draw_volume(row.volume, scale);
            }
        }

        debug_assert_eq!(image.shape()[0], IMAGE_CHANNELS);
        image
    }
}

/// One row's 3-pixel-wide slice of the image.
struct Block<'a> {
    image: &'a mut Array3<f32>,
    offset: usize,
}

impl Block<'_> {
    fn set(&mut self, channel: usize, cell: usize, column: usize) {
        self.image[[channel, cell, self.offset + column]] = 1.0;
    }

    fn fill(&mut self, channel: usize, cells: std::ops::Range<usize>, column: usize) {
        for cell in cells {
            self.set(channel, cell, column);
        }
    }

    /// High-low bar in the center column, open and close marks on the left.
    fn draw_price(&mut self, row: &PriceRow, scale: Scale) {
        if row.low.is_finite() && row.high.is_finite() {
            self.fill(PRICE_CHANNEL, scale.cell(row.low)..scale.cell(row.high), CENTER);
        }
        for mark in [row.open, row.close] {
            if mark.is_finite() {
                self.set(PRICE_CHANNEL, scale.cell(mark), LEFT);
            }
        }
    }

    /// Moving-average point plus one-third steps towards its neighbours.
    fn draw_trend(&mut self, prior: f64, current: f64, next: f64, scale: Scale) {
        if !current.is_finite() {
            return;
        }
        if prior.is_finite() {
            let step = (current - prior) / 3.0;
            self.set(TREND_CHANNEL, scale.cell(current - step), LEFT);
        }
        self.set(TREND_CHANNEL, scale.cell(current), CENTER);
        if next.is_finite() {
            let step = (next - current) / 3.0;
            self.set(TREND_CHANNEL, scale.cell(current + step), RIGHT);
        }
    }

    /// Bar rising from the bottom row in the right column.
    fn draw_volume(&mut self, volume: f64, scale: Scale) {
        if volume.is_finite() {
            self.fill(VOLUME_CHANNEL, 0..scale.cell(volume), RIGHT);
        }
    }
}
