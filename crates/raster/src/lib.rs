//! Pictor Raster
//!
//! Chart image rendering for windows of preprocessed price rows.
//!
//! # Image layout
//! Every image is an `(3, pixel_height, 3 * window_length)` array of `f32`
//! holding 0 or 1. Channel 0 draws prices, channel 1 the moving-average trend,
//! channel 2 volume. Each row of the window owns a 3-pixel-wide block; height
//! index 0 is the bottom of the chart (lowest price / zero volume).

#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod rasterizer;
pub mod scale;

// Re-export main types
pub use error::RasterError;
pub use rasterizer::{PRICE_CHANNEL, Rasterizer, TREND_CHANNEL, VOLUME_CHANNEL};
pub use scale::{Scale, WindowRange};
