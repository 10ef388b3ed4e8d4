//! Pictor Types
//!
//! Core data structures for the pictor chart-image pipeline.
//! This crate provides the preprocessed price row, the named image types,
//! build configuration, and the shared error type.

#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod image_type;
pub mod price_row;

// Re-export main types for convenience
pub use config::{AdjustmentMode, BuildConfig, FailurePolicy, LoggingConfig};
pub use error::CoreError;
pub use image_type::{ImageType, ImageTypeRegistry, ParseImageTypeError};
pub use price_row::PriceRow;
