//! Named image configurations.
//!
//! An [`ImageType`] fixes how many candles go into one chart image and how tall
//! the image is. Types are looked up by name through an [`ImageTypeRegistry`],
//! so new combinations only need to be registered, not special-cased.

use std::collections::HashMap;

use crate::error::CoreError;

/// Number of channels in every chart image (price, trend, volume).
pub const IMAGE_CHANNELS: usize = 3;

/// Horizontal pixels used per candle.
pub const PIXELS_PER_CANDLE: usize = 3;

/// Immutable chart image configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ImageType {
    /// Registry key, e.g. `D5`
    pub name: String,
    /// Candles (rows) per image
    pub window_length: usize,
    /// Image height in pixels
    pub pixel_height: usize,
}

impl ImageType {
    /// Five daily candles on a 32 pixel high chart.
    pub const D5_NAME: &'static str = "D5";

    /// Creates a validated image type.
    ///
    /// # Errors
    /// [`CoreError::InvalidImageType`] when the window is empty or the image is
    /// less than two pixels high (no distinct low/high rows).
    pub fn new(
        name: impl Into<String>,
        window_length: usize,
        pixel_height: usize,
    ) -> Result<Self, CoreError> {
        let image_type = Self {
            name: name.into(),
            window_length,
            pixel_height,
        };
        image_type.validate()?;
        Ok(image_type)
    }

    /// The built-in `D5` type: 5 candles, 32 pixels high.
    #[must_use]
    pub fn d5() -> Self {
        Self {
            name: Self::D5_NAME.to_string(),
            window_length: 5,
            pixel_height: 32,
        }
    }

    /// Checks the parameter ranges.
    ///
    /// # Errors
    /// [`CoreError::InvalidImageType`] on an empty name, zero window or height < 2.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| CoreError::InvalidImageType {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.window_length == 0 {
            return Err(invalid("window_length must be > 0"));
        }
        if self.pixel_height < 2 {
            return Err(invalid("pixel_height must be >= 2"));
        }
        Ok(())
    }

    /// Image width in pixels.
    #[must_use]
    pub fn pixel_width(&self) -> usize {
        PIXELS_PER_CANDLE * self.window_length
    }

    /// Image shape as `(channels, height, width)`.
    #[must_use]
    pub fn image_shape(&self) -> (usize, usize, usize) {
        (IMAGE_CHANNELS, self.pixel_height, self.pixel_width())
    }

    /// Number of values in one flattened image.
    #[must_use]
    pub fn image_len(&self) -> usize {
        IMAGE_CHANNELS * self.pixel_height * self.pixel_width()
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} candles, {} px)",
            self.name, self.window_length, self.pixel_height
        )
    }
}

/// Error parsing an image type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseImageTypeError(pub String);

impl std::fmt::Display for ParseImageTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not a valid image type option", self.0)
    }
}

impl std::error::Error for ParseImageTypeError {}

impl std::str::FromStr for ImageType {
    type Err = ParseImageTypeError;

    /// Resolves a built-in image type by name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageTypeRegistry::with_defaults()
            .get(s)
            .map_err(|_| ParseImageTypeError(s.to_string()))
    }
}

/// Registry of image types keyed by upper-cased name.
#[derive(Debug, Clone, Default)]
pub struct ImageTypeRegistry {
    types: HashMap<String, ImageType>,
}

impl ImageTypeRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in image types.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.types.insert(ImageType::D5_NAME.to_string(), ImageType::d5());
        registry
    }

    /// Registers (or replaces) an image type.
    ///
    /// # Errors
    /// [`CoreError::InvalidImageType`] when the parameters are out of range.
    pub fn register(&mut self, image_type: ImageType) -> Result<(), CoreError> {
        image_type.validate()?;
        self.types
            .insert(image_type.name.to_uppercase(), image_type);
        Ok(())
    }

    /// Looks up an image type by name, ignoring case.
    ///
    /// # Errors
    /// [`CoreError::UnknownImageType`] if the name is not registered.
    pub fn get(&self, name: &str) -> Result<ImageType, CoreError> {
        self.types
            .get(&name.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| CoreError::UnknownImageType(name.to_string()))
    }

    /// Checks if an image type is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&name.trim().to_uppercase())
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.values().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}
