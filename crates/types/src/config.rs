//! Dataset build configuration.

use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::image_type::{ImageType, ImageTypeRegistry};

/// Main dataset build configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BuildConfig {
    /// Dataset name; the container is written to `<output_dir>/<dataset_name>.parquet`
    pub dataset_name: String,
    /// Directory that receives the container
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory scanned for `*.csv` files (one ticker per file)
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    /// Explicit input files, processed after the scanned ones
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Name of the image type to render
    #[serde(default = "default_image_type")]
    pub image_type: String,
    /// Additional image types made available to `image_type`
    #[serde(default)]
    pub image_types: Vec<ImageType>,
    /// Gzip level applied to every field (1-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// Split/dividend adjustment handling
    #[serde(default)]
    pub adjustment: AdjustmentMode,
    /// Process files on a thread pool
    #[serde(default)]
    pub parallel: bool,
    /// What to do when one input file fails
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_image_type() -> String {
    ImageType::D5_NAME.to_string()
}

/// Default gzip level for dataset fields.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 4;

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

/// How the adjusted close is used to correct raw prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMode {
    /// Scale open/high/low/close by `adj_close / close` when both are usable.
    #[default]
    Apply,
    /// Keep raw prices; ignores the adjusted close entirely.
    Raw,
}

impl std::str::FromStr for AdjustmentMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "raw" => Ok(Self::Raw),
            other => Err(CoreError::Config(format!(
                "invalid adjustment mode '{other}' (expected apply or raw)"
            ))),
        }
    }
}

/// Per-file failure handling during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failing file aborts the build.
    #[default]
    Abort,
    /// Failing files are logged, reported and skipped.
    Skip,
}

/// Logging configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_logging_level")]
    pub level: String,
    /// Show a progress bar while building
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn default_progress() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            progress: default_progress(),
        }
    }
}

impl BuildConfig {
    /// Creates a configuration with defaults for everything but the name.
    #[must_use]
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            output_dir: default_output_dir(),
            source_dir: None,
            files: Vec::new(),
            image_type: default_image_type(),
            image_types: Vec::new(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            adjustment: AdjustmentMode::default(),
            parallel: false,
            failure_policy: FailurePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// - [`CoreError::Json`] when the JSON is malformed.
    /// - [`CoreError::Config`] / image type errors from [`BuildConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    /// IO errors plus everything [`BuildConfig::from_json`] returns.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validates names, ranges and the image type reference.
    ///
    /// # Errors
    /// [`CoreError::Config`] for invalid values, image type errors when
    /// `image_type` cannot be resolved.
    pub fn validate(&self) -> Result<(), CoreError> {
        let name = self.dataset_name.trim();
        if name.is_empty() {
            return Err(CoreError::Config("dataset_name is empty".to_string()));
        }
        if name.contains(['/', '\\']) {
            return Err(CoreError::Config(format!(
                "dataset_name '{name}' must not contain path separators"
            )));
        }
        if !(1..=9).contains(&self.compression_level) {
            return Err(CoreError::Config(format!(
                "compression_level must be within 1..=9, got {}",
                self.compression_level
            )));
        }
        self.resolve_image_type()?;
        Ok(())
    }

    /// Registry with the built-in types plus the configured extras.
    ///
    /// # Errors
    /// [`CoreError::InvalidImageType`] for an out-of-range extra type.
    pub fn registry(&self) -> Result<ImageTypeRegistry, CoreError> {
        let mut registry = ImageTypeRegistry::with_defaults();
        for image_type in &self.image_types {
            registry.register(image_type.clone())?;
        }
        Ok(registry)
    }

    /// Resolves `image_type` against [`BuildConfig::registry`].
    ///
    /// # Errors
    /// [`CoreError::UnknownImageType`] if the name is not registered.
    pub fn resolve_image_type(&self) -> Result<ImageType, CoreError> {
        self.registry()?.get(&self.image_type)
    }

    /// Path of the dataset container.
    #[must_use]
    pub fn container_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.parquet", self.dataset_name.trim()))
    }

    /// Input files: `*.csv` in `source_dir` (sorted by name), then `files`.
    ///
    /// # Errors
    /// [`CoreError::Io`] when the source directory cannot be listed.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, CoreError> {
        let mut inputs = Vec::new();
        if let Some(dir) = &self.source_dir {
            let mut scanned = Vec::new();
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                    scanned.push(path);
                }
            }
            scanned.sort();
            inputs.extend(scanned);
        }
        inputs.extend(self.files.iter().cloned());
        Ok(inputs)
    }
}
