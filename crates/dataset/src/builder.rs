//! Dataset build pipeline: files -> preprocess -> rasterize -> append.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pictor_data::{RowPreprocessor, check_chronological, load_raw_rows, validate_price_rows};
use pictor_raster::Rasterizer;
use pictor_types::{AdjustmentMode, BuildConfig, CoreError, FailurePolicy, ImageType};
use rayon::prelude::*;

use crate::batch::DatasetBatch;
use crate::error::DatasetError;
use crate::writer::{DatasetWriter, WriteOptions};

/// Knobs for [`DatasetBuilder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Container write options
    pub write: WriteOptions,
    /// Price adjustment mode
    pub adjustment: AdjustmentMode,
    /// Process files on the rayon pool
    pub parallel: bool,
    /// What to do when a file cannot be ingested
    pub failure_policy: FailurePolicy,
}

/// An input file left out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedFile {
    /// Input path
    pub path: PathBuf,
    /// Error text
    pub error: String,
}

/// Outcome of a dataset build.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BuildReport {
    /// Dataset name
    pub dataset_name: String,
    /// Container path
    pub path: PathBuf,
    /// Image type name
    pub image_type: String,
    /// Rows in every field of the sealed container
    pub rows: usize,
    /// Files that contributed to the dataset
    pub files_processed: usize,
    /// Images appended
    pub images_written: usize,
    /// Files left out under [`FailurePolicy::Skip`]
    pub skipped: Vec<SkippedFile>,
}

impl BuildReport {
    fn new(dataset_name: &str, path: PathBuf, image_type: &ImageType) -> Self {
        Self {
            dataset_name: dataset_name.to_string(),
            path,
            image_type: image_type.name.clone(),
            rows: 0,
            files_processed: 0,
            images_written: 0,
            skipped: Vec::new(),
        }
    }

    fn settle(
        &mut self,
        file: &Path,
        outcome: Result<usize, DatasetError>,
        policy: FailurePolicy,
    ) -> Result<(), DatasetError> {
        match outcome {
            Ok(images) => {
                self.files_processed += 1;
                self.images_written += images;
                tracing::info!(file = %file.display(), images, "file processed");
                Ok(())
            }
            Err(err) if policy == FailurePolicy::Skip && err.is_input_error() => {
                tracing::warn!(file = %file.display(), error = %err, "skipping file");
                self.skipped.push(SkippedFile {
                    path: file.to_path_buf(),
                    error: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Builds named datasets under an output directory.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    output_dir: PathBuf,
    options: BuildOptions,
}

impl DatasetBuilder {
    /// Creates a builder writing to `output_dir` with default options.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            options: BuildOptions::default(),
        }
    }

    /// Replaces the build options.
    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder matching a [`BuildConfig`].
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(&config.output_dir).with_options(BuildOptions {
            write: WriteOptions {
                compression_level: config.compression_level,
            },
            adjustment: config.adjustment,
            parallel: config.parallel,
            failure_policy: config.failure_policy,
        })
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Container path for `dataset_name`.
    #[must_use]
    pub fn container_path(&self, dataset_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.parquet", dataset_name.trim()))
    }

    /// Builds `dataset_name` from `files`, one ticker per file.
    ///
    /// Any existing dataset under the same name is discarded first.
    ///
    /// # Errors
    /// - [`DatasetError::Config`] for an empty or path-like name or an invalid image type.
    /// - [`DatasetError::Input`] / [`DatasetError::Raster`] for a failing file
    ///   under [`FailurePolicy::Abort`].
    /// - Storage errors from [`DatasetWriter`], regardless of policy.
    pub fn build(
        &self,
        dataset_name: &str,
        files: &[PathBuf],
        image_type: &ImageType,
    ) -> Result<BuildReport, DatasetError> {
        self.build_with_progress(dataset_name, files, image_type, |_| {})
    }

    /// Like [`DatasetBuilder::build`], calling `on_file` as each file starts.
    ///
    /// # Errors
    /// See [`DatasetBuilder::build`].
    pub fn build_with_progress<F>(
        &self,
        dataset_name: &str,
        files: &[PathBuf],
        image_type: &ImageType,
        on_file: F,
    ) -> Result<BuildReport, DatasetError>
    where
        F: Fn(&Path) + Sync,
    {
        let name = dataset_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(CoreError::Config(format!("invalid dataset name '{dataset_name}'")).into());
        }

        let path = self.container_path(name);
        let rasterizer = Rasterizer::new(image_type.clone())?;
        let preprocessor = RowPreprocessor::new([image_type.window_length])
            .with_adjustment(self.options.adjustment);
        let policy = self.options.failure_policy;

        tracing::info!(
            dataset = name,
            path = %path.display(),
            image_type = %image_type.name,
            files = files.len(),
            parallel = self.options.parallel,
            "building dataset"
        );

        let mut writer = DatasetWriter::reset(&path, image_type, self.options.write)?;
        let mut report = BuildReport::new(name, path, image_type);

        if self.options.parallel {
            let shared = Mutex::new(writer);
            let outcomes: Vec<Result<usize, DatasetError>> = files
                .par_iter()
                .map(|file| {
                    on_file(file);
                    let batch = process_file(file, &preprocessor, &rasterizer)?;
                    shared.lock().map_err(|_| poisoned())?.append(&batch)
                })
                .collect();
            writer = shared.into_inner().map_err(|_| poisoned())?;
            for (file, outcome) in files.iter().zip(outcomes) {
                report.settle(file, outcome, policy)?;
            }
        } else {
            for file in files {
                on_file(file);
                let outcome = process_file(file, &preprocessor, &rasterizer)
                    .and_then(|batch| writer.append(&batch));
                report.settle(file, outcome, policy)?;
            }
        }

        let summary = writer.finish()?;
        report.rows = summary.rows;

        tracing::info!(
            dataset = name,
            rows = report.rows,
            files = report.files_processed,
            skipped = report.skipped.len(),
            "dataset built"
        );
        Ok(report)
    }
}

fn poisoned() -> DatasetError {
    DatasetError::Storage("dataset writer lock poisoned".to_string())
}

/// Ticker symbol for an input file: its base name without extension.
#[must_use]
pub fn ticker_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads, preprocesses and rasterizes one ticker's history.
///
/// Each image is paired with the last row of its window.
///
/// # Errors
/// [`DatasetError::Input`] when the file cannot be read or parsed, or a
/// preprocessed row breaks the OHLC ordering.
pub fn process_file(
    path: &Path,
    preprocessor: &RowPreprocessor,
    rasterizer: &Rasterizer,
) -> Result<DatasetBatch, DatasetError> {
    let input_error = |source| DatasetError::Input {
        path: path.display().to_string(),
        source,
    };
    let raw = load_raw_rows(path).map_err(input_error)?;
    let rows = preprocessor.process(&raw).map_err(input_error)?;
    validate_price_rows(&rows).map_err(input_error)?;

    let out_of_order = check_chronological(&rows);
    if let Some(first) = out_of_order.first() {
        tracing::warn!(
            file = %path.display(),
            rows = out_of_order.len(),
            first = *first,
            "dates not strictly increasing"
        );
    }

    let ticker = ticker_from_path(path);
    let window_length = rasterizer.image_type().window_length;
    let mut batch = DatasetBatch::with_capacity((rows.len() + 1).saturating_sub(window_length));
    for (image, last) in rasterizer.images(&rows) {
        batch.push(image, last, window_length, &ticker);
    }
    tracing::debug!(file = %path.display(), rows = rows.len(), images = batch.len(), "file rasterized");
    Ok(batch)
}

/// Runs a build described by a validated [`BuildConfig`].
///
/// # Errors
/// Configuration errors plus everything [`DatasetBuilder::build`] returns.
pub fn run_build(config: &BuildConfig) -> Result<BuildReport, DatasetError> {
    config.validate()?;
    let image_type = config.resolve_image_type()?;
    let files = config.input_files()?;
    DatasetBuilder::from_config(config).build(&config.dataset_name, &files, &image_type)
}

/// Main entry point: receives config JSON, returns the build report as JSON.
///
/// # Errors
/// - [`DatasetError::Config`] when the JSON is malformed or invalid.
/// - [`DatasetError::ReportSerialize`] when the report cannot be encoded.
/// - Everything [`run_build`] returns.
pub fn run_build_from_json(config_json: &str) -> Result<String, DatasetError> {
    let config = BuildConfig::from_json(config_json)?;
    let report = run_build(&config)?;
    serde_json::to_string(&report).map_err(|e| DatasetError::ReportSerialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_from_path() {
        assert_eq!(ticker_from_path(Path::new("/data/AAPL.csv")), "AAPL");
        assert_eq!(ticker_from_path(Path::new("BRK.B.csv")), "BRK.B");
        assert_eq!(ticker_from_path(Path::new("MSFT")), "MSFT");
    }

    #[test]
    fn test_container_path() {
        let builder = DatasetBuilder::new("/tmp/out");
        assert_eq!(
            builder.container_path(" train "),
            PathBuf::from("/tmp/out/train.parquet")
        );
    }

    #[test]
    fn test_from_config_copies_options() {
        let mut config = BuildConfig::new("train");
        config.compression_level = 7;
        config.parallel = true;
        config.failure_policy = FailurePolicy::Skip;
        config.adjustment = AdjustmentMode::Raw;

        let builder = DatasetBuilder::from_config(&config);
        assert_eq!(builder.options().write.compression_level, 7);
        assert!(builder.options().parallel);
        assert_eq!(builder.options().failure_policy, FailurePolicy::Skip);
        assert_eq!(builder.options().adjustment, AdjustmentMode::Raw);
    }

    #[test]
    fn test_process_file_pairs_images_with_last_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("XYZ.csv");
        std::fs::write(
            &path,
            "Date,Open,High,Low,Close,Volume\n\
             2024-02-01,10,12,9,11,100\n\
             2024-02-02,11,13,10,12,120\n\
             2024-02-05,12,12.5,8,9,90\n\
             2024-02-06,9,10,8.5,9.5,\n\
             2024-02-07,9.5,11,9,10.5,150\n\
             2024-02-08,10.5,12,10,11.5,160\n",
        )
        .unwrap();

        let image_type = ImageType::d5();
        let batch = process_file(
            &path,
            &RowPreprocessor::new([image_type.window_length]),
            &Rasterizer::new(image_type.clone()).unwrap(),
        )
        .unwrap();

        assert_eq!(batch.check_alignment(&image_type).unwrap(), 2);
        assert_eq!(batch.date, ["2024-02-07", "2024-02-08"]);
        assert_eq!(batch.ticker, ["XYZ", "XYZ"]);
        assert_eq!(batch.close, [10.5, 11.5]);
        assert!(batch.high.iter().zip(&batch.low).all(|(h, l)| h >= l));
    }

    #[test]
    fn test_process_file_reports_path_on_bad_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BAD.csv");
        std::fs::write(&path, "Date,Close\n2024-02-01,1\nnope,2\n").unwrap();

        let image_type = ImageType::d5();
        let err = process_file(
            &path,
            &RowPreprocessor::new([5]),
            &Rasterizer::new(image_type).unwrap(),
        )
        .unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("Malformed row 2"));
    }

    #[test]
    fn test_rejects_path_like_name() {
        let dir = tempfile::tempdir().unwrap();
        let builder = DatasetBuilder::new(dir.path());
        let err = builder.build("../escape", &[], &ImageType::d5()).unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }
}
