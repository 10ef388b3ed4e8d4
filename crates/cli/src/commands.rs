//! Subcommand implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pictor_dataset::{BuildReport, DatasetBuilder, DatasetReader, ticker_from_path};
use pictor_types::BuildConfig;

/// Builds the dataset described by `config`, showing a progress bar unless
/// disabled.
pub fn create_dataset(config: &BuildConfig) -> Result<BuildReport> {
    let image_type = config.resolve_image_type()?;
    let files = config.input_files().context("listing input files")?;
    if files.is_empty() {
        tracing::warn!("no CSV files found; the dataset will be empty");
    }

    let progress = if config.logging.progress {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = DatasetBuilder::from_config(config).build_with_progress(
        &config.dataset_name,
        &files,
        &image_type,
        |path: &Path| {
            progress.set_message(ticker_from_path(path));
            progress.inc(1);
        },
    );
    progress.finish_and_clear();
    report.map_err(Into::into)
}

/// Contents summary of a dataset container.
#[derive(Debug, serde::Serialize)]
pub struct Inspection {
    /// Container path
    pub path: PathBuf,
    /// Rows in every field
    pub rows: usize,
    /// Image type name
    pub image_type: String,
    /// Image shape `(channels, height, width)`
    pub image_shape: (usize, usize, usize),
    /// Earliest and latest stored date
    pub date_range: Option<(String, String)>,
    /// Rows per ticker
    pub tickers: BTreeMap<String, usize>,
}

/// Reads a container and summarizes it.
pub fn inspect(path: &Path) -> Result<Inspection> {
    let reader =
        DatasetReader::open(path).with_context(|| format!("opening dataset {}", path.display()))?;

    let mut tickers = BTreeMap::new();
    for ticker in reader.tickers() {
        *tickers.entry(ticker.clone()).or_insert(0) += 1;
    }
    let date_range = reader
        .dates()
        .iter()
        .min()
        .zip(reader.dates().iter().max())
        .map(|(first, last)| (first.clone(), last.clone()));

    Ok(Inspection {
        path: path.to_path_buf(),
        rows: reader.len(),
        image_type: reader.image_type().name.clone(),
        image_shape: reader.image_type().image_shape(),
        date_range,
        tickers,
    })
}

/// Human-readable rendering of an [`Inspection`].
pub fn render_inspection(inspection: &Inspection) -> String {
    let (channels, height, width) = inspection.image_shape;
    let mut lines = vec![
        format!("dataset:    {}", inspection.path.display()),
        format!("rows:       {}", inspection.rows),
        format!(
            "image type: {} ({channels} x {height} x {width})",
            inspection.image_type
        ),
    ];
    if let Some((first, last)) = &inspection.date_range {
        lines.push(format!("dates:      {first} .. {last}"));
    }
    lines.push(format!("tickers:    {}", inspection.tickers.len()));
    for (ticker, rows) in &inspection.tickers {
        lines.push(format!("  {ticker:<12} {rows}"));
    }
    lines.join("\n")
}
