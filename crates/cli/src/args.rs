//! Command-line arguments.
//!
//! ```bash
//! # Build the "train" dataset from every CSV under ./prices
//! pictor create-dataset --source ./prices --dataset-name train --image-type D5
//!
//! # Same build, driven by a JSON config with a flag override
//! pictor create-dataset --config build.json --parallel
//!
//! # Summarize a container
//! pictor inspect ./train.parquet
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pictor_types::{AdjustmentMode, BuildConfig, FailurePolicy};

/// pictor: chart-image datasets from daily price histories
#[derive(Parser, Debug)]
#[command(name = "pictor")]
#[command(author, version, about = "Chart-image datasets from daily price histories")]
pub struct Args {
    /// Log filter used when RUST_LOG is unset (e.g. info, debug)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The action to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render every CSV history into a named dataset
    CreateDataset(CreateDatasetArgs),

    /// Print row count, image shape and per-ticker counts of a dataset
    Inspect {
        /// Dataset container (.parquet)
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments of `create-dataset`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CreateDatasetArgs {
    /// Directory scanned for *.csv files, one ticker per file
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Dataset name; the container becomes <output-dir>/<name>.parquet
    #[arg(short = 'n', long)]
    pub dataset_name: Option<String>,

    /// Image type name (e.g. D5)
    #[arg(short = 't', long)]
    pub image_type: Option<String>,

    /// Directory that receives the container
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// JSON build configuration; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Gzip level for every field
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=9))]
    pub compression_level: Option<u32>,

    /// Price adjustment: apply or raw
    #[arg(long)]
    pub adjustment: Option<AdjustmentMode>,

    /// Process files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Skip unreadable files instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Hide the progress bar and informational logs
    #[arg(short, long)]
    pub quiet: bool,

    /// Extra input files, processed after the scanned ones
    pub files: Vec<PathBuf>,
}

impl CreateDatasetArgs {
    /// Merges the optional config file with the flags.
    ///
    /// # Errors
    /// When the config file is unreadable, no name or input is given, or the
    /// merged configuration does not validate.
    pub fn into_config(self) -> Result<BuildConfig> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => match &self.dataset_name {
                Some(name) => BuildConfig::new(name.clone()),
                None => bail!("--dataset-name is required without --config"),
            },
        };

        if let Some(name) = self.dataset_name {
            config.dataset_name = name;
        }
        if let Some(source) = self.source {
            config.source_dir = Some(source);
        }
        if let Some(image_type) = self.image_type {
            config.image_type = image_type;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(level) = self.compression_level {
            config.compression_level = level;
        }
        if let Some(adjustment) = self.adjustment {
            config.adjustment = adjustment;
        }
        config.parallel |= self.parallel;
        if self.keep_going {
            config.failure_policy = FailurePolicy::Skip;
        }
        if self.quiet {
            config.logging.progress = false;
            config.logging.level = "warn".to_string();
        }
        config.files.extend(self.files);

        if config.source_dir.is_none() && config.files.is_empty() {
            bail!("no input: pass --source or CSV files");
        }
        config.validate()?;
        Ok(config)
    }
}
