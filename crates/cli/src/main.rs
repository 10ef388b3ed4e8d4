//! pictor command-line interface
//!
//! Builds chart-image datasets from per-ticker CSV price histories and
//! summarizes existing datasets.

#![deny(clippy::all)]

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use crate::args::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::CreateDataset(create) => {
            let config = create.into_config()?;
            let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
            logging::setup_logging(level);

            let report = commands::create_dataset(&config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Inspect { path, json } => {
            logging::setup_logging(args.log_level.as_deref().unwrap_or("warn"));

            let inspection = commands::inspect(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                println!("{}", commands::render_inspection(&inspection));
            }
        }
    }
    Ok(())
}
