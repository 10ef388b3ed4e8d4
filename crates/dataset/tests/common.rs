#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use ndarray::Array3;
use pictor_dataset::DatasetBatch;
use pictor_types::{ImageType, PriceRow};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
}

pub fn price_row(offset: u64, close: f64) -> PriceRow {
    PriceRow {
        date: start_date() + Days::new(offset),
        high: close + 1.0,
        low: close - 1.0,
        open: close - 0.5,
        close,
        volume: 1_000.0 + offset as f64,
        moving_averages: BTreeMap::from([(5, close)]),
    }
}

/// A batch of blank images with closes `closes`, all for `ticker`.
pub fn batch_with_closes(image_type: &ImageType, ticker: &str, closes: &[f64]) -> DatasetBatch {
    let mut batch = DatasetBatch::new();
    for (offset, &close) in closes.iter().enumerate() {
        let image = Array3::<f32>::zeros(image_type.image_shape());
        batch.push(image, &price_row(offset as u64, close), image_type.window_length, ticker);
    }
    batch
}

pub fn batch_of(image_type: &ImageType, rows: usize) -> DatasetBatch {
    let closes: Vec<f64> = (0..rows).map(|i| 10.0 + i as f64).collect();
    batch_with_closes(image_type, "TEST", &closes)
}

/// Daily history of `rows` rising bars.
pub fn history_csv(rows: usize) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for i in 0..rows {
        let date = start_date() + Days::new(i as u64);
        let close = 20.0 + i as f64;
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            date.format("%Y-%m-%d"),
            close - 0.5,
            close + 1.0,
            close - 1.5,
            close,
            close,
            5_000 + i * 10
        )
        .unwrap();
    }
    out
}

pub fn write_history(dir: &Path, ticker: &str, rows: usize) -> PathBuf {
    let path = dir.join(format!("{ticker}.csv"));
    std::fs::write(&path, history_csv(rows)).unwrap();
    path
}

pub fn write_corrupt(dir: &Path, ticker: &str) -> PathBuf {
    let path = dir.join(format!("{ticker}.csv"));
    std::fs::write(
        &path,
        "Date,Open,High,Low,Close,Adj Close,Volume\nsoon,1,2,0.5,1.5,1.5,100\n",
    )
    .unwrap();
    path
}
