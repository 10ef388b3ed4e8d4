//! Raw row repair and normalization.
//!
//! Turns text rows into [`PriceRow`]s: dates are parsed, prices coerced to
//! floats (NaN when unusable), scaled by the split/dividend adjustment factor,
//! high/low recomputed, and one moving average per requested window attached.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pictor_types::{AdjustmentMode, PriceRow};

use crate::error::DataError;
use crate::loader::RawRow;
use crate::moving_average::MovingAverage;

const DATE_KEYS: &[&str] = &["Date", "date"];
const OPEN_KEYS: &[&str] = &["Open", "open"];
const HIGH_KEYS: &[&str] = &["High", "high"];
const LOW_KEYS: &[&str] = &["Low", "low"];
const CLOSE_KEYS: &[&str] = &["Close", "close"];
const ADJ_CLOSE_KEYS: &[&str] = &["Adj Close", "adjclose"];
const VOLUME_KEYS: &[&str] = &["Volume", "volume"];

/// Converts ordered raw rows into preprocessed price rows.
#[derive(Debug, Clone)]
pub struct RowPreprocessor {
    window_lengths: Vec<usize>,
    adjustment: AdjustmentMode,
}

impl RowPreprocessor {
    /// Creates a preprocessor computing one moving average per window length.
    ///
    /// Duplicate lengths are collapsed.
    #[must_use]
    pub fn new(window_lengths: impl IntoIterator<Item = usize>) -> Self {
        let mut window_lengths: Vec<usize> = window_lengths.into_iter().collect();
        window_lengths.sort_unstable();
        window_lengths.dedup();
        Self {
            window_lengths,
            adjustment: AdjustmentMode::default(),
        }
    }

    /// Sets the adjustment mode.
    #[must_use]
    pub fn with_adjustment(mut self, adjustment: AdjustmentMode) -> Self {
        self.adjustment = adjustment;
        self
    }

    /// Moving-average window lengths, ascending.
    #[must_use]
    pub fn window_lengths(&self) -> &[usize] {
        &self.window_lengths
    }

    /// Processes one ticker's rows in chronological order.
    ///
    /// Every call starts from fresh moving-average state.
    ///
    /// # Errors
    /// [`DataError::MalformedRow`] for the first row whose date cannot be parsed.
    pub fn process(&self, rows: &[RawRow]) -> Result<Vec<PriceRow>, DataError> {
        let mut moving_averages: Vec<MovingAverage> = self
            .window_lengths
            .iter()
            .map(|&d| MovingAverage::new(d))
            .collect();

        let mut processed = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let date = row_date(row, index)?;

            let factor = adjustment_factor(row, self.adjustment);
            let recorded_high = coerce_float(row.first_of(HIGH_KEYS)) * factor;
            let recorded_low = coerce_float(row.first_of(LOW_KEYS)) * factor;
            let open = coerce_float(row.first_of(OPEN_KEYS)) * factor;
            let close = coerce_float(row.first_of(CLOSE_KEYS)) * factor;
            let volume = coerce_float(row.first_of(VOLUME_KEYS));

            // Upstream highs/lows are not trusted to bound open/close.
            let (high, low) = high_low(&[recorded_low, recorded_high, close, open]);

            let mut averages = BTreeMap::new();
            for ma in &mut moving_averages {
                ma.add(close);
                averages.insert(ma.duration(), ma.get());
            }

            processed.push(PriceRow {
                date,
                high,
                low,
                open,
                close,
                volume,
                moving_averages: averages,
            });
        }
        tracing::debug!(
            rows = processed.len(),
            window_lengths = ?self.window_lengths,
            adjustment = ?self.adjustment,
            "rows preprocessed"
        );
        Ok(processed)
    }
}

/// Preprocesses rows with the default adjustment mode.
///
/// # Errors
/// [`DataError::MalformedRow`] for the first row whose date cannot be parsed.
pub fn preprocess_rows(
    rows: &[RawRow],
    window_lengths: impl IntoIterator<Item = usize>,
) -> Result<Vec<PriceRow>, DataError> {
    RowPreprocessor::new(window_lengths).process(rows)
}

fn row_date(row: &RawRow, index: usize) -> Result<NaiveDate, DataError> {
    let value = row.first_of(DATE_KEYS).unwrap_or_default();
    parse_date(value).ok_or_else(|| DataError::MalformedRow {
        row: index + 1,
        value: value.to_string(),
    })
}

/// Parses `YYYY-MM-DD`, falling back to ISO-8601 date-times.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Parses a numeric cell, NaN when missing or unparseable.
#[must_use]
pub fn coerce_float(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Multiplier turning raw prices into split/dividend adjusted prices.
///
/// Only computed when both closes are finite numbers and the raw close is
/// nonzero; 1 otherwise.
#[must_use]
pub fn adjustment_factor(row: &RawRow, mode: AdjustmentMode) -> f64 {
    if mode == AdjustmentMode::Raw {
        return 1.0;
    }
    let close = coerce_float(row.first_of(CLOSE_KEYS));
    let adj_close = coerce_float(row.first_of(ADJ_CLOSE_KEYS));
    if close.is_finite() && close != 0.0 && adj_close.is_finite() {
        adj_close / close
    } else {
        1.0
    }
}

/// Max and min of the finite values, NaN for both when there are none.
fn high_low(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((hi, lo)) => Some((hi.max(v), lo.min(v))),
            None => Some((v, v)),
        })
        .unwrap_or((f64::NAN, f64::NAN))
}
