//! Ordering and OHLC checks on preprocessed rows.

use crate::error::DataError;
use pictor_types::PriceRow;

/// Returns the indices whose date does not strictly follow the previous row.
///
/// Moving averages assume chronological input, so callers log these rather
/// than silently feeding reordered data.
#[must_use]
pub fn check_chronological(rows: &[PriceRow]) -> Vec<usize> {
    rows.windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].date <= pair[0].date)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Validates the OHLC ordering of rows whose four prices are all finite.
///
/// # Errors
/// [`DataError::CorruptData`] for the first row where `high`/`low` do not
/// bound `open`/`close`.
pub fn validate_price_rows(rows: &[PriceRow]) -> Result<(), DataError> {
    for (i, row) in rows.iter().enumerate() {
        let prices = [row.open, row.high, row.low, row.close];
        if !prices.iter().all(|p| p.is_finite()) {
            continue;
        }
        if row.low > row.open
            || row.low > row.close
            || row.high < row.open
            || row.high < row.close
            || row.low > row.high
        {
            return Err(DataError::CorruptData(format!(
                "Invalid OHLC at index {i}: low={}, high={}, open={}, close={}",
                row.low, row.high, row.open, row.close
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn row(day: u32, open: f64, high: f64, low: f64, close: f64) -> PriceRow {
        PriceRow {
            date: NaiveDate::from_ymd_opt(2022, 5, day).unwrap(),
            high,
            low,
            open,
            close,
            volume: 1.0,
            moving_averages: BTreeMap::new(),
        }
    }

    #[test]
    fn test_chronological_violations() {
        let rows = vec![
            row(2, 1.0, 1.0, 1.0, 1.0),
            row(3, 1.0, 1.0, 1.0, 1.0),
            row(3, 1.0, 1.0, 1.0, 1.0),
            row(1, 1.0, 1.0, 1.0, 1.0),
        ];
        assert_eq!(check_chronological(&rows), vec![2, 3]);
        assert!(check_chronological(&rows[..2]).is_empty());
    }

    #[test]
    fn test_invalid_ohlc_rejected() {
        let rows = vec![row(2, 10.0, 9.0, 8.0, 9.5)];
        assert!(matches!(
            validate_price_rows(&rows),
            Err(DataError::CorruptData(_))
        ));
    }

    #[test]
    fn test_partial_rows_skipped() {
        let rows = vec![row(2, f64::NAN, 9.0, 10.0, 9.5)];
        validate_price_rows(&rows).unwrap();
    }
}
