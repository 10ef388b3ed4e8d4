use std::collections::BTreeMap;

use chrono::NaiveDate;

/// One preprocessed trading day of a single ticker.
///
/// `high`/`low` are recomputed from the adjusted prices, never taken from the
/// input verbatim. Any price field may be NaN when the source value was missing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PriceRow {
    /// Trading day. Datasets store it as the calendar date `YYYY-MM-DD`,
    /// without a time component (see [`PriceRow::date_string`]).
    pub date: NaiveDate,
    /// High price (max of the finite adjusted prices)
    pub high: f64,
    /// Low price (min of the finite adjusted prices)
    pub low: f64,
    /// Open price
    pub open: f64,
    /// Close price
    pub close: f64,
    /// Volume (never adjusted)
    pub volume: f64,
    /// Moving average of the close keyed by window length
    pub moving_averages: BTreeMap<usize, f64>,
}

impl PriceRow {
    /// Returns the moving average for `window_length`, NaN if it was not computed.
    #[must_use]
    pub fn moving_average(&self, window_length: usize) -> f64 {
        self.moving_averages
            .get(&window_length)
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Returns `true` if none of the price or volume fields carries a value.
    #[must_use]
    pub fn is_infoless(&self) -> bool {
        [self.high, self.low, self.open, self.close, self.volume]
            .iter()
            .all(|v| v.is_nan())
    }

    /// Calendar date in `YYYY-MM-DD` form, as stored in datasets.
    #[must_use]
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row() -> PriceRow {
        PriceRow {
            date: NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
            high: 12.0,
            low: 9.5,
            open: 10.0,
            close: 11.0,
            volume: 1_500.0,
            moving_averages: BTreeMap::from([(5, 10.5)]),
        }
    }

    #[test]
    fn test_moving_average_lookup() {
        let row = make_row();
        assert!((row.moving_average(5) - 10.5).abs() < 1e-12);
        assert!(row.moving_average(20).is_nan());
    }

    #[test]
    fn test_date_string_is_calendar_date() {
        assert_eq!(make_row().date_string(), "2021-03-04");
    }

    #[test]
    fn test_infoless_row() {
        let mut row = make_row();
        assert!(!row.is_infoless());
        row.high = f64::NAN;
        row.low = f64::NAN;
        row.open = f64::NAN;
        row.close = f64::NAN;
        row.volume = f64::NAN;
        assert!(row.is_infoless());
    }

    #[test]
    fn test_price_row_serde_roundtrip() {
        let row = make_row();
        let json = serde_json::to_string(&row).unwrap();
        let deserialized: PriceRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row, deserialized);
    }
}
