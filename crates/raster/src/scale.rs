//! Vertical scaling of prices and volumes onto pixel rows.

use pictor_types::PriceRow;

/// Linear mapping of `[low, high]` onto pixel rows `0..pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    low: f64,
    high: f64,
    pixel_height: usize,
}

impl Scale {
    /// Creates a scale, `None` when the range is empty or not finite.
    #[must_use]
    pub fn new(low: f64, high: f64, pixel_height: usize) -> Option<Self> {
        let span = high - low;
        if !span.is_finite() || span == 0.0 || pixel_height == 0 {
            return None;
        }
        Some(Self {
            low,
            high,
            pixel_height,
        })
    }

    /// Pixel row of `value`.
    ///
    /// Ties round to even. Values outside the range are clamped to the edge rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn cell(&self, value: f64) -> usize {
        let top = (self.pixel_height - 1) as f64;
        let position = (top * (value - self.low) / (self.high - self.low)).round_ties_even();
        position.clamp(0.0, top) as usize
    }
}

/// Price and volume bounds of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRange {
    /// Highest finite high or moving average
    pub high_price: f64,
    /// Lowest finite low or moving average
    pub low_price: f64,
    /// Highest finite volume
    pub max_volume: f64,
    /// Lowest finite volume
    pub min_volume: f64,
}

impl WindowRange {
    /// Computes the bounds over the finite values of `rows`.
    ///
    /// The price range covers each row's high, low and its moving average for
    /// `window_length`, so the trend line always fits the chart. A range with no
    /// finite values collapses to `0..0`.
    #[must_use]
    pub fn of(rows: &[PriceRow], window_length: usize) -> Self {
        let prices = rows.iter().flat_map(|r| {
            [r.high, r.low, r.moving_average(window_length)]
        });
        let (low_price, high_price) = finite_bounds(prices);
        let (min_volume, max_volume) = finite_bounds(rows.iter().map(|r| r.volume));
        Self {
            high_price,
            low_price,
            max_volume,
            min_volume,
        }
    }

    /// Scale for the price and trend channels.
    #[must_use]
    pub fn price_scale(&self, pixel_height: usize) -> Option<Scale> {
        Scale::new(self.low_price, self.high_price, pixel_height)
    }

    /// Scale for the volume channel.
    #[must_use]
    pub fn volume_scale(&self, pixel_height: usize) -> Option<Scale> {
        Scale::new(self.min_volume, self.max_volume, pixel_height)
    }
}

fn finite_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    #[test]
    fn test_cell_edges() {
        let scale = Scale::new(95.0, 130.0, 32).unwrap();
        assert_eq!(scale.cell(95.0), 0);
        assert_eq!(scale.cell(130.0), 31);
    }

    #[test]
    fn test_cell_rounds_half_to_even() {
        let scale = Scale::new(0.0, 31.0, 32).unwrap();
        assert_eq!(scale.cell(0.5), 0);
        assert_eq!(scale.cell(1.5), 2);
        assert_eq!(scale.cell(2.5), 2);
        assert_eq!(scale.cell(2.6), 3);
    }

    #[test]
    fn test_cell_clamps_outside_range() {
        let scale = Scale::new(10.0, 20.0, 8).unwrap();
        assert_eq!(scale.cell(-5.0), 0);
        assert_eq!(scale.cell(25.0), 7);
    }

    #[test]
    fn test_degenerate_scale() {
        assert!(Scale::new(100.0, 100.0, 32).is_none());
        assert!(Scale::new(f64::NAN, 100.0, 32).is_none());
        assert!(Scale::new(0.0, f64::INFINITY, 32).is_none());
    }

    fn row(high: f64, low: f64, volume: f64, ma: f64) -> PriceRow {
        PriceRow {
            date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            high,
            low,
            open: low,
            close: high,
            volume,
            moving_averages: BTreeMap::from([(2, ma)]),
        }
    }

    #[test]
    fn test_range_includes_moving_average() {
        let rows = vec![row(10.0, 9.0, 5.0, 12.0), row(11.0, 8.5, f64::NAN, f64::NAN)];
        let range = WindowRange::of(&rows, 2);
        assert_eq!(range.high_price, 12.0);
        assert_eq!(range.low_price, 8.5);
        assert_eq!(range.max_volume, 5.0);
        assert_eq!(range.min_volume, 5.0);
        assert!(range.volume_scale(32).is_none());
    }

    #[test]
    fn test_range_without_finite_values_is_zero() {
        let rows = vec![row(f64::NAN, f64::NAN, f64::NAN, f64::NAN)];
        let range = WindowRange::of(&rows, 2);
        assert_eq!((range.low_price, range.high_price), (0.0, 0.0));
        assert_eq!((range.min_volume, range.max_volume), (0.0, 0.0));
        assert!(range.price_scale(32).is_none());
    }
}
