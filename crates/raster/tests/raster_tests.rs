use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::s;
use proptest::prelude::*;

use pictor_raster::{PRICE_CHANNEL, Rasterizer, Scale, TREND_CHANNEL, VOLUME_CHANNEL, WindowRange};
use pictor_types::{ImageType, PriceRow};

fn make_row(day: u32, (open, high, low, close): (f64, f64, f64, f64), volume: f64, ma: f64) -> PriceRow {
    PriceRow {
        date: NaiveDate::from_ymd_opt(2023, 2, day).unwrap(),
        high,
        low,
        open,
        close,
        volume,
        moving_averages: BTreeMap::from([(3, ma)]),
    }
}

/// Three candles on an 11 pixel chart: prices 0..10 map one-to-one onto rows.
fn three_candles() -> (Rasterizer, Vec<PriceRow>) {
    let image_type = ImageType::new("T3", 3, 11).unwrap();
    let rows = vec![
        make_row(1, (1.0, 4.0, 0.0, 3.0), 100.0, f64::NAN),
        make_row(2, (3.0, 6.0, 2.0, 5.0), 200.0, 4.0),
        make_row(3, (6.0, 10.0, 5.0, 9.0), 300.0, 6.0),
    ];
    (Rasterizer::new(image_type).unwrap(), rows)
}

fn lit(image: &ndarray::Array3<f32>, channel: usize, column: usize) -> Vec<usize> {
    image
        .slice(s![channel, .., column])
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == 1.0)
        .map(|(row, _)| row)
        .collect()
}

#[test]
fn test_price_channel_pixels() {
    let (rasterizer, rows) = three_candles();
    let image = rasterizer.rasterize(&rows).unwrap();
    assert_eq!(image.shape(), &[3, 11, 9]);

    // first candle: bar [0, 4), marks at open=1 and close=3
    assert_eq!(lit(&image, PRICE_CHANNEL, 1), vec![0, 1, 2, 3]);
    assert_eq!(lit(&image, PRICE_CHANNEL, 0), vec![1, 3]);
    assert!(lit(&image, PRICE_CHANNEL, 2).is_empty());

    // second candle
    assert_eq!(lit(&image, PRICE_CHANNEL, 4), vec![2, 3, 4, 5]);
    assert_eq!(lit(&image, PRICE_CHANNEL, 3), vec![3, 5]);

    // third candle reaches the top price, bar stops one row short of it
    assert_eq!(lit(&image, PRICE_CHANNEL, 7), vec![5, 6, 7, 8, 9]);
    assert_eq!(lit(&image, PRICE_CHANNEL, 6), vec![6, 9]);
}

#[test]
fn test_trend_channel_pixels() {
    let (rasterizer, rows) = three_candles();
    let image = rasterizer.rasterize(&rows).unwrap();

    // no average on the first candle
    for column in 0..3 {
        assert!(lit(&image, TREND_CHANNEL, column).is_empty());
    }
    // second candle: 4, then a third of the way to 6 -> 4.67 -> row 5
    assert!(lit(&image, TREND_CHANNEL, 3).is_empty());
    assert_eq!(lit(&image, TREND_CHANNEL, 4), vec![4]);
    assert_eq!(lit(&image, TREND_CHANNEL, 5), vec![5]);
    // third candle: a third of the way back to 4 -> 5.33 -> row 5, then 6
    assert_eq!(lit(&image, TREND_CHANNEL, 6), vec![5]);
    assert_eq!(lit(&image, TREND_CHANNEL, 7), vec![6]);
    assert!(lit(&image, TREND_CHANNEL, 8).is_empty());
}

#[test]
fn test_volume_channel_pixels() {
    let (rasterizer, rows) = three_candles();
    let image = rasterizer.rasterize(&rows).unwrap();

    // minimum volume draws nothing
    assert!(lit(&image, VOLUME_CHANNEL, 2).is_empty());
    assert_eq!(lit(&image, VOLUME_CHANNEL, 5), vec![0, 1, 2, 3, 4]);
    assert_eq!(lit(&image, VOLUME_CHANNEL, 8), (0..10).collect::<Vec<_>>());
    for column in [0, 1, 3, 4, 6, 7] {
        assert!(lit(&image, VOLUME_CHANNEL, column).is_empty());
    }
}

#[test]
fn test_equal_open_close_single_mark() {
    let image_type = ImageType::new("T2", 2, 11).unwrap();
    let rows = vec![
        make_row(1, (5.0, 10.0, 0.0, 5.0), 1.0, f64::NAN),
        make_row(2, (5.0, 10.0, 0.0, 5.0), 2.0, f64::NAN),
    ];
    let image = Rasterizer::new(image_type).unwrap().rasterize(&rows).unwrap();
    assert_eq!(lit(&image, PRICE_CHANNEL, 0), vec![5]);
}

#[test]
fn test_missing_values_leave_blanks() {
    let image_type = ImageType::new("T2", 2, 11).unwrap();
    let rows = vec![
        make_row(1, (f64::NAN, 10.0, 0.0, f64::NAN), f64::NAN, 5.0),
        make_row(2, (f64::NAN, f64::NAN, f64::NAN, f64::NAN), f64::NAN, f64::NAN),
    ];
    let image = Rasterizer::new(image_type).unwrap().rasterize(&rows).unwrap();

    assert!(lit(&image, PRICE_CHANNEL, 0).is_empty());
    assert_eq!(lit(&image, PRICE_CHANNEL, 1).len(), 10);
    assert_eq!(lit(&image, TREND_CHANNEL, 1), vec![5]);
    assert!(lit(&image, TREND_CHANNEL, 2).is_empty());
    assert!(image.slice(s![.., .., 3..]).iter().all(|&v| v == 0.0));
    assert!(image.slice(s![VOLUME_CHANNEL, .., ..]).iter().all(|&v| v == 0.0));
}

#[test]
fn test_six_rows_yield_two_d5_images() {
    let rasterizer = Rasterizer::new(ImageType::d5()).unwrap();
    let rows: Vec<PriceRow> = (1..=6)
        .map(|d| {
            let close = 100.0 + f64::from(d);
            PriceRow {
                date: NaiveDate::from_ymd_opt(2023, 2, d).unwrap(),
                high: close + 0.5,
                low: close - 0.5,
                open: close - 0.25,
                close,
                volume: 1_000.0 * f64::from(d),
                moving_averages: BTreeMap::from([(5, close - 1.0)]),
            }
        })
        .collect();

    let images: Vec<_> = rasterizer.images(&rows).collect();
    assert_eq!(images.len(), 2);
    for (image, _) in &images {
        assert_eq!(image.shape(), &[3, 32, 15]);
    }
    assert_eq!(images[1].1.date, rows[5].date);
}

fn window_strategy() -> impl Strategy<Value = Vec<PriceRow>> {
    prop::collection::vec(
        (1.0f64..100.0, 0.0f64..5.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1e6, 1.0f64..100.0),
        5,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (base, spread, o, c, volume, ma))| PriceRow {
                date: NaiveDate::from_ymd_opt(2023, 3, 1 + i as u32).unwrap(),
                high: base + spread,
                low: base,
                open: base + spread * o,
                close: base + spread * c,
                volume,
                moving_averages: BTreeMap::from([(5, ma)]),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_range_edges_map_to_edge_rows(rows in window_strategy()) {
        let range = WindowRange::of(&rows, 5);
        if let Some(scale) = range.price_scale(32) {
            prop_assert_eq!(scale.cell(range.low_price), 0);
            prop_assert_eq!(scale.cell(range.high_price), 31);
        }
        let direct = Scale::new(range.low_price, range.high_price, 32);
        prop_assert_eq!(direct, range.price_scale(32));
    }

    #[test]
    fn prop_images_are_binary(rows in window_strategy()) {
        let image = Rasterizer::new(ImageType::d5()).unwrap().rasterize(&rows).unwrap();
        prop_assert_eq!(image.shape(), &[3, 32, 15]);
        prop_assert!(image.iter().all(|&v| v == 0.0 || v == 1.0));
        // every row with a finite average gets exactly one centre trend pixel
        if range_is_valid(&rows) {
            for i in 0..5 {
                let centre = image.slice(s![TREND_CHANNEL, .., 3 * i + 1]);
                prop_assert_eq!(centre.iter().filter(|&&v| v == 1.0).count(), 1);
            }
        }
    }
}

fn range_is_valid(rows: &[PriceRow]) -> bool {
    WindowRange::of(rows, 5).price_scale(32).is_some()
}
