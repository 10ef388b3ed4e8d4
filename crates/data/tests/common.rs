use std::fmt::Write as _;
use std::path::Path;

use pictor_data::RawRow;

/// A daily row as written to fixture CSVs.
pub struct Bar {
    pub date: &'static str,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

pub fn sample_bars() -> Vec<Bar> {
    vec![
        Bar {
            date: "2021-01-04",
            open: 10.0,
            high: 10.8,
            low: 9.6,
            close: 10.5,
            volume: 1_000.0,
        },
        Bar {
            date: "2021-01-05",
            open: 10.5,
            high: 11.2,
            low: 10.1,
            close: 11.0,
            volume: 1_400.0,
        },
        Bar {
            date: "2021-01-06",
            open: 11.0,
            high: 11.9,
            low: 10.7,
            close: 11.5,
            volume: 900.0,
        },
    ]
}

/// Renders bars with the human-readable header spelling.
pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for bar in bars {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.close, bar.volume
        )
        .unwrap();
    }
    out
}

pub fn write_csv(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

pub fn raw_row(pairs: &[(&str, &str)]) -> RawRow {
    pairs.iter().copied().collect()
}
