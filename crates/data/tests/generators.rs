use proptest::prelude::*;

/// Close prices with occasional gaps (NaN).
pub fn close_series(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            9 => (1.0f64..500.0),
            1 => Just(f64::NAN),
        ],
        0..=max_len,
    )
}

/// Four finite prices in arbitrary (possibly inconsistent) order.
pub fn messy_ohlc() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (1.0f64..100.0, 1.0f64..100.0, 1.0f64..100.0, 1.0f64..100.0)
}
