//! Streaming moving average over the most recent `d` values.

use std::collections::VecDeque;

/// NaN-aware simple moving average fed one value at a time.
///
/// Non-finite values occupy a slot in the window but are excluded from the
/// mean. Values must be added in chronological order.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    duration: usize,
    values: VecDeque<f64>,
    sum: f64,
    nans: usize,
}

impl MovingAverage {
    /// Creates an empty moving average over `duration` values.
    #[must_use]
    pub fn new(duration: usize) -> Self {
        Self {
            duration,
            values: VecDeque::with_capacity(duration.saturating_add(1)),
            sum: 0.0,
            nans: 0,
        }
    }

    /// Window length.
    #[must_use]
    pub fn duration(&self) -> usize {
        self.duration
    }

    /// Pushes a value, evicting the oldest one once the window is full.
    pub fn add(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
        } else {
            self.nans += 1;
        }
        self.values.push_back(value);

        if self.values.len() > self.duration
            && let Some(popped) = self.values.pop_front()
        {
            if popped.is_finite() {
                self.sum -= popped;
            } else {
                self.nans -= 1;
            }
        }
    }

    /// Current average, NaN when the window holds no finite value.
    #[must_use]
    pub fn get(&self) -> f64 {
        let effective_count = self.values.len() - self.nans;
        if effective_count > 0 {
            self.sum / effective_count as f64
        } else {
            f64::NAN
        }
    }
}
