//! Rolling window statistics — mean and population standard deviation.
//!
//! Keeps the last `length` source values. Statistics are produced from the
//! very first sample: before the window fills they are computed over the
//! partial window (reduced confidence, not an error).
//!
//! Uses population stddev (divide by N), recomputed from the window contents
//! on every ingest so no floating-point drift accumulates.

use std::collections::VecDeque;

/// Statistics of the current window after an ingest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub stdev: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone)]
pub struct RollingStats {
    length: usize,
    window: VecDeque<f64>,
}

impl RollingStats {
    pub fn new(length: usize) -> Self {
        assert!(length >= 1, "RollingStats length must be >= 1");
        Self {
            length,
            window: VecDeque::with_capacity(length),
        }
    }

    /// Push a new value, evicting the oldest once the window is full, and
    /// return the statistics of the resulting window.
    ///
    /// A NaN in the window yields NaN statistics until it is evicted.
    pub fn ingest(&mut self, value: f64) -> WindowStats {
        if self.window.len() == self.length {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.stats()
    }

    fn stats(&self) -> WindowStats {
        let n = self.window.len();
        let count = n as f64;
        let mean = self.window.iter().sum::<f64>() / count;
        let variance = self
            .window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / count;

        WindowStats {
            mean,
            stdev: variance.sqrt(),
            sample_count: n,
        }
    }
}
