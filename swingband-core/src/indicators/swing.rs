//! Swing tracker — running extrema of low and high since the last reset.
//!
//! Between resets the swing low is non-increasing and the swing high is
//! non-decreasing. Non-finite inputs are skipped and leave the extrema as-is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwingTracker {
    low: Option<f64>,
    high: Option<f64>,
}

impl SwingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one bar's low/high into the running extrema.
    pub fn update(&mut self, low: f64, high: f64) -> &Self {
        if low.is_finite() && self.low.map_or(true, |current| low < current) {
            self.low = Some(low);
        }
        if high.is_finite() && self.high.map_or(true, |current| high > current) {
            self.high = Some(high);
        }
        self
    }

    /// Forget both extrema.
    pub fn clear(&mut self) {
        self.low = None;
        self.high = None;
    }

    pub fn low(&self) -> Option<f64> {
        self.low
    }

    pub fn high(&self) -> Option<f64> {
        self.high
    }

    pub fn is_clear(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}
