//! Bollinger-style band set — basis +/- one stdev (inner) and +/- mult stdev (outer).
//!
//! - basis  = mean(source, length)
//! - upper1 = basis + stdev,        lower1 = basis - stdev
//! - upper2 = basis + mult * stdev, lower2 = basis - mult * stdev
//!
//! With `mult < 1` the outer bands sit inside the inner ones. That inversion
//! is accepted as-is; only `mult >= 0.001` is enforced by configuration.

use serde::{Deserialize, Serialize};

use super::rolling::WindowStats;

/// Per-bar band values. Replaced every bar, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSet {
    pub basis: f64,
    pub upper1: f64,
    pub lower1: f64,
    pub upper2: f64,
    pub lower2: f64,
}

impl BandSet {
    /// Build the band set from a mean and a stdev.
    ///
    /// Returns `None` when any resulting level is non-finite, e.g. while a NaN
    /// source value is still inside the rolling window.
    pub fn from_mean_stdev(mean: f64, stdev: f64, mult: f64) -> Option<Self> {
        let dev1 = stdev;
        let dev2 = mult * stdev;
        let bands = Self {
            basis: mean,
            upper1: mean + dev1,
            lower1: mean - dev1,
            upper2: mean + dev2,
            lower2: mean - dev2,
        };
        bands.is_finite().then_some(bands)
    }

    pub fn is_finite(&self) -> bool {
        self.basis.is_finite()
            && self.upper1.is_finite()
            && self.lower1.is_finite()
            && self.upper2.is_finite()
            && self.lower2.is_finite()
    }

    /// Trend classification of `source` against the basis.
    pub fn trend(&self, source: f64) -> TrendColor {
        if source >= self.basis {
            TrendColor::Primary
        } else {
            TrendColor::Secondary
        }
    }
}

/// Qualitative trend color handed to the rendering layer.
///
/// Primary when the source is at or above the basis, Secondary otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendColor {
    Primary,
    Secondary,
}

impl TrendColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendColor::Primary => "primary",
            TrendColor::Secondary => "secondary",
        }
    }
}

/// Derives a `BandSet` from rolling statistics with a fixed outer multiplier.
#[derive(Debug, Clone, Copy)]
pub struct BandCalculator {
    mult: f64,
}

impl BandCalculator {
    pub fn new(mult: f64) -> Self {
        assert!(
            mult > 0.0 && mult.is_finite(),
            "band multiplier must be positive and finite"
        );
        Self { mult }
    }

    pub fn compute(&self, stats: &WindowStats) -> Option<BandSet> {
        BandSet::from_mean_stdev(stats.mean, stats.stdev, self.mult)
    }
}
