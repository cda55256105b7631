//! Price source selector — which bar field feeds the band statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Bar;

/// Field (or field blend) of a bar used as the indicator's source series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    /// (high + low) / 2
    Hl2,
    /// (high + low + close) / 3
    Hlc3,
    /// (open + high + low + close) / 4
    Ohlc4,
}

impl PriceSource {
    pub const ALL: [PriceSource; 7] = [
        PriceSource::Open,
        PriceSource::High,
        PriceSource::Low,
        PriceSource::Close,
        PriceSource::Hl2,
        PriceSource::Hlc3,
        PriceSource::Ohlc4,
    ];

    /// Extract the source value from a bar.
    pub fn value(&self, bar: &Bar) -> f64 {
        match self {
            PriceSource::Open => bar.open,
            PriceSource::High => bar.high,
            PriceSource::Low => bar.low,
            PriceSource::Close => bar.close,
            PriceSource::Hl2 => (bar.high + bar.low) / 2.0,
            PriceSource::Hlc3 => (bar.high + bar.low + bar.close) / 3.0,
            PriceSource::Ohlc4 => (bar.open + bar.high + bar.low + bar.close) / 4.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Open => "open",
            PriceSource::High => "high",
            PriceSource::Low => "low",
            PriceSource::Close => "close",
            PriceSource::Hl2 => "hl2",
            PriceSource::Hlc3 => "hlc3",
            PriceSource::Ohlc4 => "ohlc4",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown price source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown price source '{0}' (expected open, high, low, close, hl2, hlc3 or ohlc4)")]
pub struct UnknownPriceSource(pub String);

impl FromStr for PriceSource {
    type Err = UnknownPriceSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        PriceSource::ALL
            .into_iter()
            .find(|src| src.as_str() == lowered)
            .ok_or_else(|| UnknownPriceSource(s.to_string()))
    }
}
