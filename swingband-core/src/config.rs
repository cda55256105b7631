//! Indicator configuration — validated once at stream start, immutable after.
//!
//! Loadable from TOML. Missing keys fall back to the defaults
//! (length 34, mult 2.0, risk/reward 1.5, stop offset 0.5%, source close).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::PriceSource;

pub const DEFAULT_LENGTH: usize = 34;
pub const DEFAULT_MULT: f64 = 2.0;
pub const DEFAULT_RISK_REWARD: f64 = 1.5;
pub const DEFAULT_STOP_LOSS_OFFSET: f64 = 0.5;

pub const MULT_MIN: f64 = 0.001;
pub const MULT_MAX: f64 = 50.0;
pub const RISK_REWARD_MIN: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("length must be >= 1, got {0}")]
    InvalidLength(usize),

    #[error("mult must be within [0.001, 50], got {0}")]
    MultOutOfRange(f64),

    #[error("risk_reward_ratio must be >= 1.0, got {0}")]
    RiskRewardTooLow(f64),

    #[error("stop_loss_offset must be >= 0, got {0}")]
    NegativeStopLossOffset(f64),

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parameters of one indicator instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    /// Rolling window length (bars).
    pub length: usize,
    /// Outer band multiplier applied to the stdev.
    pub mult: f64,
    /// Take-profit distance as a multiple of the entry-to-stop distance.
    pub risk_reward_ratio: f64,
    /// Extra stop distance beyond the swing extreme, in percent.
    pub stop_loss_offset: f64,
    /// Bar field feeding the statistics and the breakout checks.
    pub source: PriceSource,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            mult: DEFAULT_MULT,
            risk_reward_ratio: DEFAULT_RISK_REWARD,
            stop_loss_offset: DEFAULT_STOP_LOSS_OFFSET,
            source: PriceSource::Close,
        }
    }
}

impl IndicatorConfig {
    /// Reject out-of-range parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length < 1 {
            return Err(ConfigError::InvalidLength(self.length));
        }

        for (field, value) in [
            ("mult", self.mult),
            ("risk_reward_ratio", self.risk_reward_ratio),
            ("stop_loss_offset", self.stop_loss_offset),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        if !(MULT_MIN..=MULT_MAX).contains(&self.mult) {
            return Err(ConfigError::MultOutOfRange(self.mult));
        }
        if self.risk_reward_ratio < RISK_REWARD_MIN {
            return Err(ConfigError::RiskRewardTooLow(self.risk_reward_ratio));
        }
        if self.stop_loss_offset < 0.0 {
            return Err(ConfigError::NegativeStopLossOffset(self.stop_loss_offset));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it.
    ///
    /// For callers that layer overrides on top before calling `validate`.
    pub fn read_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// BLAKE3 hex digest of the canonical JSON encoding.
    ///
    /// Field order is fixed by the struct, so identical parameter sets always
    /// hash the same and an output file can be tied back to its configuration.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    /// Stop-loss offset as a fraction (0.5% → 0.005).
    pub fn stop_loss_fraction(&self) -> f64 {
        self.stop_loss_offset / 100.0
    }
}
