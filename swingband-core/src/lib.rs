//! SwingBand Core — streaming Bollinger bands with swing-based stop/target signals.
//!
//! This crate contains the whole computation engine:
//! - Domain types (bars, price source selector)
//! - Rolling mean / population stdev over a fixed window
//! - Inner (1 stdev) and outer (mult stdev) bands with a trend color
//! - Crossover / crossunder detection with one step of history
//! - Swing low/high tracking and the entry/stop/target state machine
//! - A per-stream pipeline plus CSV/JSON input and output helpers
//!
//! It computes values and signals only; it never places or simulates trades.

pub mod config;
pub mod data;
pub mod domain;
pub mod export;
pub mod indicators;
pub mod pipeline;
pub mod signals;

pub use config::{ConfigError, IndicatorConfig};
pub use data::{load_bars_csv, read_bars_csv, DataError};
pub use domain::{Bar, PriceSource};
pub use pipeline::{BandSwing, BarOutput};
