//! Stream pipeline — one indicator instance per bar stream.
//!
//! Each bar is fully processed before the next one is admitted:
//! RollingStats → BandCalculator → CrossDetector → SwingTracker → SignalEngine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::config::{ConfigError, IndicatorConfig};
use crate::domain::{defined, Bar};
use crate::indicators::{BandCalculator, BandSet, RollingStats, TrendColor};
use crate::signals::{SignalEngine, SignalInput, SignalPhase, SignalState, Transitions};

/// Everything the indicator publishes for one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarOutput {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub source: Option<f64>,
    /// Samples in the rolling window; below `length` means a partial window.
    pub sample_count: usize,
    pub bands: Option<BandSet>,
    pub trend: Option<TrendColor>,
    pub phase: SignalPhase,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub swing_low: Option<f64>,
    pub swing_high: Option<f64>,
    pub transitions: Transitions,
}

/// Bollinger band + swing stop/target indicator over a single bar stream.
#[derive(Debug, Clone)]
pub struct BandSwing {
    config: IndicatorConfig,
    stats: RollingStats,
    bands: BandCalculator,
    engine: SignalEngine,
    bars_seen: usize,
}

impl BandSwing {
    /// Validate the configuration and build a fresh instance.
    pub fn new(config: IndicatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            length = config.length,
            mult = config.mult,
            risk_reward_ratio = config.risk_reward_ratio,
            stop_loss_offset = config.stop_loss_offset,
            source = %config.source,
            "band swing stream created"
        );
        Ok(Self {
            config,
            stats: RollingStats::new(config.length),
            bands: BandCalculator::new(config.mult),
            engine: SignalEngine::new(&config),
            bars_seen: 0,
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Read-only view of the signal state after the last processed bar.
    pub fn state(&self) -> &SignalState {
        self.engine.state()
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Process one bar.
    pub fn on_bar(&mut self, bar: &Bar) -> BarOutput {
        let raw_source = self.config.source.value(bar);
        let window = self.stats.ingest(raw_source);
        let bands = self.bands.compute(&window);
        let source = defined(raw_source);
        let trend = source.zip(bands).map(|(s, b)| b.trend(s));

        let transitions = self.engine.on_bar(&SignalInput {
            source: raw_source,
            low: bar.low,
            high: bar.high,
            bands,
        });

        let state = self.engine.state();
        let out = BarOutput {
            bar_index: self.bars_seen,
            timestamp: bar.timestamp,
            source,
            sample_count: window.sample_count,
            bands,
            trend,
            phase: state.phase(),
            entry_price: state.entry_price(),
            stop_loss: state.stop_loss(),
            take_profit: state.take_profit(),
            swing_low: state.recent_swing_low(),
            swing_high: state.recent_swing_high(),
            transitions,
        };
        trace!(
            bar_index = out.bar_index,
            source = ?out.source,
            basis = ?bands.map(|b| b.basis),
            phase = out.phase.as_str(),
            "bar processed"
        );

        self.bars_seen += 1;
        out
    }

    /// Process a finite series of bars in order.
    pub fn run(&mut self, bars: &[Bar]) -> Vec<BarOutput> {
        bars.iter().map(|bar| self.on_bar(bar)).collect()
    }
}
