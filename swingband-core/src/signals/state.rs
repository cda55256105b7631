//! Signal state — entry/stop/target levels plus the swing extrema.
//!
//! Every level is an `Option<f64>`: `None` means unset. The phase is derived
//! from which levels are defined, never stored separately from them.

use serde::{Deserialize, Serialize};

use crate::indicators::SwingTracker;

/// Direction of an armed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Long,
    Short,
}

/// Conceptual state of the signal machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPhase {
    /// No entry defined.
    Idle,
    /// Entry/stop/target set by a buy signal.
    LongArmed,
    /// Entry/stop/target set by a sell signal.
    ShortArmed,
}

impl SignalPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalPhase::Idle => "idle",
            SignalPhase::LongArmed => "long_armed",
            SignalPhase::ShortArmed => "short_armed",
        }
    }
}

/// Levels set together by one entry transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Armed {
    direction: SignalDirection,
    entry_price: f64,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
}

/// Per-instance mutable signal state.
///
/// Only `SignalEngine` mutates it; everything else gets a shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalState {
    armed: Option<Armed>,
    swing: SwingTracker,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SignalPhase {
        match self.armed.map(|a| a.direction) {
            None => SignalPhase::Idle,
            Some(SignalDirection::Long) => SignalPhase::LongArmed,
            Some(SignalDirection::Short) => SignalPhase::ShortArmed,
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.armed.map(|a| a.entry_price)
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.armed.and_then(|a| a.stop_loss)
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.armed.and_then(|a| a.take_profit)
    }

    pub fn recent_swing_low(&self) -> Option<f64> {
        self.swing.low()
    }

    pub fn recent_swing_high(&self) -> Option<f64> {
        self.swing.high()
    }

    /// True when all five levels are unset.
    pub fn is_clear(&self) -> bool {
        self.armed.is_none() && self.swing.is_clear()
    }

    pub(crate) fn swing_mut(&mut self) -> &mut SwingTracker {
        &mut self.swing
    }

    /// Overwrite entry, stop and target in one go.
    pub(crate) fn arm(
        &mut self,
        direction: SignalDirection,
        entry_price: f64,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) {
        self.armed = Some(Armed {
            direction,
            entry_price,
            stop_loss,
            take_profit,
        });
    }

    /// Unset all five levels.
    pub(crate) fn clear(&mut self) {
        self.armed = None;
        self.swing.clear();
    }
}
