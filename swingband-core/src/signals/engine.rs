//! Signal engine — band breakouts combined with swing stops.
//!
//! Per bar, in this fixed order:
//! 1. Swing update (always).
//! 2. Buy:   source crosses over lower1 and source[t-1] < lower1[t].
//!    entry = source, stop = swing_low * (1 - offset%), target = entry + (entry - stop) * rr
//! 3. Sell:  source crosses under upper1 and source[t-1] > upper1[t].
//!    entry = source, stop = swing_high * (1 + offset%), target = entry - (stop - entry) * rr
//! 4. Reset: source crosses under lower1 or over upper1. Clears all levels.
//!
//! Reset runs last, so a bar that both arms and resets ends Idle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::{SignalDirection, SignalState};
use crate::config::IndicatorConfig;
use crate::domain::defined;
use crate::indicators::{BandSet, CrossDetector};

/// One bar's worth of inputs to the signal engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInput {
    pub source: f64,
    pub low: f64,
    pub high: f64,
    /// Band values at this bar, `None` while undefined.
    pub bands: Option<BandSet>,
}

/// A state-machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Buy,
    Sell,
    Reset,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Buy => "buy",
            Transition::Sell => "sell",
            Transition::Reset => "reset",
        }
    }
}

/// Transitions that fired on one bar, kept in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transitions {
    pub buy: bool,
    pub sell: bool,
    pub reset: bool,
}

impl Transitions {
    pub fn is_empty(&self) -> bool {
        !(self.buy || self.sell || self.reset)
    }

    pub fn iter(&self) -> impl Iterator<Item = Transition> {
        [
            (self.buy, Transition::Buy),
            (self.sell, Transition::Sell),
            (self.reset, Transition::Reset),
        ]
        .into_iter()
        .filter_map(|(fired, t)| fired.then_some(t))
    }

    /// `"buy+reset"` style label, empty when nothing fired.
    pub fn label(&self) -> String {
        self.iter().map(|t| t.as_str()).collect::<Vec<_>>().join("+")
    }
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    risk_reward_ratio: f64,
    stop_loss_fraction: f64,
    state: SignalState,
    lower: CrossDetector,
    upper: CrossDetector,
}

impl SignalEngine {
    /// The config is assumed validated.
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            risk_reward_ratio: config.risk_reward_ratio,
            stop_loss_fraction: config.stop_loss_fraction(),
            state: SignalState::new(),
            lower: CrossDetector::new(),
            upper: CrossDetector::new(),
        }
    }

    pub fn state(&self) -> &SignalState {
        &self.state
    }

    /// Advance the state machine by one bar.
    pub fn on_bar(&mut self, input: &SignalInput) -> Transitions {
        let mut fired = Transitions::default();

        // 1. Swing update runs regardless of state.
        self.state.swing_mut().update(input.low, input.high);

        let source = defined(input.source);
        let lower1 = input.bands.map(|b| b.lower1);
        let upper1 = input.bands.map(|b| b.upper1);
        let vs_lower = self.lower.update(source, lower1);
        let vs_upper = self.upper.update(source, upper1);

        // 2. Buy. The previous source must still sit below the *current* lower1.
        if vs_lower.over {
            if let (Some(source_prev), Some(entry), Some(lower1)) =
                (vs_lower.prev_a(), source, lower1)
            {
                if source_prev < lower1 {
                    self.arm_long(entry);
                    fired.buy = true;
                }
            }
        }

        // 3. Sell. The previous source must still sit above the *current* upper1.
        if vs_upper.under {
            if let (Some(source_prev), Some(entry), Some(upper1)) =
                (vs_upper.prev_a(), source, upper1)
            {
                if source_prev > upper1 {
                    self.arm_short(entry);
                    fired.sell = true;
                }
            }
        }

        // 4. Reset, after the entries so it wins on the same bar.
        if vs_lower.under || vs_upper.over {
            debug!(
                swing_low = ?self.state.recent_swing_low(),
                swing_high = ?self.state.recent_swing_high(),
                "signal reset"
            );
            self.state.clear();
            fired.reset = true;
        }

        fired
    }

    fn arm_long(&mut self, entry: f64) {
        let stop = self
            .state
            .recent_swing_low()
            .and_then(|low| defined(low * (1.0 - self.stop_loss_fraction)));
        let target = stop.and_then(|stop| defined(entry + (entry - stop) * self.risk_reward_ratio));
        debug!(entry, stop_loss = ?stop, take_profit = ?target, "buy signal");
        self.state.arm(SignalDirection::Long, entry, stop, target);
    }

    fn arm_short(&mut self, entry: f64) {
        let stop = self
            .state
            .recent_swing_high()
            .and_then(|high| defined(high * (1.0 + self.stop_loss_fraction)));
        let target = stop.and_then(|stop| defined(entry - (stop - entry) * self.risk_reward_ratio));
        debug!(entry, stop_loss = ?stop, take_profit = ?target, "sell signal");
        self.state.arm(SignalDirection::Short, entry, stop, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use crate::signals::SignalPhase;

    /// Bands with the given inner levels; basis midway, outer = inner.
    fn bands(lower1: f64, upper1: f64) -> Option<BandSet> {
        Some(BandSet {
            basis: (lower1 + upper1) / 2.0,
            upper1,
            lower1,
            upper2: upper1,
            lower2: lower1,
        })
    }

    fn input(source: f64, low: f64, high: f64, b: Option<BandSet>) -> SignalInput {
        SignalInput {
            source,
            low,
            high,
            bands: b,
        }
    }

    fn engine() -> SignalEngine {
        SignalEngine::new(&IndicatorConfig::default())
    }

    #[test]
    fn buy_sets_entry_stop_and_target() {
        let mut eng = engine();
        // bar t-1: source 94 below lower1 95, swing low 90
        let t0 = eng.on_bar(&input(94.0, 90.0, 96.0, bands(95.0, 110.0)));
        assert!(t0.is_empty());
        // bar t: source 96 crosses over lower1 95
        let t1 = eng.on_bar(&input(96.0, 93.0, 97.0, bands(95.0, 110.0)));
        assert!(t1.buy && !t1.sell && !t1.reset);

        let s = eng.state();
        assert_eq!(s.phase(), SignalPhase::LongArmed);
        assert_eq!(s.entry_price(), Some(96.0));
        assert_approx(s.stop_loss().unwrap(), 89.55, DEFAULT_EPSILON);
        assert_approx(s.take_profit().unwrap(), 105.675, DEFAULT_EPSILON);
    }

    #[test]
    fn sell_sets_entry_stop_and_target() {
        let mut eng = engine();
        eng.on_bar(&input(106.0, 101.0, 110.0, bands(90.0, 105.0)));
        let t = eng.on_bar(&input(104.0, 102.0, 106.0, bands(90.0, 105.0)));
        assert!(t.sell);

        let s = eng.state();
        assert_eq!(s.phase(), SignalPhase::ShortArmed);
        assert_eq!(s.entry_price(), Some(104.0));
        // 110 * 1.005 = 110.55; target = 104 - 6.55 * 1.5 = 94.175
        assert_approx(s.stop_loss().unwrap(), 110.55, 1e-9);
        assert_approx(s.take_profit().unwrap(), 94.175, 1e-9);
    }

    #[test]
    fn first_bar_never_fires() {
        let mut eng = engine();
        let t = eng.on_bar(&input(96.0, 95.0, 97.0, bands(95.0, 110.0)));
        assert!(t.is_empty());
        assert_eq!(eng.state().phase(), SignalPhase::Idle);
        // swing levels are still tracked
        assert_eq!(eng.state().recent_swing_low(), Some(95.0));
    }

    #[test]
    fn stale_band_guard_blocks_buy() {
        let mut eng = engine();
        // lower1 drops from 95 to 93 while source goes 94 -> 96.
        // crossover holds (94 <= 95, 96 > 93) but source[t-1]=94 is not < lower1[t]=93.
        eng.on_bar(&input(94.0, 90.0, 96.0, bands(95.0, 110.0)));
        let t = eng.on_bar(&input(96.0, 93.0, 97.0, bands(93.0, 110.0)));
        assert!(!t.buy);
        assert_eq!(eng.state().phase(), SignalPhase::Idle);
    }

    #[test]
    fn stale_band_guard_blocks_sell() {
        let mut eng = engine();
        eng.on_bar(&input(106.0, 101.0, 110.0, bands(90.0, 105.0)));
        // upper1 rises to 107: crossunder holds but 106 is not > 107
        let t = eng.on_bar(&input(104.0, 102.0, 106.0, bands(90.0, 107.0)));
        assert!(!t.sell);
    }

    #[test]
    fn reset_wins_over_same_bar_buy() {
        let mut eng = engine();
        eng.on_bar(&input(9.0, 8.5, 9.5, bands(10.0, 12.0)));
        // crosses over lower1 (9 <= 10, 11 > 9.5, guard 9 < 9.5) and over upper1 (9 <= 12, 11 > 10.5)
        let t = eng.on_bar(&input(11.0, 8.8, 11.2, bands(9.5, 10.5)));
        assert!(t.buy, "buy condition should fire first");
        assert!(t.reset, "reset should fire after it");
        assert_eq!(t.label(), "buy+reset");
        assert_eq!(eng.state().phase(), SignalPhase::Idle);
        assert!(eng.state().is_clear());
    }

    #[test]
    fn crossunder_lower_resets_armed_long() {
        let mut eng = engine();
        eng.on_bar(&input(94.0, 90.0, 96.0, bands(95.0, 110.0)));
        eng.on_bar(&input(96.0, 93.0, 97.0, bands(95.0, 110.0)));
        assert_eq!(eng.state().phase(), SignalPhase::LongArmed);

        eng.on_bar(&input(97.0, 95.0, 98.0, bands(95.0, 110.0)));
        assert_eq!(eng.state().phase(), SignalPhase::LongArmed);

        let t = eng.on_bar(&input(94.0, 93.5, 97.5, bands(95.0, 110.0)));
        assert!(t.reset);
        assert!(eng.state().is_clear());
    }

    #[test]
    fn sell_flips_armed_long() {
        let mut eng = engine();
        eng.on_bar(&input(94.0, 90.0, 96.0, bands(95.0, 110.0)));
        eng.on_bar(&input(96.0, 93.0, 97.0, bands(95.0, 100.0)));
        assert_eq!(eng.state().phase(), SignalPhase::LongArmed);

        // source touches upper1 exactly: not strictly above, so no reset
        let t = eng.on_bar(&input(101.0, 96.0, 101.5, bands(95.0, 101.0)));
        assert!(t.is_empty());

        // 101 >= 101 then 100 < 100.5, and 101 > 100.5
        let t = eng.on_bar(&input(100.0, 99.0, 101.0, bands(95.0, 100.5)));
        assert!(t.sell && !t.reset);
        assert_eq!(eng.state().phase(), SignalPhase::ShortArmed);
        assert_eq!(eng.state().entry_price(), Some(100.0));
        // swing high kept growing since the buy: 101.5 * 1.005
        assert_approx(eng.state().stop_loss().unwrap(), 102.0075, 1e-9);
    }

    #[test]
    fn swing_levels_reset_then_restart() {
        let mut eng = engine();
        eng.on_bar(&input(100.0, 80.0, 120.0, bands(95.0, 105.0)));
        // source crosses under lower1 -> reset
        let t = eng.on_bar(&input(94.0, 93.0, 101.0, bands(95.0, 105.0)));
        assert!(t.reset);
        assert_eq!(eng.state().recent_swing_low(), None);

        eng.on_bar(&input(94.5, 94.0, 95.0, bands(95.0, 105.0)));
        assert_eq!(eng.state().recent_swing_low(), Some(94.0));
        assert_eq!(eng.state().recent_swing_high(), Some(95.0));
    }

    #[test]
    fn undefined_bands_suppress_transitions() {
        let mut eng = engine();
        eng.on_bar(&input(94.0, 90.0, 96.0, bands(95.0, 110.0)));
        let t = eng.on_bar(&input(96.0, 93.0, 97.0, None));
        assert!(t.is_empty());
        // history was broken, so the next defined bar cannot cross either
        let t = eng.on_bar(&input(97.0, 93.0, 97.0, bands(96.5, 110.0)));
        assert!(t.is_empty());
    }

    #[test]
    fn missing_swing_low_leaves_stop_and_target_unset() {
        let mut eng = engine();
        eng.on_bar(&input(94.0, f64::NAN, f64::NAN, bands(95.0, 110.0)));
        let t = eng.on_bar(&input(96.0, f64::NAN, f64::NAN, bands(95.0, 110.0)));
        assert!(t.buy);
        let s = eng.state();
        assert_eq!(s.entry_price(), Some(96.0));
        assert_eq!(s.stop_loss(), None);
        assert_eq!(s.take_profit(), None);
    }

    #[test]
    fn overflowing_stop_is_unset_without_touching_other_levels() {
        let mut eng = engine();
        eng.on_bar(&input(106.0, 101.0, 110.0, bands(90.0, 105.0)));
        // f64::MAX * 1.005 overflows to +inf
        let t = eng.on_bar(&input(104.0, 102.0, f64::MAX, bands(90.0, 105.0)));
        assert!(t.sell && !t.reset);

        let s = eng.state();
        assert_eq!(s.phase(), SignalPhase::ShortArmed);
        assert_eq!(s.entry_price(), Some(104.0));
        assert_eq!(s.stop_loss(), None);
        assert_eq!(s.take_profit(), None);
        assert_eq!(s.recent_swing_low(), Some(101.0));
        assert_eq!(s.recent_swing_high(), Some(f64::MAX));
    }

    #[test]
    fn transitions_label_and_iter() {
        let t = Transitions {
            buy: false,
            sell: true,
            reset: true,
        };
        assert_eq!(
            t.iter().collect::<Vec<_>>(),
            vec![Transition::Sell, Transition::Reset]
        );
        assert_eq!(t.label(), "sell+reset");
        assert_eq!(Transitions::default().label(), "");
    }
}
