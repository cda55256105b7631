//! End-to-end signal scenarios.
//!
//! Exact-level scenarios drive `SignalEngine` with hand-built band values;
//! the stream scenarios run real bars through `BandSwing`.

use chrono::NaiveDate;
use swingband_core::domain::Bar;
use swingband_core::indicators::BandSet;
use swingband_core::signals::{SignalEngine, SignalInput, SignalPhase};
use swingband_core::{BandSwing, IndicatorConfig};

fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "actual={actual}, expected={expected}, diff={}",
        (actual - expected).abs()
    );
}

/// Bars from closes: open = prev close, high/low = body +/- 1.
fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                base + chrono::Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
            )
        })
        .collect()
}

fn inner(lower1: f64, upper1: f64) -> Option<BandSet> {
    Some(BandSet {
        basis: (lower1 + upper1) / 2.0,
        upper1,
        lower1,
        upper2: upper1 + 1.0,
        lower2: lower1 - 1.0,
    })
}

fn step(source: f64, low: f64, high: f64, bands: Option<BandSet>) -> SignalInput {
    SignalInput {
        source,
        low,
        high,
        bands,
    }
}

// ── Exact levels ─────────────────────────────────────────────────────

#[test]
fn buy_levels_match_reference_numbers() {
    // lower1 = 95, source 94 -> 96, swing low 90, offset 0.5%, rr 1.5
    let mut engine = SignalEngine::new(&IndicatorConfig::default());
    engine.on_bar(&step(94.0, 90.0, 95.0, inner(95.0, 120.0)));
    let fired = engine.on_bar(&step(96.0, 92.0, 96.5, inner(95.0, 120.0)));

    assert!(fired.buy);
    let s = engine.state();
    assert_eq!(s.phase(), SignalPhase::LongArmed);
    assert_eq!(s.entry_price(), Some(96.0));
    assert_approx(s.stop_loss().unwrap(), 89.55, 1e-9);
    assert_approx(s.take_profit().unwrap(), 105.675, 1e-9);
}

#[test]
fn reset_wins_on_reference_sequence() {
    // source [.., 9, 11], lower1 [.., 10, 9], upper1 [.., 12, 10.5]
    let mut engine = SignalEngine::new(&IndicatorConfig::default());
    engine.on_bar(&step(9.0, 8.0, 9.5, inner(10.0, 12.0)));
    let fired = engine.on_bar(&step(11.0, 8.5, 11.5, inner(9.0, 10.5)));

    assert!(fired.reset);
    assert_eq!(engine.state().phase(), SignalPhase::Idle);
    assert!(engine.state().is_clear());
}

#[test]
fn reset_wins_when_buy_also_fires() {
    let mut engine = SignalEngine::new(&IndicatorConfig::default());
    engine.on_bar(&step(9.0, 8.0, 9.5, inner(10.0, 12.0)));
    let fired = engine.on_bar(&step(11.0, 8.5, 11.5, inner(9.5, 10.5)));

    assert!(fired.buy);
    assert!(fired.reset);
    assert!(engine.state().is_clear());
}

#[test]
fn zero_offset_puts_stop_on_swing_low() {
    let cfg = IndicatorConfig {
        stop_loss_offset: 0.0,
        risk_reward_ratio: 2.0,
        ..Default::default()
    };
    let mut engine = SignalEngine::new(&cfg);
    engine.on_bar(&step(94.0, 90.0, 95.0, inner(95.0, 120.0)));
    engine.on_bar(&step(96.0, 92.0, 96.5, inner(95.0, 120.0)));

    assert_eq!(engine.state().stop_loss(), Some(90.0));
    assert_eq!(engine.state().take_profit(), Some(108.0));
}

// ── Streams ──────────────────────────────────────────────────────────

#[test]
fn dip_and_recovery_arms_long_then_breakout_resets() {
    let cfg = IndicatorConfig {
        length: 5,
        ..Default::default()
    };
    let mut bs = BandSwing::new(cfg).unwrap();
    let out = bs.run(&make_bars(&[100.0, 100.0, 100.0, 100.0, 100.0, 90.0, 99.0, 120.0]));

    // bar 5: 90 falls through lower1 (94) from a collapsed band -> reset, still Idle
    assert!(out[5].transitions.reset);
    assert_eq!(out[5].phase, SignalPhase::Idle);
    assert_approx(out[5].bands.unwrap().lower1, 94.0, 1e-9);

    // bar 6: 99 climbs back over lower1 (~93.88) while 90 < lower1[t]
    let o = &out[6];
    assert!(o.transitions.buy && !o.transitions.reset);
    assert_eq!(o.phase, SignalPhase::LongArmed);
    assert_eq!(o.entry_price, Some(99.0));
    // swing restarted at bar 6 (low = 89): stop 89 * 0.995
    assert_eq!(o.swing_low, Some(89.0));
    assert_approx(o.stop_loss.unwrap(), 88.555, 1e-9);
    assert_approx(o.take_profit.unwrap(), 114.6675, 1e-9);

    // bar 7: 120 breaks over upper1 -> reset clears everything
    let o = &out[7];
    assert!(o.transitions.reset);
    assert_eq!(o.phase, SignalPhase::Idle);
    assert_eq!(o.entry_price, None);
    assert_eq!(o.stop_loss, None);
    assert_eq!(o.take_profit, None);
    assert_eq!(o.swing_low, None);
    assert_eq!(o.swing_high, None);
}

#[test]
fn armed_levels_persist_until_reset() {
    let cfg = IndicatorConfig {
        length: 5,
        ..Default::default()
    };
    let mut bs = BandSwing::new(cfg).unwrap();
    let out = bs.run(&make_bars(&[100.0, 100.0, 100.0, 100.0, 100.0, 90.0, 99.0, 99.5, 100.0]));

    assert_eq!(out[6].phase, SignalPhase::LongArmed);
    for o in &out[7..] {
        assert_eq!(o.phase, SignalPhase::LongArmed);
        assert_eq!(o.entry_price, out[6].entry_price);
        assert_eq!(o.stop_loss, out[6].stop_loss);
        assert_eq!(o.take_profit, out[6].take_profit);
    }
}

#[test]
fn first_bar_has_no_events() {
    let mut bs = BandSwing::new(IndicatorConfig::default()).unwrap();
    let out = bs.on_bar(&make_bars(&[250.0])[0]);
    assert!(out.transitions.is_empty());
    assert_eq!(out.phase, SignalPhase::Idle);
    assert_eq!(out.swing_low, Some(249.0));
    assert_eq!(out.swing_high, Some(251.0));
}
