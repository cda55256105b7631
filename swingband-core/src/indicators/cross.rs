//! Crossover / crossunder detection between two series.
//!
//! - crossover:  a[t-1] <= b[t-1] and a[t] > b[t]
//! - crossunder: a[t-1] >= b[t-1] and a[t] < b[t]
//!
//! Only one step of history is used. Without a previous point (first bar, or
//! an undefined value on the previous bar) both predicates are false.

/// True when `a` moves from at-or-below `b` to strictly above it.
#[inline]
pub fn crossover(a_prev: f64, a_curr: f64, b_prev: f64, b_curr: f64) -> bool {
    a_prev <= b_prev && a_curr > b_curr
}

/// True when `a` moves from at-or-above `b` to strictly below it.
#[inline]
pub fn crossunder(a_prev: f64, a_curr: f64, b_prev: f64, b_curr: f64) -> bool {
    a_prev >= b_prev && a_curr < b_curr
}

/// Result of one detector step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Crossing {
    pub over: bool,
    pub under: bool,
    /// The `(a, b)` pair from the previous step, if it was defined.
    pub prev: Option<(f64, f64)>,
}

impl Crossing {
    /// Previous value of series `a`.
    pub fn prev_a(&self) -> Option<f64> {
        self.prev.map(|(a, _)| a)
    }
}

/// Stateful detector for one pair of series, fed one step at a time.
#[derive(Debug, Clone, Default)]
pub struct CrossDetector {
    prev: Option<(f64, f64)>,
}

impl CrossDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current values and evaluate both predicates against the
    /// previous step. An undefined current value yields no crossing and
    /// leaves no history for the next step.
    pub fn update(&mut self, a: Option<f64>, b: Option<f64>) -> Crossing {
        let prev = self.prev;
        let curr = a.zip(b);
        self.prev = curr;

        match (prev, curr) {
            (Some((a_prev, b_prev)), Some((a_curr, b_curr))) => Crossing {
                over: crossover(a_prev, a_curr, b_prev, b_curr),
                under: crossunder(a_prev, a_curr, b_prev, b_curr),
                prev,
            },
            _ => Crossing {
                prev,
                ..Crossing::default()
            },
        }
    }
}
