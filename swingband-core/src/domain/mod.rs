//! Domain types for SwingBand

pub mod bar;
pub mod source;

pub use bar::Bar;
pub use source::{PriceSource, UnknownPriceSource};

/// Convert a raw arithmetic result into a defined level.
///
/// Non-finite values (NaN, ±inf) become `None` so they can never leak into
/// later arithmetic as a sentinel.
#[inline]
pub fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
