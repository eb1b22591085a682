//! Indicator trait.
//!
//! Indicators are pure functions: bar history in, numeric series out. The
//! indicator pipeline computes each one once per instrument and stores the
//! result as a column of the augmented series.

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warm-up).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_8", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading positions left undefined on a fully defined input.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}
