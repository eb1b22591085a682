//! Concrete indicator implementations.
//!
//! Every numeric indicator implements the `Indicator` trait from
//! `components::indicator`: full bar series in, index-aligned `Vec<f64>` out,
//! with `f64::NAN` over the warm-up prefix. The indicator pipeline composes
//! them into the columns of an `AugmentedSeries`.
//!
//! Multi-series indicators (Bollinger, Keltner) are exposed as separate named
//! instances per band, keeping the single-series trait unchanged. Squeeze state
//! is categorical and is computed by `Squeeze::states` instead.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod keltner;
pub mod momentum;
pub mod nbar_low;
pub mod sma;
pub mod squeeze;
pub mod wave;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use keltner::{Keltner, KeltnerBand};
pub use momentum::{Momentum, MomentumAverage};
pub use nbar_low::NBarLow;
pub use sma::Sma;
pub use squeeze::Squeeze;
pub use wave::{Macd, WaveHistogram};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                code: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            code: "TEST".to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
