//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use squeezelab_core::domain::{
    AugmentedSeries, Bar, IndicatorColumns, InstrumentSeries, SqueezeState,
};

pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

/// Deterministic pseudo-random walk with realistic OHLC spreads.
pub fn walk_bars(code: &str, n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0;
        price = (price + change).max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            code: code.to_string(),
            date: base_date() + chrono::Duration::days(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: 1000.0 + i as f64 * 10.0,
        });
    }

    bars
}

pub fn walk_series(code: &str, n: usize) -> InstrumentSeries {
    InstrumentSeries::new(code, walk_bars(code, n)).unwrap()
}

/// Series of code "TEST" with the given closes; high/low one point away.
pub fn close_series(closes: &[f64]) -> InstrumentSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            code: "TEST".to_string(),
            date: base_date() + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        })
        .collect();
    InstrumentSeries::new("TEST", bars).unwrap()
}

/// Every numeric column `value`, squeeze Released everywhere.
pub fn flat_columns(n: usize, value: f64) -> IndicatorColumns {
    IndicatorColumns {
        ema_fast: vec![value; n],
        ema_slow: vec![value; n],
        atr: vec![value; n],
        squeeze: vec![SqueezeState::Released; n],
        momentum_ma: vec![value; n],
        wave_histograms: std::array::from_fn(|_| vec![value; n]),
        wave_c_macd: vec![value; n],
        adx: vec![value; n],
        nbar_low: vec![value; n],
    }
}

pub fn augmented(closes: &[f64], columns: IndicatorColumns) -> AugmentedSeries {
    AugmentedSeries::new(close_series(closes), columns, 10).unwrap()
}
