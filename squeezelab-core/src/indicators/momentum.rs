//! Momentum and its moving average.
//!
//! momentum[t] = close[t] - close[t-period] (difference, not percentage).
//! The squeeze panel plots SMA(momentum, period) rather than the raw value.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::sma::sma_of_series;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for i in self.period..n {
            let prev = bars[i - self.period].close;
            let curr = bars[i].close;
            if !(prev.is_nan() || curr.is_nan()) {
                result[i] = curr - prev;
            }
        }

        result
    }
}

/// SMA(momentum(period), period). Lookback: 2 * period - 1.
#[derive(Debug, Clone)]
pub struct MomentumAverage {
    momentum: Momentum,
    name: String,
}

impl MomentumAverage {
    pub fn new(period: usize) -> Self {
        Self {
            momentum: Momentum::new(period),
            name: format!("momentum_ma_{period}"),
        }
    }
}

impl Indicator for MomentumAverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.momentum.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_of_series(&self.momentum.compute(bars), self.momentum.period)
    }
}
