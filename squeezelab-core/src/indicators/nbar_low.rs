//! Lagged N-bar low.
//!
//! value[t] = min(low[t-n..t]): the lowest low of the `n` bars strictly
//! before `t`. The bar's own low never contributes.
//!
//! Lookback: n.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct NBarLow {
    n: usize,
    name: String,
}

impl NBarLow {
    pub fn new(n: usize) -> Self {
        assert!(n >= 1, "N-bar low window must be >= 1");
        Self {
            n,
            name: format!("nbar_low_{n}"),
        }
    }
}

impl Indicator for NBarLow {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let len = bars.len();
        let mut result = vec![f64::NAN; len];

        for i in self.n..len {
            let window = &bars[i - self.n..i];
            if window.iter().any(|b| b.low.is_nan()) {
                continue;
            }
            result[i] = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        }

        result
    }
}
