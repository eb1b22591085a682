//! MACD line and wave histogram.
//!
//! MACD = EMA(close, fast) - EMA(close, slow).
//! Histogram = MACD - EMA(MACD, slow); the signal line reuses the slow period.
//!
//! Lookbacks: MACD max(fast, slow) - 1; histogram that plus slow - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::ema::ema_of_series;

fn macd_line(bars: &[Bar], fast: usize, slow: usize) -> Vec<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast = ema_of_series(&closes, fast);
    let slow = ema_of_series(&closes, slow);
    fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1 && slow >= 1, "MACD periods must be >= 1");
        Self {
            fast,
            slow,
            name: format!("macd_{fast}_{slow}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.fast.max(self.slow) - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        macd_line(bars, self.fast, self.slow)
    }
}

#[derive(Debug, Clone)]
pub struct WaveHistogram {
    macd: Macd,
    name: String,
}

impl WaveHistogram {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            macd: Macd::new(fast, slow),
            name: format!("wave_hist_{fast}_{slow}"),
        }
    }
}

impl Indicator for WaveHistogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.macd.lookback() + self.macd.slow - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let macd = self.macd.compute(bars);
        let signal = ema_of_series(&macd, self.macd.slow);
        macd.iter().zip(&signal).map(|(m, s)| m - s).collect()
    }
}
