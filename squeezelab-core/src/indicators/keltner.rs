//! Keltner Channel: simple average of close +/- k * ATR.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + k * ATR(period)
//! - Lower: middle - k * ATR(period)
//!
//! Lookback: period (ATR needs one extra bar for the first true range).

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};
use crate::indicators::sma::sma_of_series;

/// Which band of the Keltner Channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeltnerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Keltner {
    period: usize,
    multiplier: f64,
    band: KeltnerBand,
    name: String,
}

impl Keltner {
    pub fn new(band: KeltnerBand, period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Keltner period must be >= 1");
        let label = match band {
            KeltnerBand::Upper => "upper",
            KeltnerBand::Middle => "middle",
            KeltnerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("keltner_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(KeltnerBand::Upper, period, multiplier)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(KeltnerBand::Middle, period, multiplier)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(KeltnerBand::Lower, period, multiplier)
    }
}

impl Indicator for Keltner {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.band {
            KeltnerBand::Middle => self.period - 1,
            KeltnerBand::Upper | KeltnerBand::Lower => self.period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = sma_of_series(&closes, self.period);

        let sign = match self.band {
            KeltnerBand::Middle => return middle,
            KeltnerBand::Upper => 1.0,
            KeltnerBand::Lower => -1.0,
        };

        let atr = wilder_smooth(&true_range(bars), self.period);
        middle
            .iter()
            .zip(&atr)
            .map(|(&m, &a)| m + sign * self.multiplier * a)
            .collect()
    }
}
