//! Squeeze state: Bollinger Bands relative to the Keltner Channel.
//!
//! Ongoing when the Bollinger band sits strictly inside the channel:
//! lower BB > lower KC and upper BB < upper KC. Anything else, including an
//! undefined band during warm-up, is Released.

use crate::components::indicator::Indicator;
use crate::domain::{Bar, SqueezeState};
use crate::indicators::{Bollinger, Keltner};

#[derive(Debug, Clone)]
pub struct Squeeze {
    bb_upper: Bollinger,
    bb_lower: Bollinger,
    kc_upper: Keltner,
    kc_lower: Keltner,
}

impl Squeeze {
    pub fn new(bb_period: usize, bb_multiplier: f64, kc_period: usize, kc_multiplier: f64) -> Self {
        Self {
            bb_upper: Bollinger::upper(bb_period, bb_multiplier),
            bb_lower: Bollinger::lower(bb_period, bb_multiplier),
            kc_upper: Keltner::upper(kc_period, kc_multiplier),
            kc_lower: Keltner::lower(kc_period, kc_multiplier),
        }
    }

    /// Bars before this position are Released by construction.
    pub fn lookback(&self) -> usize {
        self.bb_upper.lookback().max(self.kc_upper.lookback())
    }

    /// One state per bar.
    pub fn states(&self, bars: &[Bar]) -> Vec<SqueezeState> {
        let bb_upper = self.bb_upper.compute(bars);
        let bb_lower = self.bb_lower.compute(bars);
        let kc_upper = self.kc_upper.compute(bars);
        let kc_lower = self.kc_lower.compute(bars);

        (0..bars.len())
            .map(|i| classify(bb_upper[i], bb_lower[i], kc_upper[i], kc_lower[i]))
            .collect()
    }
}

/// NaN comparisons are false, so an undefined band falls through to Released.
fn classify(bb_upper: f64, bb_lower: f64, kc_upper: f64, kc_lower: f64) -> SqueezeState {
    if bb_lower > kc_lower && bb_upper < kc_upper {
        SqueezeState::Ongoing
    } else {
        SqueezeState::Released
    }
}
