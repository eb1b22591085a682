//! Squeeze classifier: momentum-gated squeeze / release detection.
//!
//! Evaluated in order:
//! 1. wave-C histogram and trend MACD must both be defined and > 0
//! 2. squeeze Ongoing at this bar → entry
//! 3. squeeze Released at this bar and Ongoing at the previous bar → entry
//!    (release edge)
//! 4. otherwise no entry
//!
//! Position 0 has no previous bar, so a Released bar there never fires.

use crate::domain::{AugmentedSeries, SqueezeState, WAVE_C_HISTOGRAM};

use super::EntrySignal;

#[derive(Debug, Clone, Copy, Default)]
pub struct SqueezeClassifier;

impl SqueezeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Momentum precondition. NaN compares false, so undefined values fail.
    fn momentum_positive(series: &AugmentedSeries, position: usize) -> bool {
        let columns = series.columns();
        let histogram = columns.wave_histograms[WAVE_C_HISTOGRAM][position];
        let trend = columns.wave_c_macd[position];
        histogram > 0.0 && trend > 0.0
    }
}

impl EntrySignal for SqueezeClassifier {
    fn name(&self) -> &str {
        "squeeze_release"
    }

    fn is_entry(&self, series: &AugmentedSeries, position: usize) -> bool {
        if position >= series.len() || !Self::momentum_positive(series, position) {
            return false;
        }

        let squeeze = &series.columns().squeeze;
        match squeeze[position] {
            SqueezeState::Ongoing => true,
            SqueezeState::Released => position > 0 && squeeze[position - 1].is_ongoing(),
        }
    }
}
