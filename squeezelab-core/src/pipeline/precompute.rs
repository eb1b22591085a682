//! Indicator pipeline: raw series in, augmented series out.
//!
//! Every indicator is computed once over the whole instrument series and
//! stored as an index-aligned column. Nothing here reads across instruments:
//! the input is a validated `InstrumentSeries`.

use tracing::debug;

use crate::components::indicator::Indicator;
use crate::config::IndicatorConfig;
use crate::domain::{AugmentedSeries, IndicatorColumns, InstrumentSeries, SeriesError, WAVE_COUNT};
use crate::indicators::{Adx, Atr, Ema, Macd, MomentumAverage, NBarLow, Squeeze, WaveHistogram};

/// Configured set of indicators attached to every bar.
#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    ema_fast: Ema,
    ema_slow: Ema,
    atr: Atr,
    squeeze: Squeeze,
    momentum: MomentumAverage,
    waves: [WaveHistogram; WAVE_COUNT],
    trend: Macd,
    adx: Adx,
    nbar_low: NBarLow,
    nbar_low_period: usize,
}

impl IndicatorPipeline {
    /// Build the indicator set. `config` must have passed `validate()`.
    pub fn new(config: &IndicatorConfig) -> Self {
        let wave = &config.wave;
        let squeeze = &config.squeeze;
        Self {
            ema_fast: Ema::new(config.propulsion.fast_period),
            ema_slow: Ema::new(config.propulsion.slow_period),
            atr: Atr::new(config.atr_period),
            squeeze: Squeeze::new(
                squeeze.bb_period,
                squeeze.bb_multiplier,
                squeeze.kc_period,
                squeeze.kc_multiplier,
            ),
            momentum: MomentumAverage::new(squeeze.momentum_period),
            waves: std::array::from_fn(|k| WaveHistogram::new(wave.short_period, wave.long_periods[k])),
            trend: Macd::new(wave.short_period, wave.trend_period),
            adx: Adx::new(config.adx_period),
            nbar_low: NBarLow::new(config.nbar_low_period),
            nbar_low_period: config.nbar_low_period,
        }
    }

    fn numeric(&self) -> impl Iterator<Item = &dyn Indicator> {
        let head: [&dyn Indicator; 7] = [
            &self.ema_fast,
            &self.ema_slow,
            &self.atr,
            &self.momentum,
            &self.trend,
            &self.adx,
            &self.nbar_low,
        ];
        head.into_iter()
            .chain(self.waves.iter().map(|w| w as &dyn Indicator))
    }

    /// First position at which every attached column is defined, given fully
    /// defined raw input. Earlier bars can never sit inside a sample window.
    pub fn warmup(&self) -> usize {
        self.numeric()
            .map(|i| i.lookback())
            .chain(std::iter::once(self.squeeze.lookback()))
            .max()
            .unwrap_or(0)
    }

    /// Compute every column for one instrument.
    pub fn augment(&self, series: &InstrumentSeries) -> Result<AugmentedSeries, SeriesError> {
        let bars = series.bars();
        let columns = IndicatorColumns {
            ema_fast: self.ema_fast.compute(bars),
            ema_slow: self.ema_slow.compute(bars),
            atr: self.atr.compute(bars),
            squeeze: self.squeeze.states(bars),
            momentum_ma: self.momentum.compute(bars),
            wave_histograms: std::array::from_fn(|k| self.waves[k].compute(bars)),
            wave_c_macd: self.trend.compute(bars),
            adx: self.adx.compute(bars),
            nbar_low: self.nbar_low.compute(bars),
        };
        debug!(
            code = series.code(),
            bars = bars.len(),
            warmup = self.warmup(),
            "indicators attached"
        );
        AugmentedSeries::new(series.clone(), columns, self.nbar_low_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::make_series;
    use crate::domain::WAVE_C_HISTOGRAM;

    fn ramp(n: usize) -> InstrumentSeries {
        let closes: Vec<f64> = (0..n).map(|i| 50.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect();
        make_series(&closes)
    }

    #[test]
    fn default_warmup_is_longest_histogram() {
        let pipeline = IndicatorPipeline::new(&IndicatorConfig::default());
        // EMA(8) - EMA(233) defined at 232, its signal line 232 bars later
        assert_eq!(pipeline.warmup(), 464);
    }

    #[test]
    fn columns_are_aligned_and_complete_after_warmup() {
        let mut config = IndicatorConfig::default();
        config.wave.long_periods = [5, 6, 7, 9, 11];
        config.wave.trend_period = 13;
        config.wave.short_period = 3;
        let pipeline = IndicatorPipeline::new(&config);
        let series = ramp(80);
        let aug = pipeline.augment(&series).unwrap();

        assert_eq!(aug.len(), 80);
        assert_eq!(aug.nbar_low_period(), 10);
        let warmup = pipeline.warmup();
        assert!(!aug.is_complete_at(warmup - 1));
        for p in warmup..aug.len() {
            assert!(aug.is_complete_at(p), "bar {p} incomplete");
        }
    }

    #[test]
    fn wave_c_column_uses_longest_pair() {
        let mut config = IndicatorConfig::default();
        config.wave.short_period = 2;
        config.wave.long_periods = [3, 4, 5, 6, 7];
        config.wave.trend_period = 8;
        let pipeline = IndicatorPipeline::new(&config);
        let series = ramp(40);
        let aug = pipeline.augment(&series).unwrap();

        let expected = WaveHistogram::new(2, 7).compute(series.bars());
        let actual = &aug.columns().wave_histograms[WAVE_C_HISTOGRAM];
        assert_eq!(expected.len(), actual.len());
        for (e, a) in expected.iter().zip(actual) {
            assert!(e.is_nan() && a.is_nan() || e == a);
        }
    }

    #[test]
    fn empty_series_augments_to_empty() {
        let pipeline = IndicatorPipeline::new(&IndicatorConfig::default());
        let aug = pipeline.augment(&make_series(&[])).unwrap();
        assert!(aug.is_empty());
    }
}
