//! Pipeline configuration.
//!
//! Every indicator period and multiplier has a default; the lookback length
//! does not and must be supplied by the caller. `validate()` runs before any
//! indicator is constructed, so indicator constructors can assert on their
//! inputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::WAVE_COUNT;

/// Configuration errors, reported before any computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("lookback must be at least 1")]
    ZeroLookback,

    #[error("period '{0}' must be at least 1")]
    ZeroPeriod(&'static str),

    #[error("multiplier '{name}' must be positive and finite, got {value}")]
    NonPositiveMultiplier { name: &'static str, value: f64 },

    #[error("wave periods must strictly increase: short {short}, long {long:?}, trend {trend}")]
    WavePeriodsNotIncreasing {
        short: usize,
        long: [usize; WAVE_COUNT],
        trend: usize,
    },
}

/// Full configuration for one instrument's sample build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Feature window length L. Required.
    pub lookback: usize,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub exit: ExitConfig,
}

impl PipelineConfig {
    /// Default indicators and exit rules with the given lookback.
    pub fn new(lookback: usize) -> Self {
        Self {
            lookback,
            indicators: IndicatorConfig::default(),
            exit: ExitConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback == 0 {
            return Err(ConfigError::ZeroLookback);
        }
        self.indicators.validate()?;
        self.exit.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub propulsion: PropulsionConfig,
    pub squeeze: SqueezeConfig,
    pub wave: WaveConfig,
    pub adx_period: usize,
    /// ATR attached to each bar for the stop-loss distance.
    pub atr_period: usize,
    pub nbar_low_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            propulsion: PropulsionConfig::default(),
            squeeze: SqueezeConfig::default(),
            wave: WaveConfig::default(),
            adx_period: 14,
            atr_period: 14,
            nbar_low_period: 10,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("propulsion.fast_period", self.propulsion.fast_period),
            ("propulsion.slow_period", self.propulsion.slow_period),
            ("squeeze.bb_period", self.squeeze.bb_period),
            ("squeeze.kc_period", self.squeeze.kc_period),
            ("squeeze.momentum_period", self.squeeze.momentum_period),
            ("wave.short_period", self.wave.short_period),
            ("adx_period", self.adx_period),
            ("atr_period", self.atr_period),
            ("nbar_low_period", self.nbar_low_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ConfigError::ZeroPeriod(name));
        }

        check_multiplier("squeeze.bb_multiplier", self.squeeze.bb_multiplier)?;
        check_multiplier("squeeze.kc_multiplier", self.squeeze.kc_multiplier)?;
        self.wave.validate()
    }
}

/// Fast / slow EMA pair attached as `ema_fast` / `ema_slow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropulsionConfig {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for PropulsionConfig {
    fn default() -> Self {
        Self {
            fast_period: 8,
            slow_period: 21,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqueezeConfig {
    pub bb_period: usize,
    pub bb_multiplier: f64,
    pub kc_period: usize,
    pub kc_multiplier: f64,
    pub momentum_period: usize,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_multiplier: 1.5,
            kc_period: 20,
            kc_multiplier: 1.5,
            momentum_period: 12,
        }
    }
}

/// MACD period ladder. Histogram `k` uses (short, long[k]); the trend MACD
/// uses (short, trend) and has no histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub short_period: usize,
    pub long_periods: [usize; WAVE_COUNT],
    pub trend_period: usize,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            short_period: 8,
            long_periods: [34, 55, 89, 144, 233],
            trend_period: 377,
        }
    }
}

impl WaveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ladder = std::iter::once(self.short_period)
            .chain(self.long_periods)
            .chain(std::iter::once(self.trend_period))
            .collect::<Vec<_>>();
        if ladder.windows(2).all(|w| w[0] < w[1]) {
            Ok(())
        } else {
            Err(ConfigError::WavePeriodsNotIncreasing {
                short: self.short_period,
                long: self.long_periods,
                trend: self.trend_period,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Stop distance below the entry close, in entry-bar ATRs.
    pub stop_loss_atr_multiple: f64,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            stop_loss_atr_multiple: 2.0,
        }
    }
}

impl ExitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_multiplier("exit.stop_loss_atr_multiple", self.stop_loss_atr_multiple)
    }
}

fn check_multiplier(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveMultiplier { name, value })
    }
}
