//! Per-instrument pipeline: augment → classify → scan → window.
//!
//! `build_instrument_samples` is the single entry point used by the runner.
//! It validates the configuration, attaches indicators, and runs the sample
//! builder over one instrument's series.

pub mod precompute;
pub mod sample_builder;

pub use precompute::IndicatorPipeline;
pub use sample_builder::{BuildStats, SampleBuilder, SampleSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::components::exit::{ExitError, SellPointScanner};
use crate::config::{ConfigError, PipelineConfig};
use crate::domain::{InstrumentSeries, Sample, SeriesError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
    #[error("exit scan: {0}")]
    Exit(#[from] ExitError),
}

/// Samples and diagnostics for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSamples {
    pub code: String,
    pub samples: Vec<Sample>,
    pub stats: BuildStats,
    pub bar_count: usize,
    /// Positions before this can never be part of a sample window.
    pub warmup: usize,
}

pub fn build_instrument_samples(
    series: &InstrumentSeries,
    config: &PipelineConfig,
) -> Result<InstrumentSamples, PipelineError> {
    config.validate()?;

    let pipeline = IndicatorPipeline::new(&config.indicators);
    let augmented = pipeline.augment(series)?;

    let scanner = SellPointScanner::new(
        config.exit.stop_loss_atr_multiple,
        config.indicators.nbar_low_period,
    );
    let SampleSet { samples, stats } = SampleBuilder::new(config.lookback, scanner).build(&augmented)?;

    debug!(
        code = series.code(),
        entries = stats.entries,
        emitted = stats.emitted,
        no_exit = stats.no_exit,
        insufficient_history = stats.insufficient_history,
        undefined_window = stats.undefined_window,
        "samples built"
    );

    Ok(InstrumentSamples {
        code: series.code().to_string(),
        samples,
        stats,
        bar_count: series.len(),
        warmup: pipeline.warmup(),
    })
}
