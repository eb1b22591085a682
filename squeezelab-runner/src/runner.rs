//! Run orchestration: load bars, fan instruments out, collect samples.
//!
//! Two entry points:
//! - `run()`: loads bars per the config, then builds. Used by the CLI.
//! - `run_from_data()`: takes pre-loaded bars. Used by tests and benchmarks.
//!
//! Each instrument is independent, so the fan-out is a plain rayon `par_iter`.
//! Results are sorted by code afterwards; output never depends on scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use squeezelab_core::domain::{InstrumentSeries, Sample};
use squeezelab_core::pipeline::BuildStats;
use squeezelab_core::{build_instrument_samples, InstrumentSamples, PipelineConfig};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{load_bars, LoadError, LoadOptions, LoadedData};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// An instrument rejected while loading or whose samples could not be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentFailure {
    pub code: String,
    pub error: String,
}

/// Complete result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub lookback: usize,
    /// Ordered by instrument code.
    pub instruments: Vec<InstrumentSamples>,
    pub failures: Vec<InstrumentFailure>,
    /// Sum of every instrument's build statistics.
    pub totals: BuildStats,
    pub data_quality_warnings: Vec<String>,
}

impl RunResult {
    pub fn sample_count(&self) -> usize {
        self.instruments.iter().map(|i| i.samples.len()).sum()
    }

    /// Every sample in instrument order, then chronological order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.instruments.iter().flat_map(|i| i.samples.iter())
    }
}

pub fn run(config: &RunConfig, opts: &LoadOptions) -> Result<RunResult, RunError> {
    config.validate()?;
    let data = load_bars(&config.input, opts)?;
    run_from_data(config, &data)
}

pub fn run_from_data(config: &RunConfig, data: &LoadedData) -> Result<RunResult, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;

    let (instruments, mut failures) = run_series(&data.series, &config.pipeline, true);
    failures.extend(data.rejected.iter().map(|r| InstrumentFailure {
        code: r.code.clone(),
        error: r.error.to_string(),
    }));
    failures.sort_by(|a, b| a.code.cmp(&b.code));

    let mut totals = BuildStats::default();
    for inst in &instruments {
        totals.merge(&inst.stats);
    }

    let mut data_quality_warnings = data.data_quality_warnings.clone();
    let min_bars = config.pipeline.lookback;
    for inst in &instruments {
        if inst.bar_count < inst.warmup + min_bars {
            data_quality_warnings.push(format!(
                "{}: {} bars cannot fill warm-up ({}) plus lookback ({})",
                inst.code, inst.bar_count, inst.warmup, min_bars
            ));
        }
    }

    info!(
        run_id = %run_id,
        instruments = instruments.len(),
        failures = failures.len(),
        entries = totals.entries,
        samples = totals.emitted,
        dropped = totals.dropped(),
        "run complete"
    );

    Ok(RunResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash: data.dataset_hash.clone(),
        has_synthetic: data.has_synthetic,
        lookback: config.pipeline.lookback,
        instruments,
        failures,
        totals,
        data_quality_warnings,
    })
}

/// Build samples for every series. A failing instrument never aborts the rest.
pub fn run_series(
    series: &[InstrumentSeries],
    config: &PipelineConfig,
    parallel: bool,
) -> (Vec<InstrumentSamples>, Vec<InstrumentFailure>) {
    let build = |s: &InstrumentSeries| {
        build_instrument_samples(s, config).map_err(|e| InstrumentFailure {
            code: s.code().to_string(),
            error: e.to_string(),
        })
    };

    let outcomes: Vec<Result<InstrumentSamples, InstrumentFailure>> = if parallel {
        series.par_iter().map(build).collect()
    } else {
        series.iter().map(build).collect()
    };

    let mut instruments = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(samples) => instruments.push(samples),
            Err(failure) => {
                warn!(code = %failure.code, error = %failure.error, "instrument failed");
                failures.push(failure);
            }
        }
    }

    instruments.sort_by(|a, b| a.code.cmp(&b.code));
    failures.sort_by(|a, b| a.code.cmp(&b.code));
    (instruments, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use crate::data_loader::{generate_synthetic_bars, RejectedSeries};
    use chrono::NaiveDate;
    use squeezelab_core::domain::split_by_instrument;

    fn synthetic_series(codes: &[&str]) -> Vec<InstrumentSeries> {
        let start = NaiveDate::from_ymd_opt(2012, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2015, 12, 31).unwrap();
        let bars = codes
            .iter()
            .flat_map(|c| generate_synthetic_bars(c, start, end))
            .collect();
        split_by_instrument(bars).unwrap()
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let series = synthetic_series(&["CCC", "AAA", "BBB"]);
        let config = PipelineConfig::new(30);
        let (par, par_fail) = run_series(&series, &config, true);
        let (seq, seq_fail) = run_series(&series, &config, false);
        assert_eq!(par, seq);
        assert!(par_fail.is_empty() && seq_fail.is_empty());
        let codes: Vec<&str> = par.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn invalid_config_is_reported_per_instrument() {
        let series = synthetic_series(&["AAA", "BBB"]);
        let (ok, failed) = run_series(&series, &PipelineConfig::new(0), true);
        assert!(ok.is_empty());
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].code, "AAA");
    }

    #[test]
    fn totals_sum_instrument_stats() {
        let series = synthetic_series(&["AAA", "BBB"]);
        let data = LoadedData {
            dataset_hash: crate::data_loader::compute_dataset_hash(&series),
            series,
            rejected: vec![],
            has_synthetic: true,
            data_quality_warnings: vec![],
        };
        let config = RunConfig::new(InputConfig::default(), PipelineConfig::new(20));
        let result = run_from_data(&config, &data).unwrap();

        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert!(result.has_synthetic);
        let emitted: usize = result.instruments.iter().map(|i| i.stats.emitted).sum();
        assert_eq!(result.totals.emitted, emitted);
        assert_eq!(result.sample_count(), emitted);
        assert_eq!(result.samples().count(), emitted);
    }

    #[test]
    fn rejected_instruments_become_failures() {
        let series = synthetic_series(&["AAA", "CCC"]);
        let data = LoadedData {
            dataset_hash: String::new(),
            series,
            rejected: vec![RejectedSeries {
                code: "BBB".into(),
                error: LoadError::MissingValue {
                    column: "high".into(),
                    line: 7,
                },
            }],
            has_synthetic: true,
            data_quality_warnings: vec![],
        };
        let config = RunConfig::new(InputConfig::default(), PipelineConfig::new(20));
        let result = run_from_data(&config, &data).unwrap();

        let codes: Vec<&str> = result.instruments.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "CCC"]);
        assert_eq!(
            result.failures,
            vec![InstrumentFailure {
                code: "BBB".into(),
                error: "line 7: column 'high' has no value".into(),
            }]
        );
    }

    #[test]
    fn short_history_is_flagged() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let series = split_by_instrument(generate_synthetic_bars("AAA", start, end)).unwrap();
        let data = LoadedData {
            dataset_hash: String::new(),
            series,
            rejected: vec![],
            has_synthetic: true,
            data_quality_warnings: vec![],
        };
        let config = RunConfig::new(InputConfig::default(), PipelineConfig::new(20));
        let result = run_from_data(&config, &data).unwrap();
        assert_eq!(result.sample_count(), 0);
        assert_eq!(result.data_quality_warnings.len(), 1);
        assert!(result.data_quality_warnings[0].starts_with("AAA:"));
    }
}
