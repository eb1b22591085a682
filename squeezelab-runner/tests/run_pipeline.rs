//! End-to-end runs: files on disk in, artifacts on disk out.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::{Column, ParquetWriter};
use squeezelab_core::data::bars_to_frame;
use squeezelab_core::domain::Bar;
use squeezelab_core::PipelineConfig;
use squeezelab_runner::data_loader::generate_synthetic_bars;
use squeezelab_runner::{
    load_artifacts, load_bars, run, save_artifacts, InputConfig, LoadError, LoadOptions,
    RunConfig, RunError,
};
use squeezelab_core::domain::SeriesError;

const CODES: [&str; 2] = ["000001", "600000"];

fn synthetic_bars() -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2012, 1, 2).unwrap();
    let end = NaiveDate::from_ymd_opt(2015, 12, 31).unwrap();
    CODES
        .iter()
        .flat_map(|c| generate_synthetic_bars(c, start, end))
        .collect()
}

fn write_csv(dir: &Path, bars: &[Bar]) -> PathBuf {
    let path = dir.join("bars.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    for bar in bars {
        wtr.serialize(bar).unwrap();
    }
    wtr.flush().unwrap();
    path
}

fn config(path: Option<PathBuf>, lookback: usize) -> RunConfig {
    let input = InputConfig {
        path,
        codes: CODES.iter().map(|c| c.to_string()).collect(),
        start: NaiveDate::from_ymd_opt(2012, 1, 2),
        end: NaiveDate::from_ymd_opt(2015, 12, 31),
    };
    RunConfig::new(input, PipelineConfig::new(lookback))
}

#[test]
fn csv_run_matches_synthetic_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &synthetic_bars());

    let from_file = run(&config(Some(path), 20), &LoadOptions::default()).unwrap();
    let synthetic = run(&config(None, 20), &LoadOptions { synthetic: true }).unwrap();

    assert!(!from_file.has_synthetic);
    assert!(synthetic.has_synthetic);
    assert_eq!(from_file.dataset_hash, synthetic.dataset_hash);
    assert_eq!(from_file.instruments, synthetic.instruments);
    assert_ne!(from_file.run_id, synthetic.run_id);
}

#[test]
fn parquet_and_csv_load_identically() {
    let dir = tempfile::tempdir().unwrap();
    let bars = synthetic_bars();
    let csv_path = write_csv(dir.path(), &bars);

    let parquet_path = dir.path().join("bars.parquet");
    let mut df = bars_to_frame(&bars).unwrap();
    ParquetWriter::new(File::create(&parquet_path).unwrap())
        .finish(&mut df)
        .unwrap();

    let input = |path: PathBuf| InputConfig {
        path: Some(path),
        ..Default::default()
    };
    let a = load_bars(&input(csv_path), &LoadOptions::default()).unwrap();
    let b = load_bars(&input(parquet_path), &LoadOptions::default()).unwrap();
    assert_eq!(a.series.len(), 2);
    assert_eq!(a.dataset_hash, b.dataset_hash);
}

#[test]
fn artifacts_round_trip_through_disk() {
    let data_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let path = write_csv(data_dir.path(), &synthetic_bars());

    let lookback = 20;
    let result = run(&config(Some(path), lookback), &LoadOptions::default()).unwrap();
    let run_dir = save_artifacts(&result, out_dir.path()).unwrap();

    for name in ["samples.json", "labels.csv", "windows.csv", "report.md"] {
        assert!(run_dir.join(name).exists(), "{name} missing");
    }
    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.run_id, result.run_id);
    assert_eq!(loaded.dataset_hash, result.dataset_hash);
    assert_eq!(loaded.totals, result.totals);
    assert_eq!(loaded.sample_count(), result.sample_count());

    let labels = std::fs::read_to_string(run_dir.join("labels.csv")).unwrap();
    assert_eq!(labels.lines().count(), 1 + result.sample_count());

    let windows = std::fs::read_to_string(run_dir.join("windows.csv")).unwrap();
    assert_eq!(windows.lines().count(), 1 + result.sample_count() * lookback);
}

#[test]
fn every_label_resolves_after_its_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &synthetic_bars());
    let result = run(&config(Some(path), 30), &LoadOptions::default()).unwrap();

    for sample in result.samples() {
        assert_eq!(sample.window.len(), 30);
        assert_eq!(sample.window.end(), sample.label.buy_position);
        assert!(sample.label.sell_position > sample.label.buy_position);
        assert!(!sample.label.sell_reason.is_none());
        assert!(sample.window.bars.iter().all(|b| b.is_complete()));
        assert!(sample.window.bars.iter().all(|b| b.code == sample.label.code));
    }
}

#[test]
fn code_filter_limits_instruments() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &synthetic_bars());
    let mut cfg = config(Some(path), 20);
    cfg.input.codes = vec!["600000".into()];

    let result = run(&cfg, &LoadOptions::default()).unwrap();
    assert_eq!(result.instruments.len(), 1);
    assert_eq!(result.instruments[0].code, "600000");
}

#[test]
fn missing_column_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bars.csv");
    std::fs::write(&path, "code,date,open,high,low,volume\nA,2024-01-02,1,2,0.5,10\n").unwrap();

    let err = run(&config(Some(path), 20), &LoadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        RunError::Data(LoadError::MissingField { ref column }) if column == "close"
    ));
}

/// Append raw CSV lines to a file written by `write_csv`.
fn append_lines(path: &Path, lines: &str) {
    let mut text = std::fs::read_to_string(path).unwrap();
    text.push_str(lines);
    std::fs::write(path, text).unwrap();
}

#[test]
fn empty_cell_fails_only_its_instrument() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &synthetic_bars());
    // Header is line 1, so the appended row sits right after every bar.
    let line = synthetic_bars().len() + 2;
    append_lines(&path, "600000,2013-03-04,10,,9,10,1000\n");

    let input = config(Some(path.clone()), 20).input;
    let loaded = load_bars(&input, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.series.len(), 1);
    assert_eq!(loaded.series[0].code(), "000001");
    assert_eq!(loaded.rejected.len(), 1);
    assert!(matches!(
        loaded.rejected[0].error,
        LoadError::MissingValue { ref column, line: l } if column == "high" && l == line as u64
    ));

    let result = run(&config(Some(path), 20), &LoadOptions::default()).unwrap();
    assert_eq!(result.instruments.len(), 1);
    assert_eq!(result.instruments[0].code, "000001");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].code, "600000");
    assert_eq!(
        result.failures[0].error,
        format!("line {line}: column 'high' has no value")
    );
}

#[test]
fn duplicate_date_fails_only_its_instrument() {
    let dir = tempfile::tempdir().unwrap();
    let bars = synthetic_bars();
    let clean = run(&config(Some(write_csv(dir.path(), &bars)), 20), &LoadOptions::default())
        .unwrap();

    let path = write_csv(dir.path(), &bars);
    let first = bars.iter().find(|b| b.code == "600000").unwrap();
    append_lines(
        &path,
        &format!("600000,{},10,11,9,10,1000\n", first.date.format("%Y-%m-%d")),
    );

    let result = run(&config(Some(path.clone()), 20), &LoadOptions::default()).unwrap();
    assert_eq!(result.instruments.len(), 1);
    assert_eq!(result.instruments[0], clean.instruments[0]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].code, "600000");

    let loaded = load_bars(&config(Some(path), 20).input, &LoadOptions::default()).unwrap();
    assert!(matches!(
        loaded.rejected[0].error,
        LoadError::Series(SeriesError::NotStrictlyIncreasing { .. })
    ));
}

#[test]
fn parquet_null_cell_fails_only_its_instrument() {
    let dir = tempfile::tempdir().unwrap();
    let bars = synthetic_bars();
    let bad_row = bars.iter().position(|b| b.code == "600000").unwrap() + 3;

    let mut df = bars_to_frame(&bars).unwrap();
    let high: Vec<Option<f64>> = bars
        .iter()
        .enumerate()
        .map(|(row, b)| (row != bad_row).then_some(b.high))
        .collect();
    df.with_column(Column::new("high".into(), high)).unwrap();

    let path = dir.path().join("bars.parquet");
    ParquetWriter::new(File::create(&path).unwrap())
        .finish(&mut df)
        .unwrap();

    let result = run(&config(Some(path), 20), &LoadOptions::default()).unwrap();
    assert_eq!(result.instruments.len(), 1);
    assert_eq!(result.instruments[0].code, "000001");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].code, "600000");
    assert_eq!(
        result.failures[0].error,
        format!("row {bad_row}: column 'high' is null")
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(Some(dir.path().join("absent.csv")), 20);
    let err = run(&cfg, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RunError::Data(LoadError::Io { .. })));
}
