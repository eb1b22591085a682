//! Artifact export: JSON, CSV and a Markdown summary.
//!
//! A run directory holds:
//! - `samples.json`: the full `RunResult`, schema-versioned
//! - `labels.csv`: one row per sample
//! - `windows.csv`: one row per window bar, keyed by `sample_id` and `offset`
//! - `report.md`: per-instrument counts and drop reasons
//!
//! Sample ids are assigned in `RunResult::samples()` order, starting at 0, and
//! are shared by `labels.csv` and `windows.csv`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use squeezelab_core::domain::{AugmentedBar, AugmentedSeries, SellReason};

use crate::runner::{RunResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(result: &RunResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize RunResult to JSON")
}

/// Deserialize a `RunResult`, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<RunResult> {
    let result: RunResult =
        serde_json::from_str(json).context("failed to deserialize RunResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Undefined values are written as empty cells.
fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

const BAR_PREFIX: [&str; 3] = ["code", "date", "squeeze"];

fn bar_record(bar: &AugmentedBar) -> Vec<String> {
    let mut record = vec![
        bar.code.clone(),
        bar.date.to_string(),
        bar.squeeze.as_str().to_string(),
    ];
    record.extend(bar.numeric_values().iter().map(|&v| fmt_value(v)));
    record
}

/// Columns: sample_id, code, buy_date, buy_price, sell_date, sell_price,
/// sell_reason (1 = stop loss, 2 = N-bar low break), buy_position, sell_position
pub fn export_labels_csv(result: &RunResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "sample_id",
        "code",
        "buy_date",
        "buy_price",
        "sell_date",
        "sell_price",
        "sell_reason",
        "buy_position",
        "sell_position",
    ])?;

    for (id, sample) in result.samples().enumerate() {
        let l = &sample.label;
        wtr.write_record([
            &id.to_string(),
            &l.code,
            &l.buy_date.to_string(),
            &fmt_value(l.buy_price),
            &l.sell_date.to_string(),
            &fmt_value(l.sell_price),
            &l.sell_reason.code().to_string(),
            &l.buy_position.to_string(),
            &l.sell_position.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: sample_id, offset, code, date, squeeze, then every numeric
/// augmented field. `offset` runs 0..L, the last row being the entry bar.
pub fn export_windows_csv(result: &RunResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec!["sample_id", "offset"];
    header.extend(BAR_PREFIX);
    header.extend(AugmentedBar::NUMERIC_FIELDS);
    wtr.write_record(&header)?;

    for (id, sample) in result.samples().enumerate() {
        for (offset, bar) in sample.window.bars.iter().enumerate() {
            let mut record = vec![id.to_string(), offset.to_string()];
            record.extend(bar_record(bar));
            wtr.write_record(&record)?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Every bar of one augmented series, warm-up rows included.
pub fn export_augmented_csv(series: &AugmentedSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec!["position"];
    header.extend(BAR_PREFIX);
    header.extend(AugmentedBar::NUMERIC_FIELDS);
    wtr.write_record(&header)?;

    for position in 0..series.len() {
        if let Some(bar) = series.bar(position) {
            let mut record = vec![position.to_string()];
            record.extend(bar_record(&bar));
            wtr.write_record(&record)?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set under `output_dir/run_<id prefix>/`.
///
/// The directory name is derived from the run id, so re-running an identical
/// config overwrites the same directory. Returns the directory path.
pub fn save_artifacts(result: &RunResult, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("run_{prefix}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("samples.json", export_json(result)?),
        ("labels.csv", export_labels_csv(result)?),
        ("windows.csv", export_windows_csv(result)?),
        ("report.md", generate_report(result)),
    ];
    for (name, contents) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

/// Load a `RunResult` from an artifact directory's samples.json.
pub fn load_artifacts(dir: &Path) -> Result<RunResult> {
    let path = dir.join("samples.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

pub fn generate_report(result: &RunResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Sample Build Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!("| Lookback | {} |\n", result.lookback));
    md.push_str(&format!("| Instruments | {} |\n", result.instruments.len()));
    md.push_str(&format!("| Samples | {} |\n", result.sample_count()));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    let t = &result.totals;
    md.push_str("## Candidates\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("| --- | ---: |\n");
    md.push_str(&format!("| Entries | {} |\n", t.entries));
    md.push_str(&format!("| Emitted | {} |\n", t.emitted));
    md.push_str(&format!("| No exit | {} |\n", t.no_exit));
    md.push_str(&format!("| Insufficient history | {} |\n", t.insufficient_history));
    md.push_str(&format!("| Undefined window | {} |\n", t.undefined_window));
    md.push('\n');

    md.push_str("## Instruments\n\n");
    md.push_str("| Code | Bars | Warm-up | Entries | Samples | Stop loss | N-bar low |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for inst in &result.instruments {
        let stops = inst
            .samples
            .iter()
            .filter(|s| s.label.sell_reason == SellReason::StopLoss)
            .count();
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            inst.code,
            inst.bar_count,
            inst.warmup,
            inst.stats.entries,
            inst.samples.len(),
            stops,
            inst.samples.len() - stops
        ));
    }
    md.push('\n');

    if !result.failures.is_empty() {
        md.push_str("## Failures\n\n");
        for f in &result.failures {
            md.push_str(&format!("- {}: {}\n", f.code, f.error));
        }
        md.push('\n');
    }

    if !result.data_quality_warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &result.data_quality_warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use squeezelab_core::domain::{FeatureWindow, Label, Sample, SqueezeState};
    use squeezelab_core::pipeline::BuildStats;
    use squeezelab_core::InstrumentSamples;

    fn bar(code: &str, day: u32, close: f64) -> AugmentedBar {
        AugmentedBar {
            code: code.into(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
            ema_fast: close,
            ema_slow: close,
            atr: 1.5,
            squeeze: SqueezeState::Ongoing,
            momentum_ma: 0.2,
            wave_histograms: [0.1, 0.2, 0.3, 0.4, 0.5],
            wave_c_macd: 0.7,
            adx: 25.0,
            nbar_low: close - 2.0,
        }
    }

    fn sample(code: &str, reason: SellReason) -> Sample {
        Sample {
            window: FeatureWindow {
                start: 10,
                bars: vec![bar(code, 4, 10.0), bar(code, 5, 11.0)],
            },
            label: Label {
                code: code.into(),
                buy_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                buy_price: 11.0,
                sell_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
                sell_price: 9.5,
                sell_reason: reason,
                buy_position: 11,
                sell_position: 14,
            },
        }
    }

    fn result() -> RunResult {
        let inst = |code: &str, samples: Vec<Sample>| InstrumentSamples {
            code: code.into(),
            stats: BuildStats {
                entries: 5,
                emitted: samples.len(),
                no_exit: 5 - samples.len(),
                ..Default::default()
            },
            samples,
            bar_count: 600,
            warmup: 464,
        };
        RunResult {
            schema_version: SCHEMA_VERSION,
            run_id: "ab".repeat(32),
            dataset_hash: "cd".repeat(32),
            has_synthetic: true,
            lookback: 2,
            instruments: vec![
                inst("000001", vec![sample("000001", SellReason::StopLoss)]),
                inst("600000", vec![sample("600000", SellReason::NBarLowBreak)]),
            ],
            failures: vec![],
            totals: BuildStats::default(),
            data_quality_warnings: vec!["600000: 1 of 600 bars fail OHLC sanity checks".into()],
        }
    }

    #[test]
    fn json_round_trip_and_version_gate() {
        let r = result();
        let json = export_json(&r).unwrap();
        assert_eq!(import_json(&json).unwrap(), r);

        let mut newer = r.clone();
        newer.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&newer).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn labels_csv_uses_numeric_reason_codes() {
        let csv = export_labels_csv(&result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("sample_id,code,buy_date"));
        assert_eq!(lines[1], "0,000001,2024-03-05,11,2024-03-08,9.5,1,11,14");
        assert!(lines[2].starts_with("1,600000,"));
        assert!(lines[2].contains(",2,11,14"));
    }

    #[test]
    fn windows_csv_has_one_row_per_bar() {
        let csv = export_windows_csv(&result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * 2);
        let header: Vec<&str> = lines[0].split(',').collect();
        assert_eq!(header.len(), 2 + BAR_PREFIX.len() + AugmentedBar::NUMERIC_FIELDS.len());
        assert!(lines[2].starts_with("0,1,000001,2024-03-05,ongoing,11,"));
        assert!(lines[3].starts_with("1,0,600000,"));
    }

    #[test]
    fn nan_is_an_empty_cell() {
        assert_eq!(fmt_value(f64::NAN), "");
        assert_eq!(fmt_value(2.5), "2.5");
    }

    #[test]
    fn report_lists_instruments_and_warnings() {
        let md = generate_report(&result());
        assert!(md.contains("**SYNTHETIC**"));
        assert!(md.contains("| 000001 | 600 | 464 | 5 | 1 | 1 | 0 |"));
        assert!(md.contains("| 600000 | 600 | 464 | 5 | 1 | 0 | 1 |"));
        assert!(md.contains("## Data Quality"));
        assert!(!md.contains("## Failures"));
    }
}
