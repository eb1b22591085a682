//! Bar loading for the runner.
//!
//! Bars come from one of three sources:
//! 1. A CSV file (`code,date,open,high,low,close,volume`, any extra columns ignored)
//! 2. A Parquet file with the same columns, validated by `BarSchema`
//! 3. `--synthetic`: a deterministic random walk per requested code
//!
//! Whatever the source, bars are split per instrument before anything else
//! sees them, then filtered by the configured codes and date bounds.
//! Synthetic data is a developer-only debug mode and is tagged as such.
//!
//! An absent column fails the whole file. An empty cell or a duplicate date
//! only rejects the instrument it belongs to; the rejection is carried next
//! to the clean series so the run can report it.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use polars::prelude::{ParquetReader, SerReader};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use squeezelab_core::data::{bars_from_frame, BarSchema, DataError, NullCell, SchemaError};
use squeezelab_core::domain::{partition_by_instrument, Bar, InstrumentSeries, SeriesError};

use crate::config::InputConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("required column '{column}' is missing")]
    MissingField { column: String },

    /// Empty CSV cell. `line` is 1-based and counts the header.
    #[error("line {line}: column '{column}' has no value")]
    MissingValue { column: String, line: u64 },

    /// Null Parquet cell. `row` is 0-based and excludes the header.
    #[error("row {row}: column '{column}' is null")]
    NullValue { column: String, row: usize },

    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet: {0}")]
    Data(#[from] DataError),

    #[error("series: {0}")]
    Series(#[from] SeriesError),

    #[error("unsupported input format: {0} (expected .csv or .parquet)")]
    UnsupportedFormat(PathBuf),

    #[error("no input path configured (set input.path or use --synthetic)")]
    NoInput,

    #[error("synthetic mode needs at least one code in input.codes")]
    NoCodes,

    #[error("no bars left after filtering by code and date")]
    NoBars,
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Generate bars for `input.codes` instead of reading `input.path`.
    pub synthetic: bool,
}

/// Synthetic range used when the input config carries no date bounds.
const SYNTHETIC_YEARS: (i32, i32) = (2010, 2019);

/// An instrument dropped while loading.
#[derive(Debug)]
pub struct RejectedSeries {
    pub code: String,
    pub error: LoadError,
}

/// Bars read from one source: clean series plus rejected instruments.
#[derive(Debug, Default)]
pub struct ParsedBars {
    /// Ordered by code.
    pub series: Vec<InstrumentSeries>,
    /// Ordered by code.
    pub rejected: Vec<RejectedSeries>,
}

impl ParsedBars {
    /// Split `bars` per instrument. Codes in `bad_rows` are rejected with
    /// their first bad row even if their remaining bars are clean.
    fn assemble(bars: Vec<Bar>, bad_rows: BTreeMap<String, LoadError>) -> Self {
        let bars = bars
            .into_iter()
            .filter(|b| !bad_rows.contains_key(&b.code))
            .collect();
        let (series, unordered) = partition_by_instrument(bars);

        let mut rejected: Vec<RejectedSeries> = bad_rows
            .into_iter()
            .map(|(code, error)| RejectedSeries { code, error })
            .chain(unordered.into_iter().map(|(code, err)| RejectedSeries {
                code,
                error: LoadError::Series(err),
            }))
            .collect();
        rejected.sort_by(|a, b| a.code.cmp(&b.code));

        Self { series, rejected }
    }
}

/// Loaded, filtered bars with provenance.
#[derive(Debug)]
pub struct LoadedData {
    /// One series per instrument, ordered by code.
    pub series: Vec<InstrumentSeries>,
    /// Instruments dropped for bad rows, ordered by code.
    pub rejected: Vec<RejectedSeries>,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub data_quality_warnings: Vec<String>,
}

impl LoadedData {
    pub fn bar_count(&self) -> usize {
        self.series.iter().map(InstrumentSeries::len).sum()
    }
}

pub fn load_bars(input: &InputConfig, opts: &LoadOptions) -> Result<LoadedData, LoadError> {
    let parsed = if opts.synthetic {
        if input.codes.is_empty() {
            return Err(LoadError::NoCodes);
        }
        let (start, end) = synthetic_range(input);
        let bars = input
            .codes
            .iter()
            .flat_map(|code| generate_synthetic_bars(code, start, end))
            .collect();
        ParsedBars::assemble(bars, BTreeMap::new())
    } else {
        let path = input.path.as_deref().ok_or(LoadError::NoInput)?;
        read_bars_file(path)?
    };

    let rejected: Vec<RejectedSeries> = parsed
        .rejected
        .into_iter()
        .filter(|r| input.wants_code(&r.code))
        .collect();
    let series = restrict(parsed.series, input)?;
    if series.is_empty() && rejected.is_empty() {
        return Err(LoadError::NoBars);
    }

    for r in &rejected {
        warn!(code = r.code.as_str(), error = %r.error, "instrument rejected");
    }
    for code in &input.codes {
        let known = series.iter().any(|s| s.code() == code)
            || rejected.iter().any(|r| &r.code == code);
        if !known {
            warn!(code = code.as_str(), "requested code not found in input");
        }
    }

    let data_quality_warnings = quality_warnings(&series);
    for w in &data_quality_warnings {
        warn!("{w}");
    }

    let loaded = LoadedData {
        dataset_hash: compute_dataset_hash(&series),
        series,
        rejected,
        has_synthetic: opts.synthetic,
        data_quality_warnings,
    };
    info!(
        instruments = loaded.series.len(),
        rejected = loaded.rejected.len(),
        bars = loaded.bar_count(),
        synthetic = loaded.has_synthetic,
        "bars loaded"
    );
    Ok(loaded)
}

/// Read a CSV or Parquet file, chosen by extension.
pub fn read_bars_file(path: &Path) -> Result<ParsedBars, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => read_csv_bars(open(path)?),
        Some("parquet") | Some("pq") => read_parquet_bars(path),
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    code: String,
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

impl CsvRow {
    /// The bar, or the code and the first empty numeric column.
    fn into_bar(self) -> Result<Bar, (String, &'static str)> {
        let values = [self.open, self.high, self.low, self.close, self.volume];
        match values {
            [Some(open), Some(high), Some(low), Some(close), Some(volume)] => Ok(Bar {
                code: self.code,
                date: self.date,
                open,
                high,
                low,
                close,
                volume,
            }),
            _ => {
                let column = BarSchema::NUMERIC
                    .iter()
                    .zip(values)
                    .find(|(_, v)| v.is_none())
                    .map_or(BarSchema::NUMERIC[0], |(name, _)| *name);
                Err((self.code, column))
            }
        }
    }
}

/// Parse raw bars from CSV. The header is checked before any row is read.
pub fn read_csv_bars<R: Read>(reader: R) -> Result<ParsedBars, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let required = std::iter::once(BarSchema::CODE)
        .chain(std::iter::once(BarSchema::DATE))
        .chain(BarSchema::NUMERIC);
    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingField {
                column: column.to_string(),
            });
        }
    }

    let mut bars = Vec::new();
    let mut bad_rows = BTreeMap::new();
    for (k, record) in rdr.deserialize::<CsvRow>().enumerate() {
        match record?.into_bar() {
            Ok(bar) => bars.push(bar),
            Err((code, column)) => {
                // Header is line 1.
                let line = k as u64 + 2;
                bad_rows.entry(code).or_insert(LoadError::MissingValue {
                    column: column.to_string(),
                    line,
                });
            }
        }
    }
    Ok(ParsedBars::assemble(bars, bad_rows))
}

pub fn read_parquet_bars(path: &Path) -> Result<ParsedBars, LoadError> {
    let file = open(path)?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| LoadError::Data(DataError::Polars(e)))?;
    let frame = bars_from_frame(&df).map_err(|e| match e {
        DataError::Schema(SchemaError::MissingColumn(column)) => LoadError::MissingField { column },
        other => LoadError::Data(other),
    })?;

    let mut bad_rows = BTreeMap::new();
    for NullCell { code, column, row } in frame.nulls {
        bad_rows.entry(code).or_insert(LoadError::NullValue {
            column: column.to_string(),
            row,
        });
    }
    Ok(ParsedBars::assemble(frame.bars, bad_rows))
}

/// Apply the code filter and date bounds, dropping instruments left empty.
fn restrict(
    series: Vec<InstrumentSeries>,
    input: &InputConfig,
) -> Result<Vec<InstrumentSeries>, LoadError> {
    let mut kept = Vec::with_capacity(series.len());
    for s in series.into_iter().filter(|s| input.wants_code(s.code())) {
        let s = if input.start.is_some() || input.end.is_some() {
            let bars = s
                .bars()
                .iter()
                .filter(|b| input.contains_date(b.date))
                .cloned()
                .collect();
            InstrumentSeries::new(s.code(), bars)?
        } else {
            s
        };
        if !s.is_empty() {
            kept.push(s);
        }
    }
    Ok(kept)
}

fn quality_warnings(series: &[InstrumentSeries]) -> Vec<String> {
    series
        .iter()
        .filter_map(|s| {
            let bad = s.bars().iter().filter(|b| !b.is_sane()).count();
            (bad > 0).then(|| format!("{}: {bad} of {} bars fail OHLC sanity checks", s.code(), s.len()))
        })
        .collect()
}

fn synthetic_range(input: &InputConfig) -> (NaiveDate, NaiveDate) {
    let (first, last) = SYNTHETIC_YEARS;
    let start = input
        .start
        .or_else(|| NaiveDate::from_ymd_opt(first, 1, 1))
        .unwrap_or(NaiveDate::MIN);
    let end = input
        .end
        .or_else(|| NaiveDate::from_ymd_opt(last, 12, 31))
        .unwrap_or(start);
    (start, end)
}

/// BLAKE3 fingerprint of every bar, instruments visited in code order.
pub fn compute_dataset_hash(series: &[InstrumentSeries]) -> String {
    let mut hasher = blake3::Hasher::new();

    let mut ordered: Vec<&InstrumentSeries> = series.iter().collect();
    ordered.sort_by(|a, b| a.code().cmp(b.code()));

    for s in ordered {
        hasher.update(s.code().as_bytes());
        for bar in s.bars() {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}

/// Deterministic random walk from 100.0, weekdays only.
///
/// The generator is seeded with the BLAKE3 hash of the code, so the same code
/// and range always produce the same bars.
pub fn generate_synthetic_bars(code: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(code.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar {
            code: code.to_string(),
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
