//! Conversions between Polars frames and pipeline types.
//!
//! Dates are stored as Polars `Date` (days since 1970-01-01). Frames read
//! from CSV may carry the date as an ISO `YYYY-MM-DD` string instead.
//!
//! A null cell only spoils its own row: `bars_from_frame` leaves the row out
//! and reports it against the row's instrument.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use thiserror::Error;

use super::schema::{BarSchema, SchemaError};
use crate::domain::{AugmentedSeries, Bar};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("polars: {0}")]
    Polars(#[from] PolarsError),

    #[error("row {row}: unparseable date '{value}'")]
    InvalidDate { row: usize, value: String },
}

pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_FROM_CE)
}

/// A null cell in a required column, charged to the row's instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct NullCell {
    pub code: String,
    pub column: &'static str,
    /// 0-based row in the frame.
    pub row: usize,
}

/// Raw bars of a frame. Rows with a null cell are not in `bars`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBars {
    pub bars: Vec<Bar>,
    pub nulls: Vec<NullCell>,
}

/// Read a raw bar frame into bars, in frame order.
pub fn bars_from_frame(df: &DataFrame) -> Result<FrameBars, DataError> {
    BarSchema::validate(df)?;

    let codes = df.column(BarSchema::CODE)?.str()?;
    let dates = read_dates(df.column(BarSchema::DATE)?)?;

    let numeric = BarSchema::NUMERIC
        .iter()
        .map(|name| df.column(name)?.cast(&DataType::Float64))
        .collect::<PolarsResult<Vec<Column>>>()?;
    let [open, high, low, close, volume] = [0, 1, 2, 3, 4].map(|k| numeric[k].f64());
    let (open, high, low, close, volume) = (open?, high?, low?, close?, volume?);

    let mut out = FrameBars {
        bars: Vec::with_capacity(df.height()),
        nulls: Vec::new(),
    };
    for (row, date) in dates.into_iter().enumerate() {
        let code = codes.get(row).unwrap_or_default().to_string();
        let values = [
            open.get(row),
            high.get(row),
            low.get(row),
            close.get(row),
            volume.get(row),
        ];
        match (date, values) {
            (Some(date), [Some(open), Some(high), Some(low), Some(close), Some(volume)]) => {
                out.bars.push(Bar {
                    code,
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            (date, values) => {
                let column = if date.is_none() {
                    BarSchema::DATE
                } else {
                    BarSchema::NUMERIC
                        .iter()
                        .zip(values)
                        .find(|(_, v)| v.is_none())
                        .map_or(BarSchema::NUMERIC[0], |(name, _)| *name)
                };
                out.nulls.push(NullCell { code, column, row });
            }
        }
    }

    Ok(out)
}

/// One entry per row; `None` for a null cell.
fn read_dates(column: &Column) -> Result<Vec<Option<NaiveDate>>, DataError> {
    match column.dtype() {
        DataType::Date => {
            let days = column.date()?;
            (0..column.len())
                .map(|row| match days.get(row) {
                    None => Ok(None),
                    Some(d) => days_to_date(d)
                        .map(Some)
                        .ok_or_else(|| DataError::InvalidDate {
                            row,
                            value: d.to_string(),
                        }),
                })
                .collect()
        }
        _ => {
            let text = column.str()?;
            (0..column.len())
                .map(|row| match text.get(row) {
                    None => Ok(None),
                    Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .map(Some)
                        .map_err(|_| DataError::InvalidDate {
                            row,
                            value: value.to_string(),
                        }),
                })
                .collect()
        }
    }
}

/// Raw bars in the canonical `BarSchema` layout.
pub fn bars_to_frame(bars: &[Bar]) -> PolarsResult<DataFrame> {
    let codes: Vec<&str> = bars.iter().map(|b| b.code.as_str()).collect();
    let dates: Vec<i32> = bars.iter().map(|b| date_to_days(b.date)).collect();
    let field = |f: fn(&Bar) -> f64| bars.iter().map(f).collect::<Vec<f64>>();

    DataFrame::new(vec![
        Column::new(BarSchema::CODE.into(), codes),
        Column::new(BarSchema::DATE.into(), dates).cast(&DataType::Date)?,
        Column::new("open".into(), field(|b| b.open)),
        Column::new("high".into(), field(|b| b.high)),
        Column::new("low".into(), field(|b| b.low)),
        Column::new("close".into(), field(|b| b.close)),
        Column::new("volume".into(), field(|b| b.volume)),
    ])
}

/// Augmented series as a frame: raw columns, every indicator column, and the
/// squeeze state as text. Undefined values stay NaN.
pub fn augmented_to_frame(series: &AugmentedSeries) -> PolarsResult<DataFrame> {
    let mut df = bars_to_frame(series.series().bars())?;
    let c = series.columns();

    let mut extra = vec![
        Column::new("ema_fast".into(), c.ema_fast.clone()),
        Column::new("ema_slow".into(), c.ema_slow.clone()),
        Column::new("atr".into(), c.atr.clone()),
        Column::new(
            "squeeze".into(),
            c.squeeze.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("momentum_ma".into(), c.momentum_ma.clone()),
    ];
    for (k, hist) in c.wave_histograms.iter().enumerate() {
        extra.push(Column::new(format!("wave_hist_{}", k + 1).into(), hist.clone()));
    }
    extra.push(Column::new("wave_c_macd".into(), c.wave_c_macd.clone()));
    extra.push(Column::new("adx".into(), c.adx.clone()));
    extra.push(Column::new("nbar_low".into(), c.nbar_low.clone()));

    for column in extra {
        df.with_column(column)?;
    }
    Ok(df)
}
