//! Augmented series: raw bars plus index-aligned indicator columns.
//!
//! Columns are stored struct-of-arrays; `bar(p)` materialises a fixed-schema
//! [`AugmentedBar`] record for feature windows and exports. Undefined values
//! (indicator warm-up) are `f64::NAN`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{InstrumentSeries, SeriesError, SqueezeState};

/// Number of wave histograms attached to every bar.
pub const WAVE_COUNT: usize = 5;

/// Index of the long-horizon (wave C) histogram in `wave_histograms`.
pub const WAVE_C_HISTOGRAM: usize = WAVE_COUNT - 1;

/// Derived columns, one value per bar of the underlying series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorColumns {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    /// ATR used for the stop-loss distance.
    pub atr: Vec<f64>,
    pub squeeze: Vec<SqueezeState>,
    pub momentum_ma: Vec<f64>,
    pub wave_histograms: [Vec<f64>; WAVE_COUNT],
    /// MACD over the longest period; positivity gate only, no histogram.
    pub wave_c_macd: Vec<f64>,
    pub adx: Vec<f64>,
    /// Lowest low of the previous N bars (never includes the bar itself).
    pub nbar_low: Vec<f64>,
}

impl IndicatorColumns {
    fn check_lengths(&self, expected: usize) -> Result<(), SeriesError> {
        let mut lengths: Vec<(&'static str, usize)> = vec![
            ("ema_fast", self.ema_fast.len()),
            ("ema_slow", self.ema_slow.len()),
            ("atr", self.atr.len()),
            ("squeeze", self.squeeze.len()),
            ("momentum_ma", self.momentum_ma.len()),
            ("wave_c_macd", self.wave_c_macd.len()),
            ("adx", self.adx.len()),
            ("nbar_low", self.nbar_low.len()),
        ];
        lengths.extend(
            self.wave_histograms
                .iter()
                .map(|h| ("wave_histogram", h.len())),
        );

        match lengths.into_iter().find(|&(_, found)| found != expected) {
            Some((column, found)) => Err(SeriesError::ColumnLength {
                column,
                expected,
                found,
            }),
            None => Ok(()),
        }
    }
}

/// A series together with its derived indicator columns.
#[derive(Debug, Clone)]
pub struct AugmentedSeries {
    series: InstrumentSeries,
    columns: IndicatorColumns,
    nbar_low_period: usize,
}

impl AugmentedSeries {
    /// Attach columns to a series. Every column must have one value per bar.
    pub fn new(
        series: InstrumentSeries,
        columns: IndicatorColumns,
        nbar_low_period: usize,
    ) -> Result<Self, SeriesError> {
        columns.check_lengths(series.len())?;
        Ok(Self {
            series,
            columns,
            nbar_low_period,
        })
    }

    pub fn series(&self) -> &InstrumentSeries {
        &self.series
    }

    pub fn columns(&self) -> &IndicatorColumns {
        &self.columns
    }

    pub fn code(&self) -> &str {
        self.series.code()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Window size the `nbar_low` column was computed with.
    pub fn nbar_low_period(&self) -> usize {
        self.nbar_low_period
    }

    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.series.position_of(date)
    }

    /// Close at position `p`, NaN when out of range.
    pub fn close(&self, position: usize) -> f64 {
        self.series.bar(position).map_or(f64::NAN, |b| b.close)
    }

    /// Fixed-schema record for the bar at position `p`.
    pub fn bar(&self, position: usize) -> Option<AugmentedBar> {
        let raw = self.series.bar(position)?;
        let c = &self.columns;
        Some(AugmentedBar {
            code: raw.code.clone(),
            date: raw.date,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
            ema_fast: c.ema_fast[position],
            ema_slow: c.ema_slow[position],
            atr: c.atr[position],
            squeeze: c.squeeze[position],
            momentum_ma: c.momentum_ma[position],
            wave_histograms: std::array::from_fn(|k| c.wave_histograms[k][position]),
            wave_c_macd: c.wave_c_macd[position],
            adx: c.adx[position],
            nbar_low: c.nbar_low[position],
        })
    }

    /// Records for positions `start..=end`. Empty if the range is out of bounds.
    pub fn window(&self, start: usize, end: usize) -> Vec<AugmentedBar> {
        if start > end || end >= self.len() {
            return Vec::new();
        }
        (start..=end).filter_map(|p| self.bar(p)).collect()
    }

    /// True when every numeric field of bar `p` is defined.
    pub fn is_complete_at(&self, position: usize) -> bool {
        self.bar(position).is_some_and(|b| b.is_complete())
    }
}

/// One augmented bar: raw OHLCV plus every attached indicator field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedBar {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub atr: f64,
    pub squeeze: SqueezeState,
    pub momentum_ma: f64,
    pub wave_histograms: [f64; WAVE_COUNT],
    pub wave_c_macd: f64,
    pub adx: f64,
    pub nbar_low: f64,
}

impl AugmentedBar {
    /// Column names of [`AugmentedBar::numeric_values`], in order.
    pub const NUMERIC_FIELDS: [&'static str; 17] = [
        "open",
        "high",
        "low",
        "close",
        "volume",
        "ema_fast",
        "ema_slow",
        "atr",
        "momentum_ma",
        "wave_hist_1",
        "wave_hist_2",
        "wave_hist_3",
        "wave_hist_4",
        "wave_hist_5",
        "wave_c_macd",
        "adx",
        "nbar_low",
    ];

    pub fn numeric_values(&self) -> [f64; 17] {
        let h = &self.wave_histograms;
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ema_fast,
            self.ema_slow,
            self.atr,
            self.momentum_ma,
            h[0],
            h[1],
            h[2],
            h[3],
            h[4],
            self.wave_c_macd,
            self.adx,
            self.nbar_low,
        ]
    }

    /// False if any numeric field is undefined.
    pub fn is_complete(&self) -> bool {
        self.numeric_values().iter().all(|v| !v.is_nan())
    }
}
