//! Ordered, single-instrument bar series.
//!
//! A series is addressed two ways: by position (`bar(p)`) and by timestamp
//! (`position_of(date)`). The timestamp index is built once at construction;
//! every window and scan operation downstream works on positions only.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use thiserror::Error;

use super::Bar;

/// Errors raised while assembling a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {position} belongs to '{found}' but the series is '{expected}'")]
    MixedInstruments {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("bar {position} dated {date} does not follow {previous}")]
    NotStrictlyIncreasing {
        position: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("column '{column}' has {found} values for {expected} bars")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Chronologically ordered bars of exactly one instrument.
#[derive(Debug, Clone)]
pub struct InstrumentSeries {
    code: String,
    bars: Vec<Bar>,
    positions: HashMap<NaiveDate, usize>,
}

impl InstrumentSeries {
    /// Build a series, rejecting foreign bars and non-increasing dates.
    pub fn new(code: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let code = code.into();
        let mut positions = HashMap::with_capacity(bars.len());

        for (position, bar) in bars.iter().enumerate() {
            if bar.code != code {
                return Err(SeriesError::MixedInstruments {
                    expected: code,
                    found: bar.code.clone(),
                    position,
                });
            }
            if position > 0 {
                let previous = bars[position - 1].date;
                if bar.date <= previous {
                    return Err(SeriesError::NotStrictlyIncreasing {
                        position,
                        previous,
                        date: bar.date,
                    });
                }
            }
            positions.insert(bar.date, position);
        }

        Ok(Self {
            code,
            bars,
            positions,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bar at position `p`.
    pub fn bar(&self, position: usize) -> Option<&Bar> {
        self.bars.get(position)
    }

    /// Position of the bar dated `date`.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.positions.get(&date).copied()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Partition a combined bar list into one series per instrument.
///
/// Bars may arrive interleaved (several instruments concatenated by a fetch
/// step). Each instrument's bars are sorted by date and validated on their
/// own, so rolling computations never cross an instrument boundary and one
/// bad instrument never rejects the others. Both outputs are ordered by code.
pub fn partition_by_instrument(
    bars: Vec<Bar>,
) -> (Vec<InstrumentSeries>, Vec<(String, SeriesError)>) {
    let mut grouped: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
    for bar in bars {
        grouped.entry(bar.code.clone()).or_default().push(bar);
    }

    let mut series = Vec::with_capacity(grouped.len());
    let mut rejected = Vec::new();
    for (code, mut bars) in grouped {
        bars.sort_by_key(|b| b.date);
        match InstrumentSeries::new(code.clone(), bars) {
            Ok(s) => series.push(s),
            Err(err) => rejected.push((code, err)),
        }
    }
    (series, rejected)
}

/// Strict `partition_by_instrument`: the first rejected instrument fails the
/// whole split.
pub fn split_by_instrument(bars: Vec<Bar>) -> Result<Vec<InstrumentSeries>, SeriesError> {
    let (series, rejected) = partition_by_instrument(bars);
    match rejected.into_iter().next() {
        Some((_, err)) => Err(err),
        None => Ok(series),
    }
}
