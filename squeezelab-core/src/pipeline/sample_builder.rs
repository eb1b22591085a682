//! Sample builder: entries, exits and feature windows for one instrument.
//!
//! For each position p in chronological order:
//! 1. entry signal false → skip
//! 2. no exit before the series ends → drop (`no_exit`)
//! 3. p + 1 < L → drop (`insufficient_history`)
//! 4. any undefined field in [p - L + 1, p] → drop (`undefined_window`)
//! 5. otherwise emit the window with its label
//!
//! Overlapping windows are not deduplicated. A series augmented with a
//! different N-bar low period than the scanner's is rejected up front.

use serde::{Deserialize, Serialize};

use crate::components::exit::{ExitError, SellPointScanner};
use crate::components::signal::{EntrySignal, SqueezeClassifier};
use crate::domain::{AugmentedSeries, FeatureWindow, Label, Sample, SellReason};

/// Why candidates were dropped. Diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Bars the entry signal accepted.
    pub entries: usize,
    pub no_exit: usize,
    pub insufficient_history: usize,
    pub undefined_window: usize,
    pub emitted: usize,
}

impl BuildStats {
    pub fn dropped(&self) -> usize {
        self.no_exit + self.insufficient_history + self.undefined_window
    }

    /// Accumulate another instrument's counters.
    pub fn merge(&mut self, other: &BuildStats) {
        self.entries += other.entries;
        self.no_exit += other.no_exit;
        self.insufficient_history += other.insufficient_history;
        self.undefined_window += other.undefined_window;
        self.emitted += other.emitted;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    pub samples: Vec<Sample>,
    pub stats: BuildStats,
}

pub struct SampleBuilder {
    lookback: usize,
    scanner: SellPointScanner,
    signal: Box<dyn EntrySignal>,
}

impl SampleBuilder {
    /// Builder using the squeeze classifier as entry signal.
    pub fn new(lookback: usize, scanner: SellPointScanner) -> Self {
        assert!(lookback >= 1, "lookback must be >= 1");
        Self {
            lookback,
            scanner,
            signal: Box::new(SqueezeClassifier::new()),
        }
    }

    pub fn with_entry_signal(mut self, signal: Box<dyn EntrySignal>) -> Self {
        self.signal = signal;
        self
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn build(&self, series: &AugmentedSeries) -> Result<SampleSet, ExitError> {
        self.scanner.check(series)?;
        let incomplete = incomplete_prefix(series);
        let mut set = SampleSet::default();

        for entry in 0..series.len() {
            if !self.signal.is_entry(series, entry) {
                continue;
            }
            set.stats.entries += 1;

            let exit = self.scanner.scan(series, entry);
            if !exit.is_exit() {
                set.stats.no_exit += 1;
                continue;
            }

            if entry + 1 < self.lookback {
                set.stats.insufficient_history += 1;
                continue;
            }
            let start = entry + 1 - self.lookback;

            if incomplete[entry + 1] != incomplete[start] {
                set.stats.undefined_window += 1;
                continue;
            }

            let Some(label) = label_for(series, entry, exit.position, exit.reason) else {
                continue;
            };
            set.samples.push(Sample {
                window: FeatureWindow {
                    start,
                    bars: series.window(start, entry),
                },
                label,
            });
            set.stats.emitted += 1;
        }

        Ok(set)
    }
}

impl std::fmt::Debug for SampleBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuilder")
            .field("lookback", &self.lookback)
            .field("scanner", &self.scanner)
            .field("signal", &self.signal.name())
            .finish()
    }
}

/// `out[p]` = number of incomplete bars among positions `0..p`.
fn incomplete_prefix(series: &AugmentedSeries) -> Vec<usize> {
    let mut out = Vec::with_capacity(series.len() + 1);
    out.push(0);
    let mut count = 0;
    for p in 0..series.len() {
        if !series.is_complete_at(p) {
            count += 1;
        }
        out.push(count);
    }
    out
}

fn label_for(
    series: &AugmentedSeries,
    buy: usize,
    sell: usize,
    reason: SellReason,
) -> Option<Label> {
    let raw = series.series();
    let (entry, exit) = (raw.bar(buy)?, raw.bar(sell)?);
    Some(Label {
        code: series.code().to_string(),
        buy_date: entry.date,
        buy_price: entry.close,
        sell_date: exit.date,
        sell_price: exit.close,
        sell_reason: reason,
        buy_position: buy,
        sell_position: sell,
    })
}
