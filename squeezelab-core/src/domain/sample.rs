//! Training samples: a feature window paired with its trade label.
//!
//! Both halves are produced together by the sample builder and never mutated
//! afterwards. A label always carries a resolved exit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AugmentedBar, SellReason};

/// `L` consecutive augmented bars ending at an entry bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWindow {
    /// Series position of the first bar in the window.
    pub start: usize,
    pub bars: Vec<AugmentedBar>,
}

impl FeatureWindow {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Series position of the last bar (the entry bar).
    pub fn end(&self) -> usize {
        self.start + self.bars.len().saturating_sub(1)
    }
}

/// Outcome of the trade opened at the window's last bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub code: String,
    pub buy_date: NaiveDate,
    pub buy_price: f64,
    pub sell_date: NaiveDate,
    pub sell_price: f64,
    pub sell_reason: SellReason,
    pub buy_position: usize,
    pub sell_position: usize,
}

impl Label {
    /// Simple return of the trade, `sell / buy - 1`.
    pub fn trade_return(&self) -> f64 {
        self.sell_price / self.buy_price - 1.0
    }

    pub fn bars_held(&self) -> usize {
        self.sell_position - self.buy_position
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub window: FeatureWindow,
    pub label: Label,
}
