//! Sell-point scanner: first exit after an entry, stop loss before breakdown.
//!
//! stop = entry close - multiple * ATR(entry). For each bar after the entry,
//! in order:
//! 1. close <= stop → StopLoss
//! 2. close <= N-bar low attached to that bar → NBarLowBreak
//!
//! Rule 1 wins a same-bar tie. The scan is a single forward pass and never
//! revisits a bar.
//!
//! The scanner is configured with N and only accepts series whose `nbar_low`
//! column was computed over the same N.

use tracing::trace;

use crate::domain::{AugmentedSeries, SellReason};

use super::{ExitError, SellPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellPointScanner {
    stop_loss_atr_multiple: f64,
    nbar_low_period: usize,
}

impl SellPointScanner {
    pub fn new(stop_loss_atr_multiple: f64, nbar_low_period: usize) -> Self {
        Self {
            stop_loss_atr_multiple,
            nbar_low_period,
        }
    }

    pub fn stop_loss_atr_multiple(&self) -> f64 {
        self.stop_loss_atr_multiple
    }

    pub fn nbar_low_period(&self) -> usize {
        self.nbar_low_period
    }

    /// Reject a series whose N-bar low was computed over a different N.
    pub fn check(&self, series: &AugmentedSeries) -> Result<(), ExitError> {
        if series.nbar_low_period() != self.nbar_low_period {
            return Err(ExitError::NBarPeriodMismatch {
                expected: self.nbar_low_period,
                found: series.nbar_low_period(),
            });
        }
        Ok(())
    }

    /// Stop price for an entry at `entry`. NaN if the entry ATR is undefined.
    pub fn stop_price(&self, series: &AugmentedSeries, entry: usize) -> f64 {
        let atr = series.columns().atr.get(entry).copied().unwrap_or(f64::NAN);
        series.close(entry) - self.stop_loss_atr_multiple * atr
    }

    /// Scan positions `entry + 1..` for the first exit.
    ///
    /// Returns `SellPoint::none()` when nothing triggers before the series
    /// ends. An undefined stop or N-bar low never triggers its rule.
    pub fn scan(&self, series: &AugmentedSeries, entry: usize) -> SellPoint {
        let stop = self.stop_price(series, entry);
        let nbar_low = &series.columns().nbar_low;

        for position in entry + 1..series.len() {
            let close = series.close(position);
            if close <= stop {
                trace!(code = series.code(), entry, position, stop, "stop loss hit");
                return SellPoint {
                    position,
                    reason: SellReason::StopLoss,
                };
            }
            if close <= nbar_low[position] {
                trace!(code = series.code(), entry, position, "n-bar low broken");
                return SellPoint {
                    position,
                    reason: SellReason::NBarLowBreak,
                };
            }
        }

        SellPoint::none()
    }
}

impl Default for SellPointScanner {
    fn default() -> Self {
        Self::new(2.0, 10)
    }
}
