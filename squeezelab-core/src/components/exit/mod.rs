//! Exit resolution: where does a trade opened at an entry bar close?

pub mod sell_point;

pub use sell_point::SellPointScanner;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SellReason;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExitError {
    #[error("scanner expects an N-bar low over {expected} bars, series carries {found}")]
    NBarPeriodMismatch { expected: usize, found: usize },
}

/// Result of a forward exit scan.
///
/// `SellPoint::none()` (position 0, reason `None`) is the "no exit" sentinel:
/// the series ended before either exit rule triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellPoint {
    pub position: usize,
    pub reason: SellReason,
}

impl SellPoint {
    pub fn none() -> Self {
        Self {
            position: 0,
            reason: SellReason::None,
        }
    }

    pub fn is_exit(&self) -> bool {
        !self.reason.is_none()
    }
}
