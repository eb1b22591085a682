//! Shared per-bar enumerations used by every stage of the pipeline.

use serde::{Deserialize, Serialize};

/// Band-squeeze state of a single bar.
///
/// `Ongoing` when the Bollinger band sits strictly inside the Keltner channel,
/// `Released` otherwise (including warm-up bars where either band is undefined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqueezeState {
    Ongoing,
    Released,
}

impl SqueezeState {
    pub fn is_ongoing(self) -> bool {
        matches!(self, Self::Ongoing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Released => "released",
        }
    }
}

/// Why a position was exited. `None` means no exit was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SellReason {
    None = 0,
    StopLoss = 1,
    NBarLowBreak = 2,
}

impl SellReason {
    /// Numeric code used in exported labels (0, 1 or 2).
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}
