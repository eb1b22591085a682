//! Component traits and the squeeze strategy built from them.
//!
//! - Indicator: full bar series in, index-aligned numeric series out
//! - Entry signal: decides whether a bar opens a candidate trade
//! - Sell-point scanner: walks forward from an entry to the bar that closes it
//!
//! Components read an `AugmentedSeries` and never mutate it.

pub mod exit;
pub mod indicator;
pub mod signal;

pub use exit::{ExitError, SellPoint, SellPointScanner};
pub use indicator::Indicator;
pub use signal::{EntrySignal, SqueezeClassifier};
