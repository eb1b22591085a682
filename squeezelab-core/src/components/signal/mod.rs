//! Entry signals: decide, bar by bar, whether a candidate trade opens.
//!
//! Signals read the augmented series at and before the evaluated position.
//! They never look forward and keep no state between calls: any memory a
//! signal needs (e.g. the previous bar's squeeze state) is read back from the
//! series itself.

pub mod squeeze;

pub use squeeze::SqueezeClassifier;

use crate::domain::AugmentedSeries;

/// Trait for entry signals.
pub trait EntrySignal: Send + Sync {
    /// Human-readable name (e.g., "squeeze_release").
    fn name(&self) -> &str;

    /// True when the bar at `position` is an entry point.
    ///
    /// Must only use data from positions `0..=position`. Out-of-range
    /// positions return false.
    fn is_entry(&self, series: &AugmentedSeries, position: usize) -> bool;
}
