//! Domain types for the squeeze sample pipeline.

pub mod augmented;
pub mod bar;
pub mod sample;
pub mod series;
pub mod state;

pub use augmented::{AugmentedBar, AugmentedSeries, IndicatorColumns, WAVE_COUNT, WAVE_C_HISTOGRAM};
pub use bar::Bar;
pub use sample::{FeatureWindow, Label, Sample};
pub use series::{partition_by_instrument, split_by_instrument, InstrumentSeries, SeriesError};
pub use state::{SellReason, SqueezeState};
