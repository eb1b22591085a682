//! Polars frame I/O for raw bars and augmented series.

pub mod frame;
pub mod schema;

pub use frame::{augmented_to_frame, bars_from_frame, bars_to_frame, DataError, FrameBars, NullCell};
pub use schema::{BarSchema, SchemaError};
