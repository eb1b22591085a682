//! SqueezeLab Core: indicators, squeeze entry signal, exit scanner, sample builder.
//!
//! This crate turns one instrument's daily bars into labelled training samples:
//! - Domain types (bars, ordered series, augmented series, samples)
//! - Indicator implementations behind a single `Indicator` trait
//! - Squeeze classifier and sell-point scanner
//! - Sample builder with per-instrument drop diagnostics
//! - Polars frame conversion for raw and augmented data
//!
//! No I/O happens here; the runner crate loads bars and writes results.

pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{build_instrument_samples, InstrumentSamples, PipelineError};
