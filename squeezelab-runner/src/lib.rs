//! SqueezeLab Runner: batch orchestration around the core pipeline.
//!
//! This crate builds on `squeezelab-core` to provide:
//! - Run configuration (TOML) with a content-addressed run id
//! - Bar loading from CSV, Parquet or a synthetic random walk
//! - Per-instrument fan-out with rayon and deterministic result ordering
//! - Artifact export (JSON, labels/windows CSV, Markdown report)

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{ConfigError, InputConfig, RunConfig, RunId};
pub use data_loader::{load_bars, LoadError, LoadOptions, LoadedData, ParsedBars, RejectedSeries};
pub use export::{load_artifacts, save_artifacts};
pub use runner::{run, run_from_data, InstrumentFailure, RunError, RunResult, SCHEMA_VERSION};
