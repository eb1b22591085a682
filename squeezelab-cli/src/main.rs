//! SqueezeLab CLI: build training samples and inspect augmented series.
//!
//! Commands:
//! - `build`: run the full pipeline from a TOML config and save artifacts
//! - `augment`: write one instrument's augmented series as CSV
//! - `config`: print a starter config with every default filled in
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `info` level), so
//! `augment` output on stdout stays clean.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use squeezelab_core::config::IndicatorConfig;
use squeezelab_core::pipeline::IndicatorPipeline;
use squeezelab_core::PipelineConfig;
use squeezelab_runner::data_loader::read_bars_file;
use squeezelab_runner::export::export_augmented_csv;
use squeezelab_runner::{run, save_artifacts, InputConfig, LoadOptions, RunConfig, RunResult};

#[derive(Parser)]
#[command(
    name = "squeezelab",
    about = "SqueezeLab CLI: squeeze-release training samples from daily bars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build samples from a TOML config and save the artifact set.
    Build {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Generate deterministic random-walk bars for `input.codes`.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Override the config's output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write the augmented series of one instrument as CSV.
    Augment {
        /// CSV or Parquet file with raw bars.
        #[arg(long)]
        input: PathBuf,

        /// Instrument code to augment.
        #[arg(long)]
        code: String,

        /// Take indicator parameters from this run config instead of the defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a run config with all defaults.
    Config {
        /// Lookback window length to put in the generated config.
        #[arg(long, default_value_t = 60)]
        lookback: usize,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            synthetic,
            output_dir,
        } => run_build(&config, synthetic, output_dir),
        Commands::Augment {
            input,
            code,
            config,
            output,
        } => run_augment(&input, &code, config.as_deref(), output.as_deref()),
        Commands::Config { lookback } => run_config(lookback),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
}

fn run_build(config_path: &Path, synthetic: bool, output_dir: Option<PathBuf>) -> Result<()> {
    let mut config = RunConfig::from_file(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let result = run(&config, &LoadOptions { synthetic })?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, &config.output_dir)?;
    info!(dir = %run_dir.display(), "artifacts saved");
    println!("Artifacts saved to: {}", run_dir.display());

    if !result.failures.is_empty() {
        bail!("{} instrument(s) failed", result.failures.len());
    }
    Ok(())
}

fn run_augment(
    input: &Path,
    code: &str,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let indicators = match config_path {
        Some(path) => {
            RunConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
                .pipeline
                .indicators
        }
        None => IndicatorConfig::default(),
    };
    indicators.validate()?;

    let parsed = read_bars_file(input)
        .with_context(|| format!("failed to read bars from {}", input.display()))?;
    if let Some(rejected) = parsed.rejected.iter().find(|r| r.code == code) {
        bail!("code '{code}' rejected: {}", rejected.error);
    }
    let series = parsed
        .series
        .into_iter()
        .find(|s| s.code() == code)
        .ok_or_else(|| anyhow!("code '{code}' not found in {}", input.display()))?;

    let pipeline = IndicatorPipeline::new(&indicators);
    let augmented = pipeline.augment(&series)?;
    let csv = export_augmented_csv(&augmented)?;

    match output {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                code,
                bars = augmented.len(),
                warmup = pipeline.warmup(),
                path = %path.display(),
                "augmented series written"
            );
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn run_config(lookback: usize) -> Result<()> {
    let config = RunConfig::new(
        InputConfig {
            path: Some(PathBuf::from("data/bars.csv")),
            ..Default::default()
        },
        PipelineConfig::new(lookback),
    );
    config.validate()?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn print_summary(result: &RunResult) {
    let t = &result.totals;
    println!();
    println!("=== Sample Build ===");
    println!("Run ID:         {}", result.run_id);
    println!("Instruments:    {}", result.instruments.len());
    println!("Lookback:       {}", result.lookback);
    println!("Entries:        {}", t.entries);
    println!("Samples:        {}", t.emitted);
    println!();
    println!("--- Dropped ---");
    println!("No exit:        {}", t.no_exit);
    println!("Short history:  {}", t.insufficient_history);
    println!("Undefined:      {}", t.undefined_window);
    if result.has_synthetic {
        println!();
        println!("WARNING: Samples based on SYNTHETIC data");
    }
    for f in &result.failures {
        println!("FAILED: {}: {}", f.code, f.error);
    }
    for warn in &result.data_quality_warnings {
        println!("WARNING: {warn}");
    }
    println!();
}
