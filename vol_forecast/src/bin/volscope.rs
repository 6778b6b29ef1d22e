//! Batch GARCH volatility analysis over a set of instruments
//!
//! Usage: cargo run --bin volscope -- --data-dir data --instrument ^GSPC --output reports/summary.json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vol_forecast::{run_batch, CsvPriceProvider, MaximumLikelihood, PipelineConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "GARCH(1,1) volatility, diagnostics and VaR backtests")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Instrument id, repeat for several (overrides the config list)
    #[arg(short, long = "instrument")]
    instruments: Vec<String>,

    /// First date of the sample (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Directory holding <instrument>.csv price files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Output JSON file
    #[arg(short, long, default_value = "reports/summary.json")]
    output: PathBuf,

    /// Lag count for the residual diagnostics
    #[arg(long)]
    lags: Option<usize>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if !args.instruments.is_empty() {
        config.instruments = args.instruments.clone();
    }
    if let Some(start) = args.start_date {
        config.start_date = start;
    }
    if let Some(lags) = args.lags {
        config.diagnostic_lags = lags;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&args)?;
    info!(
        instruments = ?config.instruments,
        start = %config.start_date,
        data_dir = %args.data_dir.display(),
        "starting batch"
    );

    let provider = CsvPriceProvider::new(&args.data_dir);
    let estimator = MaximumLikelihood::default();
    let batch = run_batch(&provider, &estimator, &config);

    batch
        .write_json(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        succeeded = batch.succeeded(),
        failed = batch.len() - batch.succeeded(),
        "report written"
    );

    Ok(())
}
