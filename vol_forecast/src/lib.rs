//! # Vol Forecast
//!
//! A Rust library for conditional volatility modelling of daily index returns.
//!
//! ## Features
//!
//! - Dated return series built from CSV price files (adjusted close preferred)
//! - GARCH(1,1) estimation under normal and Student-t errors
//! - Model selection by AIC
//! - Residual diagnostics (Ljung-Box, Ljung-Box on squares, ARCH-LM)
//! - Parametric VaR backtesting with the Kupiec proportion of failures test
//! - A batch runner that isolates per-instrument failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vol_forecast::{run_batch, CsvPriceProvider, MaximumLikelihood, PipelineConfig};
//!
//! # fn main() -> vol_forecast::Result<()> {
//! let provider = CsvPriceProvider::new("data");
//! let estimator = MaximumLikelihood::default();
//! let config = PipelineConfig::default();
//!
//! // One entry per instrument: a full report or the error that stopped it
//! let batch = run_batch(&provider, &estimator, &config);
//! batch.write_json("reports/summary.json")?;
//! # Ok(())
//! # }
//! ```

pub mod backtest;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use crate::backtest::{backtest_var, kupiec_test, KupiecResult, VarBacktest, VarLevelResult};
pub use crate::data::{align, CsvPriceProvider, DataLoader, ReturnProvider, ReturnSeries, TimeSeries};
pub use crate::diagnostics::{compute_diagnostics, Diagnostics};
pub use crate::error::{AnalysisError, Result};
pub use crate::models::{
    select_best_model, Distribution, FittedModel, GarchParams, MaximumLikelihood,
    ModelSelection, VolatilityEstimator,
};
pub use crate::pipeline::{analyze_returns, run_batch, run_pipeline, PipelineConfig};
pub use crate::report::{AnalysisReport, BatchReport, InstrumentOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
