//! # Volscope
//!
//! `volscope` bundles the workspace crates: statistical primitives in
//! [`stat_math`] and the GARCH volatility pipeline in [`vol_forecast`].
//!
//! ## Example
//!
//! ```
//! use volscope::vol_forecast::backtest::{kupiec_test, var_quantile};
//!
//! let z = var_quantile(0.95).unwrap();
//! assert!(z < 0.0);
//!
//! let kupiec = kupiec_test(0, 250, 0.99).unwrap();
//! assert_eq!(kupiec.observed_exceptions, 0);
//! assert!((kupiec.expected_exceptions - 2.5).abs() < 1e-9);
//! ```

pub use stat_math;
pub use vol_forecast;

pub use vol_forecast::{
    run_batch, AnalysisError, AnalysisReport, BatchReport, CsvPriceProvider, Distribution,
    MaximumLikelihood, PipelineConfig, VolatilityEstimator,
};
