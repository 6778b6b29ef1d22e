//! Per-instrument analysis pipeline and the batch runner

use crate::backtest::{backtest_var, level_key, DEFAULT_CONFIDENCE_LEVELS};
use crate::data::{ReturnProvider, ReturnSeries};
use crate::diagnostics::{compute_diagnostics, DEFAULT_LAGS};
use crate::error::{AnalysisError, Result};
use crate::models::{select_best_model, VolatilityEstimator};
use crate::report::{AnalysisReport, BatchReport, InstrumentOutcome};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Instruments, sample start and test settings for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub instruments: Vec<String>,
    pub start_date: NaiveDate,
    pub diagnostic_lags: usize,
    pub confidence_levels: Vec<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            instruments: vec!["^FTSE".to_string(), "^GSPC".to_string()],
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            diagnostic_lags: DEFAULT_LAGS,
            confidence_levels: DEFAULT_CONFIDENCE_LEVELS.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            AnalysisError::ConfigError(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    /// Check that the settings can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.diagnostic_lags == 0 {
            return Err(AnalysisError::ConfigError(
                "Diagnostic lag count must be at least 1".to_string(),
            ));
        }
        if self.confidence_levels.is_empty() {
            return Err(AnalysisError::ConfigError(
                "At least one confidence level is required".to_string(),
            ));
        }

        let mut keys = Vec::with_capacity(self.confidence_levels.len());
        for &c in &self.confidence_levels {
            if !(c > 0.0 && c < 1.0) {
                return Err(AnalysisError::ConfigError(format!(
                    "Confidence level {} is outside (0, 1)",
                    c
                )));
            }
            let key = level_key(c);
            if keys.contains(&key) {
                return Err(AnalysisError::ConfigError(format!(
                    "Confidence level {} duplicates {}",
                    c, key
                )));
            }
            keys.push(key);
        }

        if self.instruments.iter().any(|id| id.trim().is_empty()) {
            return Err(AnalysisError::ConfigError(
                "Instrument ids must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

/// Select a model, test its residuals and backtest its VaR for one series
pub fn analyze_returns<E>(
    instrument: &str,
    returns: &ReturnSeries,
    estimator: &E,
    config: &PipelineConfig,
) -> Result<AnalysisReport>
where
    E: VolatilityEstimator + ?Sized,
{
    let selection = select_best_model(returns, estimator)?;
    let model = selection.model();

    let diagnostics = compute_diagnostics(
        model.standardized_residuals().values(),
        config.diagnostic_lags,
    )?;
    let var_backtest = backtest_var(
        returns,
        model.conditional_volatility(),
        &config.confidence_levels,
    )?;

    AnalysisReport::new(
        instrument,
        &selection,
        diagnostics,
        var_backtest,
        returns.len(),
    )
}

/// Fetch returns for one instrument and produce its report
pub fn run_pipeline<P, E>(
    instrument: &str,
    provider: &P,
    estimator: &E,
    config: &PipelineConfig,
) -> Result<AnalysisReport>
where
    P: ReturnProvider + ?Sized,
    E: VolatilityEstimator + ?Sized,
{
    info!(instrument, start = %config.start_date, "analyzing instrument");

    let returns = provider.fetch_returns(instrument, config.start_date)?;
    let report = analyze_returns(instrument, &returns, estimator, config)?;

    info!(
        instrument,
        selected = %report.selected_model,
        observations = report.summary.total_observations,
        "analysis complete"
    );

    Ok(report)
}

/// Run every configured instrument in order.
///
/// A failing instrument is recorded with its error message and does not stop
/// the remaining ones.
pub fn run_batch<P, E>(provider: &P, estimator: &E, config: &PipelineConfig) -> BatchReport
where
    P: ReturnProvider + ?Sized,
    E: VolatilityEstimator + ?Sized,
{
    let mut batch = BatchReport::new();

    for instrument in &config.instruments {
        let outcome = match run_pipeline(instrument, provider, estimator, config) {
            Ok(report) => InstrumentOutcome::Report(Box::new(report)),
            Err(e) => {
                warn!(instrument = %instrument, error = %e, "analysis failed");
                InstrumentOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        batch.push(instrument, outcome);
    }

    info!(
        instruments = batch.len(),
        succeeded = batch.succeeded(),
        "batch finished"
    );

    batch
}
