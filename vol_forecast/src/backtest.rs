//! Parametric Value-at-Risk and its backtest
//!
//! VaR at confidence `c` is `z·σₜ` with `z = Φ⁻¹(1-c)`, a negative return
//! threshold in the same units as the returns. An exception is a day whose
//! return falls strictly below that threshold. The Kupiec proportion of
//! failures test compares the exception rate with the nominal `1-c`.

use crate::data::{align, ReturnSeries, TimeSeries};
use crate::error::{AnalysisError, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use stat_math::{chi_squared_sf, standard_normal_quantile};
use tracing::debug;

/// Confidence levels backtested when none are configured
pub const DEFAULT_CONFIDENCE_LEVELS: [f64; 2] = [0.95, 0.99];

/// Kupiec p-values below this reject correct coverage
pub const KUPIEC_SIGNIFICANCE: f64 = 0.05;

fn check_confidence_level(confidence_level: f64) -> Result<()> {
    if confidence_level > 0.0 && confidence_level < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidParameter(format!(
            "Confidence level must lie strictly between 0 and 1, got {}",
            confidence_level
        )))
    }
}

/// Report key for a confidence level, `var_95` for 0.95
pub fn level_key(confidence_level: f64) -> String {
    format!("var_{}", (confidence_level * 100.0).round() as i64)
}

/// Standard normal quantile `Φ⁻¹(1-c)` for confidence level `c`
pub fn var_quantile(confidence_level: f64) -> Result<f64> {
    check_confidence_level(confidence_level)?;
    Ok(standard_normal_quantile(1.0 - confidence_level)?)
}

/// VaR threshold for every date of the volatility series
pub fn compute_var(volatility: &TimeSeries, confidence_level: f64) -> Result<TimeSeries> {
    let z = var_quantile(confidence_level)?;
    Ok(volatility.map_values(|sigma| z * sigma))
}

/// Count dates where the return is strictly below the VaR threshold.
///
/// Only dates present in both series are considered, each once.
pub fn count_exceptions(returns: &ReturnSeries, var: &TimeSeries) -> usize {
    let aligned = align(returns, var);
    aligned
        .left
        .values()
        .iter()
        .zip(aligned.right.values())
        .filter(|(r, v)| r < v)
        .count()
}

/// Kupiec proportion-of-failures likelihood ratio test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KupiecResult {
    pub expected_exceptions: f64,
    pub observed_exceptions: usize,
    pub observed_rate: f64,
    pub lr_statistic: f64,
    pub p_value: f64,
    pub reject_null: bool,
}

/// Kupiec test for `exceptions` out of `observations` at `confidence_level`.
///
/// The likelihood ratio uses closed forms when no day or every day is an
/// exception, where the general formula would take `ln(0)`.
pub fn kupiec_test(
    exceptions: usize,
    observations: usize,
    confidence_level: f64,
) -> Result<KupiecResult> {
    check_confidence_level(confidence_level)?;

    if observations == 0 {
        return Err(AnalysisError::AlignmentEmpty(
            "Kupiec test needs at least one observation".to_string(),
        ));
    }
    if exceptions > observations {
        return Err(AnalysisError::InvalidParameter(format!(
            "Exceptions ({}) cannot exceed observations ({})",
            exceptions, observations
        )));
    }

    let p = 1.0 - confidence_level;
    let n = observations as f64;
    let x = exceptions as f64;
    let observed_rate = x / n;

    let lr_statistic = if exceptions == 0 {
        -2.0 * n * (1.0 - p).ln()
    } else if exceptions == observations {
        -2.0 * n * p.ln()
    } else {
        -2.0 * ((n - x) * ((1.0 - p) / (1.0 - observed_rate)).ln()
            + x * (p / observed_rate).ln())
    };

    let p_value = chi_squared_sf(lr_statistic, 1.0)?;

    Ok(KupiecResult {
        expected_exceptions: p * n,
        observed_exceptions: exceptions,
        observed_rate,
        lr_statistic,
        p_value,
        reject_null: p_value < KUPIEC_SIGNIFICANCE,
    })
}

/// Backtest outcome at one confidence level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarLevelResult {
    pub confidence_level: f64,
    pub total_observations: usize,
    pub exceptions: usize,
    #[serde(rename = "kupiec_test")]
    pub kupiec: KupiecResult,
}

/// Backtest outcomes in the order the levels were requested
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarBacktest {
    levels: Vec<VarLevelResult>,
}

impl VarBacktest {
    pub fn levels(&self) -> &[VarLevelResult] {
        &self.levels
    }

    /// Result for a confidence level, matched by its report key
    pub fn get(&self, confidence_level: f64) -> Option<&VarLevelResult> {
        let key = level_key(confidence_level);
        self.levels
            .iter()
            .find(|level| level_key(level.confidence_level) == key)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Serialize for VarBacktest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.levels.len()))?;
        for level in &self.levels {
            map.serialize_entry(&level_key(level.confidence_level), level)?;
        }
        map.end()
    }
}

/// Backtest the VaR implied by `volatility` against `returns` at each level.
///
/// The observation count is the size of the return/volatility date
/// intersection and is shared by every level.
pub fn backtest_var(
    returns: &ReturnSeries,
    volatility: &TimeSeries,
    confidence_levels: &[f64],
) -> Result<VarBacktest> {
    let mut seen = Vec::with_capacity(confidence_levels.len());
    for &c in confidence_levels {
        check_confidence_level(c)?;
        let key = level_key(c);
        if seen.contains(&key) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Confidence level {} duplicates report key {}",
                c, key
            )));
        }
        seen.push(key);
    }

    let total_observations = align(returns, volatility).len();
    if total_observations == 0 {
        return Err(AnalysisError::AlignmentEmpty(
            "Returns and volatility share no dates".to_string(),
        ));
    }

    let mut levels = Vec::with_capacity(confidence_levels.len());
    for &confidence_level in confidence_levels {
        let var = compute_var(volatility, confidence_level)?;
        let exceptions = count_exceptions(returns, &var);
        let kupiec = kupiec_test(exceptions, total_observations, confidence_level)?;

        debug!(
            level = %level_key(confidence_level),
            exceptions,
            expected = kupiec.expected_exceptions,
            p_value = kupiec.p_value,
            "VaR backtest"
        );

        levels.push(VarLevelResult {
            confidence_level,
            total_observations,
            exceptions,
            kupiec,
        });
    }

    Ok(VarBacktest { levels })
}
