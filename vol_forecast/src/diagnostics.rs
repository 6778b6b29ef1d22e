//! Residual diagnostics for fitted volatility models
//!
//! All tests run on standardized residuals. A well-specified model leaves no
//! autocorrelation in the residuals (Ljung-Box), and none in their squares
//! (Ljung-Box on ε̂², ARCH-LM).

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use stat_math::{chi_squared_sf, f_sf, lag_matrix, ljung_box, ols};
use std::fmt;

/// Lag count used when none is configured
pub const DEFAULT_LAGS: usize = 10;

/// The residual tests run on every fitted model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticTest {
    LjungBox,
    LjungBoxSquared,
    ArchLm,
}

impl DiagnosticTest {
    /// Display name used in errors
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticTest::LjungBox => "Ljung-Box",
            DiagnosticTest::LjungBoxSquared => "Ljung-Box (squared residuals)",
            DiagnosticTest::ArchLm => "ARCH-LM",
        }
    }

    /// Smallest residual count the test accepts at `lags`
    pub fn required_observations(&self, lags: usize) -> usize {
        match self {
            DiagnosticTest::LjungBox | DiagnosticTest::LjungBoxSquared => lags + 1,
            // m = n - L regression rows, m - L - 1 > 0 residual degrees of freedom
            DiagnosticTest::ArchLm => 2 * lags + 2,
        }
    }

    fn check(&self, residuals: &[f64], lags: usize) -> Result<()> {
        if lags == 0 {
            return Err(AnalysisError::InsufficientObservations {
                test: self.name().to_string(),
                required: 1,
                available: 0,
            });
        }

        let required = self.required_observations(lags);
        if residuals.len() < required {
            return Err(AnalysisError::InsufficientObservations {
                test: self.name().to_string(),
                required,
                available: residuals.len(),
            });
        }

        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(self.failure("residuals contain non-finite values"));
        }

        Ok(())
    }

    fn failure<M: fmt::Display>(&self, message: M) -> AnalysisError {
        AnalysisError::Diagnostic {
            test: self.name().to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for DiagnosticTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ljung-Box statistic at the final lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjungBoxResult {
    pub test_statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

/// Engle's ARCH-LM test in both its LM and F forms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchLmResult {
    pub lm_statistic: f64,
    pub lm_p_value: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub lags: usize,
}

/// The three residual tests for one fitted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub ljung_box: LjungBoxResult,
    pub ljung_box_squared: LjungBoxResult,
    pub arch_lm: ArchLmResult,
}

fn run_ljung_box(test: DiagnosticTest, data: &[f64], lags: usize) -> Result<LjungBoxResult> {
    test.check(data, lags)?;
    let lb = ljung_box(data, lags).map_err(|e| test.failure(e))?;

    Ok(LjungBoxResult {
        test_statistic: lb.statistic,
        p_value: lb.p_value,
        lags: lb.lags,
    })
}

/// Ljung-Box test for autocorrelation in the residuals
pub fn ljung_box_test(residuals: &[f64], lags: usize) -> Result<LjungBoxResult> {
    run_ljung_box(DiagnosticTest::LjungBox, residuals, lags)
}

/// Ljung-Box test on squared residuals, sensitive to remaining ARCH effects
pub fn ljung_box_squared_test(residuals: &[f64], lags: usize) -> Result<LjungBoxResult> {
    let squared: Vec<f64> = residuals.iter().map(|r| r * r).collect();
    run_ljung_box(DiagnosticTest::LjungBoxSquared, &squared, lags)
}

/// ARCH-LM test: regress e²ₜ on a constant and `lags` of its own past values.
///
/// LM = m·R² is χ²(L) under the null; the F form has (L, m-L-1) degrees of
/// freedom, where m = n - L is the number of usable rows.
pub fn arch_lm_test(residuals: &[f64], lags: usize) -> Result<ArchLmResult> {
    let test = DiagnosticTest::ArchLm;
    test.check(residuals, lags)?;

    let squared: Vec<f64> = residuals.iter().map(|r| r * r).collect();
    let (dependent, columns) = lag_matrix(&squared, lags).map_err(|e| test.failure(e))?;
    let fit = ols(&dependent, &columns).map_err(|e| test.failure(e))?;

    let m = fit.nobs as f64;
    let lm_statistic = m * fit.r_squared;
    let f_statistic = fit.f_statistic();

    if !lm_statistic.is_finite() || !f_statistic.is_finite() {
        return Err(test.failure("regression produced a non-finite statistic"));
    }

    let lm_p_value = chi_squared_sf(lm_statistic, lags as f64).map_err(|e| test.failure(e))?;
    let f_p_value = f_sf(f_statistic, fit.df_model as f64, fit.df_resid as f64)
        .map_err(|e| test.failure(e))?;

    Ok(ArchLmResult {
        lm_statistic,
        lm_p_value,
        f_statistic,
        f_p_value,
        lags,
    })
}

/// Run all three tests in order, stopping at the first failure
pub fn compute_diagnostics(residuals: &[f64], lags: usize) -> Result<Diagnostics> {
    Ok(Diagnostics {
        ljung_box: ljung_box_test(residuals, lags)?,
        ljung_box_squared: ljung_box_squared_test(residuals, lags)?,
        arch_lm: arch_lm_test(residuals, lags)?,
    })
}
