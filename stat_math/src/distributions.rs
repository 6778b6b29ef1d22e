//! Probability distributions used by the hypothesis tests
//!
//! Thin wrappers over `statrs` that validate parameters and report failures
//! through [`MathError`] instead of panicking.

use crate::{MathError, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal};

pub use statrs::function::gamma::ln_gamma;

/// Inverse CDF of the standard normal distribution.
///
/// `p` must lie strictly inside (0, 1).
pub fn standard_normal_quantile(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Probability must be in (0, 1), got {}",
            p
        )));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Standard normal: {}", e)))?;
    Ok(normal.inverse_cdf(p))
}

/// Upper tail probability `1 - F(x)` of a chi-squared distribution
pub fn chi_squared_sf(x: f64, df: f64) -> Result<f64> {
    let chi2 = ChiSquared::new(df).map_err(|e| {
        MathError::InvalidInput(format!("Chi-squared with {} degrees of freedom: {}", df, e))
    })?;
    Ok(1.0 - chi2.cdf(x))
}

/// Upper tail probability `1 - F(x)` of a Fisher-Snedecor F distribution
pub fn f_sf(x: f64, df_num: f64, df_den: f64) -> Result<f64> {
    let f = FisherSnedecor::new(df_num, df_den).map_err(|e| {
        MathError::InvalidInput(format!(
            "F distribution with ({}, {}) degrees of freedom: {}",
            df_num, df_den, e
        ))
    })?;
    Ok(1.0 - f.cdf(x))
}
