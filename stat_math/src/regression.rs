//! Ordinary least squares with an intercept

use crate::descriptive::mean;
use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Fitted OLS regression
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Intercept first, then one coefficient per regressor
    pub coefficients: Vec<f64>,
    /// Centered coefficient of determination
    pub r_squared: f64,
    /// Number of observations used
    pub nobs: usize,
    /// Number of regressors excluding the intercept
    pub df_model: usize,
    /// Residual degrees of freedom
    pub df_resid: usize,
}

impl OlsFit {
    /// F statistic for the joint significance of all non-intercept regressors
    pub fn f_statistic(&self) -> f64 {
        (self.r_squared / self.df_model as f64)
            / ((1.0 - self.r_squared) / self.df_resid as f64)
    }
}

/// Regress `y` on a constant and the given regressor columns.
///
/// Each entry of `regressors` is one column and must have `y.len()` rows.
pub fn ols(y: &[f64], regressors: &[Vec<f64>]) -> Result<OlsFit> {
    let nobs = y.len();
    let k = regressors.len() + 1;

    if let Some(col) = regressors.iter().find(|c| c.len() != nobs) {
        return Err(MathError::InvalidInput(format!(
            "Regressor has {} rows but dependent variable has {}",
            col.len(),
            nobs
        )));
    }

    if nobs <= k {
        return Err(MathError::InsufficientData(format!(
            "OLS with {} coefficients needs more than {} observations, have {}",
            k, k, nobs
        )));
    }

    let x = DMatrix::from_fn(nobs, k, |i, j| if j == 0 { 1.0 } else { regressors[j - 1][i] });
    let yv = DVector::from_column_slice(y);

    let xt = x.transpose();
    let xtx = &xt * &x;
    let xty = &xt * &yv;

    let beta = xtx.lu().solve(&xty).ok_or_else(|| {
        MathError::CalculationError("Regressor matrix is singular".to_string())
    })?;

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(MathError::CalculationError(
            "Regression produced non-finite coefficients".to_string(),
        ));
    }

    let fitted = &x * &beta;
    let ssr: f64 = yv
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();

    let y_mean = mean(y);
    let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    if sst == 0.0 {
        return Err(MathError::CalculationError(
            "Dependent variable has zero variance".to_string(),
        ));
    }

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        r_squared: 1.0 - ssr / sst,
        nobs,
        df_model: k - 1,
        df_resid: nobs - k,
    })
}

/// Build the dependent vector and lagged regressor columns for an
/// autoregression of order `lags`.
///
/// Row `i` of the output corresponds to `data[lags + i]`; column `j` holds the
/// value `j + 1` periods earlier.
pub fn lag_matrix(data: &[f64], lags: usize) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    if lags == 0 {
        return Err(MathError::InvalidInput(
            "Lag matrix needs at least one lag".to_string(),
        ));
    }
    if data.len() <= lags {
        return Err(MathError::InsufficientData(format!(
            "{} lags need more than {} observations, have {}",
            lags,
            lags,
            data.len()
        )));
    }

    let dependent = data[lags..].to_vec();
    let columns = (1..=lags)
        .map(|lag| data[lags - lag..data.len() - lag].to_vec())
        .collect();

    Ok((dependent, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_linear_fit() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 + 2.0 * v).collect();

        let fit = ols(&y, &[x]).unwrap();
        assert!((fit.coefficients[0] - 1.0).abs() < 1e-9);
        assert!((fit.coefficients[1] - 2.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.df_model, 1);
        assert_eq!(fit.df_resid, 8);
    }

    #[test]
    fn test_partial_fit() {
        // y = x + noise pattern, slope recovered by hand: Sxy/Sxx
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0];

        let fit = ols(&y, &[x]).unwrap();
        // Sxx = 10, Sxy = 8
        assert!((fit.coefficients[1] - 0.8).abs() < 1e-12);
        assert!((fit.coefficients[0] - 0.6).abs() < 1e-12);
        // R² = Sxy² / (Sxx·Syy) = 64 / (10·10)
        assert!((fit.r_squared - 0.64).abs() < 1e-12);
        assert!((fit.f_statistic() - 0.64 / (0.36 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_singular_design() {
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let constant = vec![5.0; 4];
        assert!(matches!(
            ols(&y, &[constant]),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn test_lag_matrix() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (dep, cols) = lag_matrix(&data, 2).unwrap();

        assert_eq!(dep, vec![3.0, 4.0, 5.0]);
        assert_eq!(cols[0], vec![2.0, 3.0, 4.0]);
        assert_eq!(cols[1], vec![1.0, 2.0, 3.0]);

        assert!(lag_matrix(&data, 5).is_err());
        assert!(lag_matrix(&data, 0).is_err());
    }
}
