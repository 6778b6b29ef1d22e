//! # Stat Math
//!
//! Statistical primitives used by volatility model estimation and testing.
//! This crate provides descriptive statistics, the handful of probability
//! distributions needed for hypothesis tests, sample autocorrelation with the
//! Ljung-Box portmanteau statistic, and ordinary least squares.

use thiserror::Error;

pub mod autocorrelation;
pub mod descriptive;
pub mod distributions;
pub mod regression;

pub use autocorrelation::{acf, ljung_box, LjungBox};
pub use descriptive::{mean, population_variance, sample_variance, Summary};
pub use distributions::{chi_squared_sf, f_sf, ln_gamma, standard_normal_quantile};
pub use regression::{lag_matrix, ols, OlsFit};

/// Errors that can occur in statistical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for statistical operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::InsufficientData("need 11 values, have 3".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 11 values, have 3"
        );
    }
}
