//! Error types for the vol_forecast crate

use polars::prelude::PolarsError;
use stat_math::MathError;
use thiserror::Error;

/// Errors raised while loading data, fitting models or running tests
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The provider returned nothing usable for an instrument
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Error related to data validation or parsing
    #[error("Data error: {0}")]
    DataError(String),

    /// The optimizer did not converge or produced unusable parameters
    #[error("Fit failure: {0}")]
    FitFailure(String),

    /// Two series needed together share no index values
    #[error("Alignment empty: {0}")]
    AlignmentEmpty(String),

    /// A diagnostic test was asked for more lags than the residuals support
    #[error("Insufficient observations for {test}: need at least {required}, have {available}")]
    InsufficientObservations {
        test: String,
        required: usize,
        available: usize,
    },

    /// A diagnostic test failed numerically
    #[error("{test} test failed: {message}")]
    Diagnostic { test: String, message: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the statistical primitives
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error in pipeline configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON encoding or decoding
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<PolarsError> for AnalysisError {
    fn from(err: PolarsError) -> Self {
        AnalysisError::PolarsError(err.to_string())
    }
}
