//! Conditional volatility models

use crate::data::{ReturnSeries, TimeSeries};
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod garch;
pub mod selection;

pub use garch::MaximumLikelihood;
pub use selection::{select_best_model, ModelSelection};

/// Error distribution assumed for the standardized innovations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    /// Standard normal innovations
    #[serde(rename = "normal")]
    Normal,
    /// Standardized Student-t innovations with estimated degrees of freedom
    #[serde(rename = "t")]
    StudentT,
}

impl Distribution {
    /// Both distributions, in the order they are fitted
    pub const ALL: [Distribution; 2] = [Distribution::Normal, Distribution::StudentT];

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Distribution::Normal => "normal",
            Distribution::StudentT => "t",
        }
    }

    /// Number of estimated parameters for a constant-mean GARCH(1,1):
    /// μ, ω, α, β and, for Student-t, ν
    pub fn parameter_count(&self) -> usize {
        match self {
            Distribution::Normal => 4,
            Distribution::StudentT => 5,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimated GARCH(1,1) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarchParams {
    /// Constant mean return
    pub mu: f64,
    /// Variance intercept
    pub omega: f64,
    /// Reaction to the previous squared shock
    pub alpha: f64,
    /// Persistence of the previous variance
    pub beta: f64,
    /// Degrees of freedom, Student-t only
    pub nu: Option<f64>,
}

impl GarchParams {
    /// α + β
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Unconditional volatility `√(ω/(1-α-β))`, if the process is stationary
    pub fn long_run_volatility(&self) -> Option<f64> {
        let persistence = self.persistence();
        if persistence < 1.0 {
            Some((self.omega / (1.0 - persistence)).sqrt())
        } else {
            None
        }
    }

    /// Check the GARCH constraint set
    pub fn is_valid(&self) -> bool {
        let finite = [self.mu, self.omega, self.alpha, self.beta]
            .iter()
            .chain(self.nu.iter())
            .all(|v| v.is_finite());

        finite
            && self.omega > 0.0
            && self.alpha >= 0.0
            && self.beta >= 0.0
            && self.persistence() < 1.0
            && self.nu.map_or(true, |nu| nu > 2.0)
    }
}

/// A GARCH(1,1) model fitted to one return series
#[derive(Debug, Clone)]
pub struct FittedModel {
    distribution: Distribution,
    params: GarchParams,
    log_likelihood: f64,
    aic: f64,
    conditional_volatility: TimeSeries,
    standardized_residuals: TimeSeries,
}

impl FittedModel {
    /// Assemble a fitted model; AIC is `2k - 2·logL`.
    ///
    /// Volatility and residuals must share the same index.
    pub fn new(
        distribution: Distribution,
        params: GarchParams,
        log_likelihood: f64,
        conditional_volatility: TimeSeries,
        standardized_residuals: TimeSeries,
    ) -> Result<Self> {
        if conditional_volatility.index() != standardized_residuals.index() {
            return Err(AnalysisError::DataError(
                "Conditional volatility and standardized residuals must share an index"
                    .to_string(),
            ));
        }

        let k = distribution.parameter_count() as f64;
        let aic = 2.0 * k - 2.0 * log_likelihood;

        Ok(Self {
            distribution,
            params,
            log_likelihood,
            aic,
            conditional_volatility,
            standardized_residuals,
        })
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn params(&self) -> &GarchParams {
        &self.params
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike Information Criterion, lower is better
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// σₜ in the same (percentage) units as the returns
    pub fn conditional_volatility(&self) -> &TimeSeries {
        &self.conditional_volatility
    }

    /// (rₜ - μ) / σₜ
    pub fn standardized_residuals(&self) -> &TimeSeries {
        &self.standardized_residuals
    }
}

/// Estimates a GARCH(1,1) model under a chosen error distribution
pub trait VolatilityEstimator {
    /// Fit the model to `returns`
    fn estimate(&self, returns: &ReturnSeries, distribution: Distribution) -> Result<FittedModel>;

    /// Name of the estimator
    fn name(&self) -> &str;
}
