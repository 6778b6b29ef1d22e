//! GARCH(1,1) estimation by maximum likelihood
//!
//! The model has a constant mean:
//!
//! ```text
//! rₜ = μ + εₜ
//! σ²ₜ = ω + α·ε²ₜ₋₁ + β·σ²ₜ₋₁
//! ```
//!
//! The negative log-likelihood is minimized with a derivative-free
//! Nelder-Mead search. Points outside ω > 0, α ≥ 0, β ≥ 0, α + β < 1
//! (and ν > 2 for Student-t) are given a prohibitive cost.

use crate::data::ReturnSeries;
use crate::error::{AnalysisError, Result};
use crate::models::{Distribution, FittedModel, GarchParams, VolatilityEstimator};
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use stat_math::{ln_gamma, mean, population_variance};
use std::f64::consts::PI;
use tracing::debug;

/// Cost assigned to infeasible parameter vectors
const LARGE_NUMBER: f64 = 1e12;
/// Decay of the exponentially weighted variance used to start the recursion
const BACKCAST_DECAY: f64 = 0.94;
/// Maximum number of observations in the backcast
const BACKCAST_WINDOW: usize = 75;
/// Upper bound on the Student-t degrees of freedom
const MAX_NU: f64 = 500.0;

/// Exponentially weighted mean of the first squared residuals.
///
/// Used as both σ²₋₁ and ε²₋₁ when starting the variance recursion.
pub fn backcast(residuals: &[f64]) -> f64 {
    let tau = residuals.len().min(BACKCAST_WINDOW);
    let (weighted, total) = residuals[..tau]
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(acc, wsum), (i, e)| {
            let w = BACKCAST_DECAY.powi(i as i32);
            (acc + w * e * e, wsum + w)
        });

    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Run the GARCH(1,1) variance recursion over `residuals`
pub fn conditional_variance(
    residuals: &[f64],
    omega: f64,
    alpha: f64,
    beta: f64,
    backcast: f64,
) -> Vec<f64> {
    let mut sigma2 = Vec::with_capacity(residuals.len());
    let mut prev_eps2 = backcast;
    let mut prev_sigma2 = backcast;

    for e in residuals {
        let s2 = omega + alpha * prev_eps2 + beta * prev_sigma2;
        sigma2.push(s2);
        prev_eps2 = e * e;
        prev_sigma2 = s2;
    }

    sigma2
}

/// Log-likelihood of `residuals` given their conditional variances
pub fn log_likelihood(
    residuals: &[f64],
    sigma2: &[f64],
    distribution: Distribution,
    nu: Option<f64>,
) -> f64 {
    match (distribution, nu) {
        (Distribution::StudentT, Some(nu)) => {
            let c = ln_gamma((nu + 1.0) / 2.0)
                - ln_gamma(nu / 2.0)
                - 0.5 * (PI * (nu - 2.0)).ln();

            residuals
                .iter()
                .zip(sigma2)
                .map(|(e, s2)| {
                    c - 0.5 * s2.ln()
                        - (nu + 1.0) / 2.0 * (1.0 + e * e / (s2 * (nu - 2.0))).ln()
                })
                .sum()
        }
        _ => {
            let c = (2.0 * PI).ln();
            residuals
                .iter()
                .zip(sigma2)
                .map(|(e, s2)| -0.5 * (c + s2.ln() + e * e / s2))
                .sum()
        }
    }
}

/// Negative log-likelihood over the parameter vector `[μ, ω, α, β, (ν)]`
struct NegativeLogLikelihood<'a> {
    returns: &'a [f64],
    distribution: Distribution,
    backcast: f64,
}

impl NegativeLogLikelihood<'_> {
    fn params(&self, theta: &[f64]) -> GarchParams {
        GarchParams {
            mu: theta[0],
            omega: theta[1],
            alpha: theta[2],
            beta: theta[3],
            nu: match self.distribution {
                Distribution::StudentT => Some(theta[4]),
                Distribution::Normal => None,
            },
        }
    }

    fn evaluate(&self, params: &GarchParams) -> f64 {
        if !params.is_valid() || params.nu.map_or(false, |nu| nu > MAX_NU) {
            return LARGE_NUMBER;
        }

        let residuals: Vec<f64> = self.returns.iter().map(|r| r - params.mu).collect();
        let sigma2 = conditional_variance(
            &residuals,
            params.omega,
            params.alpha,
            params.beta,
            self.backcast,
        );

        let ll = log_likelihood(&residuals, &sigma2, self.distribution, params.nu);
        if ll.is_finite() {
            -ll
        } else {
            LARGE_NUMBER
        }
    }
}

impl CostFunction for NegativeLogLikelihood<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> std::result::Result<Self::Output, Error> {
        Ok(self.evaluate(&self.params(theta)))
    }
}

/// Maximum-likelihood GARCH(1,1) estimator using Nelder-Mead
#[derive(Debug, Clone)]
pub struct MaximumLikelihood {
    max_iters: u64,
    sd_tolerance: f64,
}

impl Default for MaximumLikelihood {
    fn default() -> Self {
        Self {
            max_iters: 20_000,
            sd_tolerance: 1e-7,
        }
    }
}

impl MaximumLikelihood {
    /// Create an estimator with a custom iteration budget and simplex tolerance
    pub fn new(max_iters: u64, sd_tolerance: f64) -> Result<Self> {
        if max_iters == 0 {
            return Err(AnalysisError::InvalidParameter(
                "Iteration budget must be greater than zero".to_string(),
            ));
        }
        if !(sd_tolerance > 0.0) {
            return Err(AnalysisError::InvalidParameter(
                "Simplex tolerance must be positive".to_string(),
            ));
        }

        Ok(Self {
            max_iters,
            sd_tolerance,
        })
    }

    /// Starting simplex around moment-based initial values
    fn initial_simplex(returns: &[f64], distribution: Distribution) -> Vec<Vec<f64>> {
        let mu0 = mean(returns);
        let v0 = population_variance(returns);
        let (alpha0, beta0) = (0.05, 0.90);

        let mut theta0 = vec![mu0, v0 * (1.0 - alpha0 - beta0), alpha0, beta0];
        if distribution == Distribution::StudentT {
            theta0.push(8.0);
        }

        let mut simplex = vec![theta0.clone()];
        for i in 0..theta0.len() {
            let mut vertex = theta0.clone();
            match i {
                0 => vertex[0] += 0.1 * v0.sqrt(),
                1 => vertex[1] *= 1.5,
                2 => vertex[2] = 0.08,
                3 => vertex[3] = 0.85,
                _ => vertex[4] = 12.0,
            }
            simplex.push(vertex);
        }

        simplex
    }
}

impl VolatilityEstimator for MaximumLikelihood {
    fn estimate(&self, returns: &ReturnSeries, distribution: Distribution) -> Result<FittedModel> {
        if returns.has_non_finite() {
            return Err(AnalysisError::FitFailure(
                "Returns contain non-finite values (NaN or Inf)".to_string(),
            ));
        }
        if returns.len() < 2 {
            return Err(AnalysisError::FitFailure(format!(
                "Need at least 2 returns for GARCH(1,1) estimation, got {}",
                returns.len()
            )));
        }

        let r = returns.values();
        if !(population_variance(r) > 0.0) {
            return Err(AnalysisError::FitFailure(
                "Returns have zero variance".to_string(),
            ));
        }

        let initial_mean = mean(r);
        let centered: Vec<f64> = r.iter().map(|x| x - initial_mean).collect();
        let start_variance = backcast(&centered);
        let objective = NegativeLogLikelihood {
            returns: r,
            distribution,
            backcast: start_variance,
        };

        let solver = NelderMead::new(Self::initial_simplex(r, distribution))
            .with_sd_tolerance(self.sd_tolerance)
            .map_err(|e| AnalysisError::FitFailure(format!("Invalid solver setup: {}", e)))?;

        let result = Executor::new(objective, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run()
            .map_err(|e| AnalysisError::FitFailure(format!("GARCH optimization failed: {}", e)))?;

        let state = result.state();
        if let Some(TerminationReason::MaxItersReached) = state.get_termination_reason() {
            return Err(AnalysisError::FitFailure(format!(
                "GARCH({}) optimization did not converge within {} iterations",
                distribution, self.max_iters
            )));
        }

        let theta = state.get_best_param().ok_or_else(|| {
            AnalysisError::FitFailure("GARCH optimization did not produce parameters".to_string())
        })?;

        // The executor owns the first objective
        let objective = NegativeLogLikelihood {
            returns: r,
            distribution,
            backcast: start_variance,
        };
        let params = objective.params(theta);
        let nll = objective.evaluate(&params);

        if !params.is_valid() || nll >= LARGE_NUMBER {
            return Err(AnalysisError::FitFailure(format!(
                "GARCH optimization produced invalid parameters: μ={:.6}, ω={:.6}, α={:.6}, β={:.6}, α+β={:.6}",
                params.mu,
                params.omega,
                params.alpha,
                params.beta,
                params.persistence()
            )));
        }

        let residuals: Vec<f64> = r.iter().map(|x| x - params.mu).collect();
        let sigma: Vec<f64> = conditional_variance(
            &residuals,
            params.omega,
            params.alpha,
            params.beta,
            start_variance,
        )
        .into_iter()
        .map(f64::sqrt)
        .collect();

        let standardized: Vec<f64> = residuals
            .iter()
            .zip(&sigma)
            .map(|(e, s)| e / s)
            .collect();

        debug!(
            distribution = %distribution,
            mu = params.mu,
            omega = params.omega,
            alpha = params.alpha,
            beta = params.beta,
            nu = ?params.nu,
            log_likelihood = -nll,
            iterations = state.get_iter(),
            "fitted GARCH(1,1)"
        );

        FittedModel::new(
            distribution,
            params,
            -nll,
            returns.with_values(sigma)?,
            returns.with_values(standardized)?,
        )
    }

    fn name(&self) -> &str {
        "GARCH(1,1) maximum likelihood"
    }
}
