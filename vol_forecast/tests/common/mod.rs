#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution as _, Normal, StudentT};
use std::collections::HashMap;
use vol_forecast::models::GarchParams;
use vol_forecast::{
    AnalysisError, Distribution, FittedModel, ReturnProvider, ReturnSeries, Result, TimeSeries,
    VolatilityEstimator,
};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Consecutive calendar days starting at 2020-01-01
pub fn daily_index(n: usize) -> Vec<NaiveDate> {
    let start = date("2020-01-01");
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

pub fn series(values: Vec<f64>) -> TimeSeries {
    TimeSeries::new(daily_index(values.len()), values).unwrap()
}

/// Simulate a GARCH(1,1) path with a seeded generator.
///
/// `nu` switches the innovations from standard normal to unit-variance
/// Student-t.
pub fn simulate_garch(
    n: usize,
    mu: f64,
    omega: f64,
    alpha: f64,
    beta: f64,
    nu: Option<f64>,
    seed: u64,
) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();

    let draw = |rng: &mut StdRng| match nu {
        Some(nu) => {
            let t = StudentT::new(nu).unwrap();
            t.sample(rng) * ((nu - 2.0) / nu).sqrt()
        }
        None => normal.sample(rng),
    };

    let mut sigma2 = omega / (1.0 - alpha - beta);
    let mut prev_eps = 0.0;
    let mut values = Vec::with_capacity(n);

    for i in 0..n {
        if i > 0 {
            sigma2 = omega + alpha * prev_eps * prev_eps + beta * sigma2;
        }
        let eps = sigma2.sqrt() * draw(&mut rng);
        values.push(mu + eps);
        prev_eps = eps;
    }

    series(values)
}

/// Returns that follow a typical equity index GARCH process
pub fn equity_like_returns(n: usize, seed: u64) -> ReturnSeries {
    simulate_garch(n, 0.05, 0.02, 0.08, 0.90, None, seed)
}

/// Estimator that returns fixed log-likelihoods per distribution
pub struct FixedEstimator {
    pub ll_normal: f64,
    pub ll_student_t: f64,
    pub fail_on: Option<Distribution>,
}

impl FixedEstimator {
    pub fn new(ll_normal: f64, ll_student_t: f64) -> Self {
        Self {
            ll_normal,
            ll_student_t,
            fail_on: None,
        }
    }
}

impl VolatilityEstimator for FixedEstimator {
    fn estimate(&self, returns: &ReturnSeries, distribution: Distribution) -> Result<FittedModel> {
        if self.fail_on == Some(distribution) {
            return Err(AnalysisError::FitFailure(format!(
                "{} fit did not converge",
                distribution
            )));
        }

        let (log_likelihood, nu) = match distribution {
            Distribution::Normal => (self.ll_normal, None),
            Distribution::StudentT => (self.ll_student_t, Some(8.0)),
        };
        let params = GarchParams {
            mu: 0.0,
            omega: 0.1,
            alpha: 0.05,
            beta: 0.9,
            nu,
        };

        FittedModel::new(
            distribution,
            params,
            log_likelihood,
            returns.map_values(|_| 1.0),
            returns.clone(),
        )
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Provider backed by in-memory series; unknown instruments are unavailable
#[derive(Default)]
pub struct InMemoryProvider {
    series: HashMap<String, ReturnSeries>,
}

impl InMemoryProvider {
    pub fn with(mut self, instrument: &str, returns: ReturnSeries) -> Self {
        self.series.insert(instrument.to_string(), returns);
        self
    }
}

impl ReturnProvider for InMemoryProvider {
    fn fetch_returns(&self, instrument: &str, start: NaiveDate) -> Result<ReturnSeries> {
        let returns = self
            .series
            .get(instrument)
            .map(|s| s.since(start))
            .unwrap_or_default();

        if returns.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "No data downloaded for ticker {}",
                instrument
            )));
        }
        Ok(returns)
    }
}
