//! Sample autocorrelation and the Ljung-Box portmanteau test

use crate::descriptive::mean;
use crate::distributions::chi_squared_sf;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Sample autocorrelation function for lags `0..=max_lag`.
///
/// The series is demeaned and every lag is normalized by the full-sample sum
/// of squares, so `acf[0] == 1.0`.
pub fn acf(data: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let n = data.len();
    if n <= max_lag {
        return Err(MathError::InsufficientData(format!(
            "Autocorrelation up to lag {} needs more than {} observations, have {}",
            max_lag, max_lag, n
        )));
    }

    let m = mean(data);
    let centered: Vec<f64> = data.iter().map(|&x| x - m).collect();
    let denom: f64 = centered.iter().map(|x| x * x).sum();

    if denom == 0.0 || !denom.is_finite() {
        return Err(MathError::CalculationError(
            "Series has zero or non-finite variance".to_string(),
        ));
    }

    Ok((0..=max_lag)
        .map(|lag| {
            centered[lag..]
                .iter()
                .zip(centered[..n - lag].iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / denom
        })
        .collect())
}

/// Cumulative Ljung-Box statistic at a single lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjungBox {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

/// Ljung-Box Q statistic over lags `1..=lags`.
///
/// Q = n(n+2) Σ ρ²ₖ/(n-k), compared against χ² with `lags` degrees of freedom.
pub fn ljung_box(data: &[f64], lags: usize) -> Result<LjungBox> {
    if lags == 0 {
        return Err(MathError::InvalidInput(
            "Ljung-Box test needs at least one lag".to_string(),
        ));
    }

    let n = data.len();
    let rho = acf(data, lags)?;
    let nf = n as f64;

    let statistic = nf
        * (nf + 2.0)
        * rho[1..]
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let k = i + 1;
                r * r / (n - k) as f64
            })
            .sum::<f64>();

    let p_value = chi_squared_sf(statistic, lags as f64)?;

    Ok(LjungBox {
        statistic,
        p_value,
        lags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acf_alternating_series() {
        let data: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let rho = acf(&data, 2).unwrap();

        assert_eq!(rho[0], 1.0);
        // Lag-1 products are all -1 over 19 pairs, normalized by 20
        assert!((rho[1] + 19.0 / 20.0).abs() < 1e-12);
        assert!((rho[2] - 18.0 / 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_acf_constant_series_fails() {
        let result = acf(&[3.0; 10], 2);
        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }

    #[test]
    fn test_ljung_box_hand_computed() {
        let data = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let lb = ljung_box(&data, 1).unwrap();

        // ρ₁ = -5/6, Q = 6·8·(25/36)/5
        let expected = 6.0 * 8.0 * (25.0 / 36.0) / 5.0;
        assert!((lb.statistic - expected).abs() < 1e-12);
        assert_eq!(lb.lags, 1);
        assert!(lb.p_value > 0.0 && lb.p_value < 0.05);
    }

    #[test]
    fn test_ljung_box_insufficient_data() {
        let data = [0.5, -0.2, 0.1];
        assert!(matches!(
            ljung_box(&data, 3),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(ljung_box(&data, 0), Err(MathError::InvalidInput(_))));
    }
}
