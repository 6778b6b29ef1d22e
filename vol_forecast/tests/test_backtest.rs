mod common;

use common::{date, series};
use pretty_assertions::assert_eq;
use rstest::rstest;
use vol_forecast::backtest::{
    backtest_var, compute_var, count_exceptions, kupiec_test, level_key, var_quantile,
    DEFAULT_CONFIDENCE_LEVELS,
};
use vol_forecast::{AnalysisError, TimeSeries};

/// 500 days at σ = 1 % with exactly five returns below -1.645 %
fn five_breaches() -> (TimeSeries, TimeSeries) {
    let values: Vec<f64> = (0..500)
        .map(|i| if i % 100 == 50 { -2.0 } else { 0.1 })
        .collect();
    let returns = series(values);
    let volatility = returns.map_values(|_| 1.0);
    (returns, volatility)
}

#[rstest]
#[case(0.95, -1.6448536269514722)]
#[case(0.99, -2.3263478740408408)]
#[case(0.975, -1.959963984540054)]
#[case(0.5, 0.0)]
fn test_var_quantile(#[case] confidence_level: f64, #[case] expected: f64) {
    let z = var_quantile(confidence_level).unwrap();
    assert!((z - expected).abs() < 1e-9, "z({}) = {}", confidence_level, z);
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(1.5)]
#[case(-0.1)]
#[case(f64::NAN)]
fn test_var_quantile_rejects_invalid_levels(#[case] confidence_level: f64) {
    assert!(matches!(
        var_quantile(confidence_level),
        Err(AnalysisError::InvalidParameter(_))
    ));
}

#[test]
fn test_var_99_below_var_95() {
    let volatility = series(vec![0.5, 1.0, 2.5, 0.8]);
    let var_95 = compute_var(&volatility, 0.95).unwrap();
    let var_99 = compute_var(&volatility, 0.99).unwrap();

    assert_eq!(var_95.index(), volatility.index());
    for (v99, v95) in var_99.values().iter().zip(var_95.values()) {
        assert!(v99 <= v95);
        assert!(*v95 < 0.0);
    }
}

#[test]
fn test_five_breaches_in_500_days() {
    let (returns, volatility) = five_breaches();
    let var = compute_var(&volatility, 0.95).unwrap();

    assert_eq!(count_exceptions(&returns, &var), 5);

    let kupiec = kupiec_test(5, 500, 0.95).unwrap();
    assert_eq!(kupiec.observed_exceptions, 5);
    assert_eq!(kupiec.observed_rate, 0.01);
    assert!((kupiec.expected_exceptions - 25.0).abs() < 1e-9);
    assert!(kupiec.lr_statistic.is_finite());
    assert!(!kupiec.p_value.is_nan());
    // Far fewer breaches than expected: the model over-predicts risk
    assert!(kupiec.observed_rate < 1.0 - 0.95);
    assert!(kupiec.reject_null);
}

#[test]
fn test_exception_is_strictly_below_var() {
    let returns = series(vec![-1.0, -1.0 - 1e-9, -0.5]);
    let var = series(vec![-1.0, -1.0, -1.0]);

    assert_eq!(count_exceptions(&returns, &var), 1);
}

#[test]
fn test_exception_count_ignores_order_duplicates_and_unmatched_dates() {
    let var = TimeSeries::new(
        vec![date("2023-01-02"), date("2023-01-03"), date("2023-01-04")],
        vec![-1.0, -1.0, -1.0],
    )
    .unwrap();

    let returns = TimeSeries::new(
        vec![
            date("2023-01-04"),
            date("2023-01-02"),
            date("2023-01-02"),
            date("2023-01-09"),
            date("2023-01-03"),
        ],
        vec![-3.0, -2.0, -2.0, -5.0, 0.0],
    )
    .unwrap();

    assert_eq!(count_exceptions(&returns, &var), 2);
}

#[test]
fn test_kupiec_no_exceptions_uses_closed_form() {
    let kupiec = kupiec_test(0, 250, 0.99).unwrap();

    let p: f64 = 1.0 - 0.99;
    assert_eq!(kupiec.lr_statistic, -2.0 * 250.0 * (1.0 - p).ln());
    assert_eq!(kupiec.observed_rate, 0.0);
    assert!(kupiec.p_value.is_finite());
}

#[test]
fn test_kupiec_all_exceptions_uses_closed_form() {
    let kupiec = kupiec_test(40, 40, 0.95).unwrap();

    let p: f64 = 1.0 - 0.95;
    assert_eq!(kupiec.lr_statistic, -2.0 * 40.0 * p.ln());
    assert_eq!(kupiec.observed_rate, 1.0);
    assert!(kupiec.reject_null);
}

#[test]
fn test_kupiec_exact_coverage_does_not_reject() {
    let kupiec = kupiec_test(5, 100, 0.95).unwrap();

    assert!(kupiec.lr_statistic.abs() < 1e-9);
    assert!((kupiec.p_value - 1.0).abs() < 1e-6);
    assert!(!kupiec.reject_null);
}

#[test]
fn test_kupiec_invalid_inputs() {
    assert!(matches!(
        kupiec_test(0, 0, 0.95),
        Err(AnalysisError::AlignmentEmpty(_))
    ));
    assert!(matches!(
        kupiec_test(11, 10, 0.95),
        Err(AnalysisError::InvalidParameter(_))
    ));
}

#[rstest]
#[case(0.95, "var_95")]
#[case(0.99, "var_99")]
#[case(0.9, "var_90")]
fn test_level_key(#[case] confidence_level: f64, #[case] key: &str) {
    assert_eq!(level_key(confidence_level), key);
}

#[test]
fn test_backtest_shares_observation_count_across_levels() {
    let (returns, volatility) = five_breaches();
    // Volatility ends ten days early; only the intersection is tested
    let volatility = TimeSeries::new(
        volatility.index()[..490].to_vec(),
        volatility.values()[..490].to_vec(),
    )
    .unwrap();

    let backtest = backtest_var(&returns, &volatility, &DEFAULT_CONFIDENCE_LEVELS).unwrap();

    assert_eq!(backtest.len(), 2);
    for level in backtest.levels() {
        assert_eq!(level.total_observations, 490);
        assert_eq!(
            level.kupiec.expected_exceptions,
            (1.0 - level.confidence_level) * 490.0
        );
    }
    assert_eq!(backtest.get(0.95).unwrap().exceptions, 5);
    assert_eq!(backtest.get(0.99).unwrap().exceptions, 0);
}

#[test]
fn test_backtest_json_keeps_requested_order() {
    let (returns, volatility) = five_breaches();
    let backtest = backtest_var(&returns, &volatility, &[0.99, 0.95]).unwrap();

    let json = serde_json::to_string(&backtest).unwrap();
    let pos_99 = json.find("\"var_99\"").unwrap();
    let pos_95 = json.find("\"var_95\"").unwrap();
    assert!(pos_99 < pos_95);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let level = &value["var_95"];
    assert_eq!(level["confidence_level"], 0.95);
    assert_eq!(level["total_observations"], 500);
    assert_eq!(level["exceptions"], 5);
    assert_eq!(level["kupiec_test"]["observed_exceptions"], 5);
    assert_eq!(level["kupiec_test"]["reject_null"], true);
}

#[test]
fn test_backtest_empty_intersection() {
    let returns = series(vec![0.1, -0.2]);
    let volatility = TimeSeries::new(vec![date("1999-01-04")], vec![1.0]).unwrap();

    assert!(matches!(
        backtest_var(&returns, &volatility, &[0.95]),
        Err(AnalysisError::AlignmentEmpty(_))
    ));
}

#[test]
fn test_backtest_rejects_colliding_levels() {
    let (returns, volatility) = five_breaches();
    let result = backtest_var(&returns, &volatility, &[0.95, 0.951]);

    assert!(matches!(result, Err(AnalysisError::InvalidParameter(_))));
}
