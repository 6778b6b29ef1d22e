use std::env;
use vol_forecast::data::DataLoader;
use vol_forecast::diagnostics::compute_diagnostics;
use vol_forecast::{backtest_var, select_best_model, MaximumLikelihood};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let csv_path = env::args()
        .nth(1)
        .ok_or("usage: fit_single_file <prices.csv>")?;

    println!("Loading prices from: {}", csv_path);
    let history = DataLoader::from_csv(&csv_path)?;
    let returns = history.log_returns();
    println!(
        "Loaded {} returns from column '{}'",
        returns.len(),
        history.price_column()
    );

    // Fit both distributions and keep the lower AIC
    let selection = select_best_model(&returns, &MaximumLikelihood::default())?;
    let model = selection.model();
    let params = model.params();

    println!("Selected model: {}", selection.selected());
    println!(
        "AIC normal = {:.2}, AIC t = {:.2}",
        selection.aic_normal(),
        selection.aic_student_t()
    );
    println!(
        "mu = {:.4}, omega = {:.4}, alpha = {:.4}, beta = {:.4}, nu = {:?}",
        params.mu, params.omega, params.alpha, params.beta, params.nu
    );

    let diagnostics = compute_diagnostics(model.standardized_residuals().values(), 10)?;
    println!(
        "Ljung-Box p = {:.3}, squared p = {:.3}, ARCH-LM p = {:.3}",
        diagnostics.ljung_box.p_value,
        diagnostics.ljung_box_squared.p_value,
        diagnostics.arch_lm.lm_p_value
    );

    let backtest = backtest_var(&returns, model.conditional_volatility(), &[0.95, 0.99])?;
    for level in backtest.levels() {
        println!(
            "VaR {:.0}%: {} exceptions in {} days (expected {:.1}), Kupiec p = {:.3}",
            level.confidence_level * 100.0,
            level.exceptions,
            level.total_observations,
            level.kupiec.expected_exceptions,
            level.kupiec.p_value
        );
    }

    Ok(())
}
