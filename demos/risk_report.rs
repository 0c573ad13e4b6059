//! Risk report example
//!
//! Builds a synthetic four-asset portfolio and reports historical, parametric
//! and Monte Carlo VaR / CVaR.
//!
//! Run with: cargo run --example risk_report [-- path/to/config.yaml]
//! Set RUST_LOG=debug to see estimator logs.

use ag_var::{PortfolioWeights, ReportConfig, ReturnSeries, RiskReport, VarMethod};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Portfolio Value at Risk Report ===\n");

    // 1. Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => ReportConfig::from_yaml_file(&path)?,
        None => ReportConfig::from_yaml_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/configs/default.yaml"
        ))?,
    };

    println!("Confidence Level: {}", config.confidence_level);
    println!("Portfolio: ${:.0}", config.portfolio_value);
    println!("Monte Carlo trials: {}", config.monte_carlo.trials);
    println!();

    // 2. One year of correlated daily returns (market factor + idiosyncratic noise)
    let assets = ["AAPL", "AMZN", "GOOG", "MSFT"];
    let mut rng = StdRng::seed_from_u64(2024);
    let normal = Normal::new(0.0, 1.0)?;
    let loadings: [f64; 4] = [0.9, 0.8, 0.85, 0.75];

    let mut series = vec![Vec::with_capacity(252); assets.len()];
    for _ in 0..252 {
        let market = normal.sample(&mut rng);
        for (returns, beta) in series.iter_mut().zip(loadings) {
            let noise = normal.sample(&mut rng);
            let shock = beta * market + (1.0 - beta * beta).sqrt() * noise;
            returns.push(0.0005 + 0.012 * shock);
        }
    }
    let returns = ReturnSeries::new(assets.iter().copied().zip(series))?;

    println!("Sample returns statistics:");
    for asset in returns.asset_ids() {
        let r = returns.returns(asset).unwrap_or_default();
        let mean = r.iter().sum::<f64>() / r.len() as f64;
        println!("  {}: mean {:.4}% over {} days", asset, mean * 100.0, r.len());
    }
    println!();

    // 3. Equal-weight portfolio
    let weights = PortfolioWeights::equal(assets)?;

    // 4. Build the report
    let report = RiskReport::from_config(&returns, &weights, &config)?;
    print!("{}", report);
    println!();

    // 5. Interpretation
    if let Some(historical) = report.estimate(VarMethod::Historical) {
        let loss = historical.amount.loss_view();
        println!(
            "With {} confidence, the portfolio should not lose more than ${:.2} in a day",
            report.confidence_level, loss.var
        );
        println!(
            "On the days it does, the average loss is ${:.2}",
            loss.cvar
        );
    }

    if let Some(sim) = &report.simulation {
        let min = sim.returns.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = sim.returns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        println!();
        println!(
            "Simulated returns range: {:.4}% to {:.4}% (seed {:?})",
            min * 100.0,
            max * 100.0,
            sim.seed
        );
    }

    Ok(())
}
