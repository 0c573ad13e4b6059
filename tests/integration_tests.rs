//! Integration tests for the VaR estimation engine
//!
//! These tests run full reports on synthetic correlated portfolios and check
//! the cross-method properties: bounds, agreement between simulation and the
//! closed form, reproducibility and all-or-nothing failure.

use ag_var::{
    cholesky_lower, ConfidenceLevel, MethodOutcome, MonteCarloConfig, PortfolioStatistics,
    PortfolioWeights, ReportConfig, ReturnSeries, RiskError, RiskEstimate, RiskEstimator,
    RiskReport, VarMethod,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const ASSETS: [&str; 4] = ["AAPL", "AMZN", "GOOG", "MSFT"];

/// 4 assets, 252 days, daily mean 0.0005, volatility 0.012, pairwise correlation 0.8
fn synthetic_returns(seed: u64) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let rho: f64 = 0.8;

    let mut series = vec![Vec::with_capacity(252); ASSETS.len()];
    for _ in 0..252 {
        let market = normal.sample(&mut rng);
        for returns in series.iter_mut() {
            let idio = normal.sample(&mut rng);
            returns.push(0.0005 + 0.012 * (rho.sqrt() * market + (1.0 - rho).sqrt() * idio));
        }
    }

    ReturnSeries::new(ASSETS.iter().copied().zip(series)).unwrap()
}

fn level(c: f64) -> ConfidenceLevel {
    ConfidenceLevel::new(c).unwrap()
}

#[test]
fn test_end_to_end_equal_weight_portfolio() {
    let returns = synthetic_returns(1);
    let weights = PortfolioWeights::new(ASSETS.iter().map(|a| (*a, 0.25))).unwrap();
    let mc = MonteCarloConfig {
        seed: Some(42),
        ..Default::default()
    };

    let report = RiskReport::build(&returns, &weights, level(0.95), 100_000.0, &mc).unwrap();

    let historical = report.historical().unwrap();
    assert!(historical.fractional.var > -0.03 && historical.fractional.var < -0.01);
    assert!(historical.fractional.cvar < historical.fractional.var);
    assert!(historical.amount.var < 0.0);
    assert!((historical.amount.var - historical.fractional.var * 100_000.0).abs() < 1e-9);

    let parametric = report.parametric().unwrap();
    assert!(parametric.fractional.cvar < parametric.fractional.var);

    let monte_carlo = report.monte_carlo().unwrap();
    assert!(monte_carlo.fractional.cvar <= monte_carlo.fractional.var);

    let sim = report.simulation.as_ref().unwrap();
    assert_eq!(sim.returns.len(), 400);
    assert!((sim.var_percentile - 5.0).abs() < 1e-9);
}

/// Counts how often the report reached estimation
struct CountingEstimator {
    calls: Arc<AtomicUsize>,
}

impl RiskEstimator for CountingEstimator {
    fn method(&self) -> VarMethod {
        VarMethod::Historical
    }

    fn estimate_portfolio(
        &self,
        _stats: &PortfolioStatistics,
        _confidence: ConfidenceLevel,
    ) -> ag_var::Result<MethodOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(MethodOutcome::new(
            VarMethod::Historical,
            RiskEstimate::new(-0.01, -0.02),
        ))
    }
}

#[test]
fn test_weight_sum_checked_before_estimation() {
    let returns = synthetic_returns(2);
    let weights = PortfolioWeights::new(ASSETS.iter().map(|a| (*a, 0.3))).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let estimators: Vec<Box<dyn RiskEstimator>> = vec![Box::new(CountingEstimator {
        calls: Arc::clone(&calls),
    })];

    let result = RiskReport::build_with(&returns, &weights, &ReportConfig::default(), &estimators);
    assert!(matches!(result, Err(RiskError::WeightMismatch(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let report = RiskReport::build(
        &returns,
        &weights,
        level(0.95),
        100_000.0,
        &MonteCarloConfig::default(),
    );
    assert!(matches!(report, Err(RiskError::WeightMismatch(_))));

    // Same estimator runs once the weights are normalized
    let normalized = weights.normalized().unwrap();
    RiskReport::build_with(&returns, &normalized, &ReportConfig::default(), &estimators).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_monte_carlo_converges_to_parametric() {
    let returns = synthetic_returns(3);
    let weights = PortfolioWeights::equal(ASSETS).unwrap();
    let config = ReportConfig {
        monte_carlo: MonteCarloConfig {
            trials: 100_000,
            seed: Some(2024),
            parallel: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let report = RiskReport::from_config(&returns, &weights, &config).unwrap();

    // The portfolio mean / volatility of the sample equal w'μ and sqrt(w'Σw)
    // of the simulated distribution, so both methods target the same normal.
    let parametric = report.parametric().unwrap().fractional;
    let monte_carlo = report.monte_carlo().unwrap().fractional;

    assert!(((monte_carlo.var - parametric.var) / parametric.var).abs() < 0.015);
    assert!(((monte_carlo.cvar - parametric.cvar) / parametric.cvar).abs() < 0.015);
}

#[test]
fn test_seeded_reports_are_reproducible() {
    let returns = synthetic_returns(4);
    let weights = PortfolioWeights::equal(ASSETS).unwrap();
    let mc = MonteCarloConfig {
        trials: 2_000,
        seed: Some(99),
        ..Default::default()
    };

    let a = RiskReport::build(&returns, &weights, level(0.99), 1_000_000.0, &mc).unwrap();
    let b = RiskReport::build(&returns, &weights, level(0.99), 1_000_000.0, &mc).unwrap();

    let (ea, eb) = (a.monte_carlo().unwrap(), b.monte_carlo().unwrap());
    assert_eq!(ea.fractional.var.to_bits(), eb.fractional.var.to_bits());
    assert_eq!(ea.fractional.cvar.to_bits(), eb.fractional.cvar.to_bits());
    assert_eq!(a.simulation, b.simulation);
}

#[test]
fn test_collinear_asset_fails_whole_report() {
    let base = synthetic_returns(5);
    let aapl = base.returns("AAPL").unwrap().to_vec();
    let doubled: Vec<f64> = aapl.iter().map(|r| 2.0 * r).collect();
    let returns = ReturnSeries::new(vec![
        ("AAPL", aapl),
        ("AAPL_2X", doubled),
        ("MSFT", base.returns("MSFT").unwrap().to_vec()),
    ])
    .unwrap();
    let weights = PortfolioWeights::equal(["AAPL", "AAPL_2X", "MSFT"]).unwrap();

    let stats = returns.statistics(&weights, 0.0).unwrap();
    assert!(matches!(
        cholesky_lower(&stats.covariance),
        Err(RiskError::NonPositiveDefiniteCovariance(_))
    ));

    let result = RiskReport::build(
        &returns,
        &weights,
        level(0.95),
        100_000.0,
        &MonteCarloConfig::default(),
    );
    assert!(matches!(
        result,
        Err(RiskError::NonPositiveDefiniteCovariance(_))
    ));
}

#[test]
fn test_regularization_rescues_collinear_assets() {
    let base = synthetic_returns(6);
    let aapl = base.returns("AAPL").unwrap().to_vec();
    let returns = ReturnSeries::new(vec![("AAPL", aapl.clone()), ("AAPL_COPY", aapl)]).unwrap();
    let weights = PortfolioWeights::equal(["AAPL", "AAPL_COPY"]).unwrap();

    let config = ReportConfig {
        covariance_regularization: 1e-6,
        monte_carlo: MonteCarloConfig {
            seed: Some(1),
            ..Default::default()
        },
        ..Default::default()
    };

    let report = RiskReport::from_config(&returns, &weights, &config).unwrap();
    assert_eq!(report.estimates.len(), 3);
}

#[test]
fn test_load_default_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.yaml");
    let config = ReportConfig::from_yaml_file(path).expect("Failed to load default config");

    assert_eq!(config.confidence_level.value(), 0.95);
    assert_eq!(config.monte_carlo.trials, 400);
    assert_eq!(config.monte_carlo.seed, Some(42));

    let returns = synthetic_returns(7);
    let weights = PortfolioWeights::equal(ASSETS).unwrap();
    let report = RiskReport::from_config(&returns, &weights, &config).unwrap();
    assert_eq!(report.portfolio_value, 100_000.0);
}

#[test]
fn test_load_high_confidence_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/high_confidence.yaml");
    let config = ReportConfig::from_yaml_file(path).expect("Failed to load config");

    assert_eq!(config.confidence_level.value(), 0.99);
    assert!(config.monte_carlo.parallel);
    assert_eq!(config.monte_carlo.horizon_days, 1);
}

#[test]
fn test_missing_config_file() {
    let result = ReportConfig::from_yaml_file("/nonexistent/report.yaml");
    assert!(matches!(result, Err(RiskError::Config(_))));
}

#[test]
fn test_median_confidence_parametric_equals_mean() {
    let returns = synthetic_returns(8);
    let weights = PortfolioWeights::equal(ASSETS).unwrap();
    let stats = returns.statistics(&weights, 0.0).unwrap();

    let report = RiskReport::build(
        &returns,
        &weights,
        level(0.5),
        100_000.0,
        &MonteCarloConfig {
            seed: Some(3),
            ..Default::default()
        },
    )
    .unwrap();

    let parametric = report.parametric().unwrap().fractional;
    assert!((parametric.var - stats.mean).abs() < 1e-15);
}
