//! # ag-var: Portfolio Value at Risk for ag-botkit
//!
//! Estimates one-day downside risk of a weighted multi-asset portfolio from a
//! fixed sample of daily returns, using three independent methods:
//!
//! - **Historical**: empirical percentile and tail mean of realized portfolio returns
//! - **Parametric**: closed-form Gaussian VaR / CVaR from sample mean and volatility
//! - **Monte Carlo**: correlated simulation (Cholesky of the asset covariance),
//!   evaluated with the historical rules
//!
//! All figures use the return sign convention: losses are negative.
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_var::{ConfidenceLevel, MonteCarloConfig, PortfolioWeights, ReturnSeries, RiskReport};
//!
//! let returns = ReturnSeries::new(vec![
//!     ("AAPL", vec![0.012, -0.004, 0.007, -0.021, 0.003, 0.010, -0.008, 0.001]),
//!     ("MSFT", vec![0.009, -0.002, 0.004, -0.015, 0.006, 0.004, -0.011, 0.002]),
//! ])
//! .unwrap();
//! let weights = PortfolioWeights::new(vec![("AAPL", 0.6), ("MSFT", 0.4)]).unwrap();
//!
//! let mc = MonteCarloConfig { seed: Some(42), ..Default::default() };
//! let report = RiskReport::build(
//!     &returns,
//!     &weights,
//!     ConfidenceLevel::new(0.95).unwrap(),
//!     100_000.0,
//!     &mc,
//! )
//! .unwrap();
//!
//! let historical = report.historical().unwrap();
//! assert!(historical.fractional.cvar <= historical.fractional.var);
//! ```

mod config;
mod error;
mod estimator;
mod historical;
mod monte_carlo;
mod parametric;
mod report;
mod returns;
mod sampler;
mod stats;
mod types;

pub use config::{MonteCarloConfig, ReportConfig};
pub use error::{Result, RiskError};
pub use estimator::{MethodOutcome, RiskEstimator};
pub use historical::{HistoricalEstimator, DEFAULT_MIN_OBSERVATIONS};
pub use monte_carlo::{HorizonReduction, MonteCarloEstimator, SimulatedSample};
pub use parametric::ParametricEstimator;
pub use report::RiskReport;
pub use returns::{PortfolioStatistics, PortfolioWeights, ReturnSeries, DEFAULT_WEIGHT_TOLERANCE};
pub use sampler::{cholesky_lower, trial_rng, CorrelatedReturnSampler, ScenarioSet, PIVOT_TOLERANCE};
pub use types::{ConfidenceLevel, RiskEstimate, ScaledEstimate, VarMethod};
