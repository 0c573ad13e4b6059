//! Risk report: every estimator run against one return series
//!
//! Shared statistics are computed once and handed to each estimator. A
//! report is all-or-nothing: the first failing estimator fails the build.

use crate::config::{MonteCarloConfig, ReportConfig};
use crate::error::{Result, RiskError};
use crate::estimator::RiskEstimator;
use crate::historical::HistoricalEstimator;
use crate::monte_carlo::{MonteCarloEstimator, SimulatedSample};
use crate::parametric::ParametricEstimator;
use crate::returns::{PortfolioWeights, ReturnSeries};
use crate::types::{ConfidenceLevel, ScaledEstimate, VarMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// VaR / CVaR figures from every configured method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub confidence_level: ConfidenceLevel,

    /// Portfolio value used for the currency amounts
    pub portfolio_value: f64,

    /// One entry per estimator, in run order
    pub estimates: Vec<ScaledEstimate>,

    /// Simulated portfolio returns behind the Monte Carlo estimate
    pub simulation: Option<SimulatedSample>,

    pub generated_at: DateTime<Utc>,
}

impl RiskReport {
    /// Historical, parametric and Monte Carlo estimates with default settings otherwise
    pub fn build(
        returns: &ReturnSeries,
        weights: &PortfolioWeights,
        confidence_level: ConfidenceLevel,
        portfolio_value: f64,
        monte_carlo: &MonteCarloConfig,
    ) -> Result<Self> {
        let config = ReportConfig {
            confidence_level,
            portfolio_value,
            monte_carlo: monte_carlo.clone(),
            ..Default::default()
        };
        Self::from_config(returns, weights, &config)
    }

    /// Historical, parametric and Monte Carlo estimates
    pub fn from_config(
        returns: &ReturnSeries,
        weights: &PortfolioWeights,
        config: &ReportConfig,
    ) -> Result<Self> {
        config.validate()?;
        let estimators: Vec<Box<dyn RiskEstimator>> = vec![
            Box::new(HistoricalEstimator::new(config.min_observations)),
            Box::new(ParametricEstimator::new()),
            Box::new(
                MonteCarloEstimator::new(config.monte_carlo.clone())?
                    .with_min_observations(config.min_observations),
            ),
        ];
        Self::build_with(returns, weights, config, &estimators)
    }

    /// Run an arbitrary set of estimators
    pub fn build_with(
        returns: &ReturnSeries,
        weights: &PortfolioWeights,
        config: &ReportConfig,
        estimators: &[Box<dyn RiskEstimator>],
    ) -> Result<Self> {
        config.validate()?;
        if estimators.is_empty() {
            return Err(RiskError::invalid("no estimators configured"));
        }

        weights.validate_against(returns)?;
        weights.validate_sum(config.weight_tolerance)?;

        let stats = returns.statistics(weights, config.covariance_regularization)?;

        let mut estimates = Vec::with_capacity(estimators.len());
        let mut simulation = None;
        for estimator in estimators {
            let outcome = estimator.estimate_portfolio(&stats, config.confidence_level)?;
            estimates.push(ScaledEstimate::new(
                outcome.method,
                outcome.estimate,
                config.portfolio_value,
            ));
            if outcome.simulation.is_some() {
                simulation = outcome.simulation;
            }
        }

        info!(
            assets = returns.num_assets(),
            periods = returns.num_periods(),
            methods = estimates.len(),
            confidence = config.confidence_level.value(),
            "Risk report built"
        );

        Ok(Self {
            confidence_level: config.confidence_level,
            portfolio_value: config.portfolio_value,
            estimates,
            simulation,
            generated_at: Utc::now(),
        })
    }

    pub fn estimate(&self, method: VarMethod) -> Option<&ScaledEstimate> {
        self.estimates.iter().find(|e| e.method == method)
    }

    pub fn historical(&self) -> Option<&ScaledEstimate> {
        self.estimate(VarMethod::Historical)
    }

    pub fn parametric(&self) -> Option<&ScaledEstimate> {
        self.estimate(VarMethod::Parametric)
    }

    pub fn monte_carlo(&self) -> Option<&ScaledEstimate> {
        self.estimate(VarMethod::MonteCarlo)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Risk report at {} confidence, portfolio value {:.2}",
            self.confidence_level, self.portfolio_value
        )?;
        for estimate in &self.estimates {
            writeln!(f, "  {}", estimate)?;
        }
        if let Some(sim) = &self.simulation {
            writeln!(
                f,
                "  Monte Carlo: {} trials, VaR cut at the {:.2}th percentile",
                sim.returns.len(),
                sim.var_percentile
            )?;
        }
        Ok(())
    }
}
