//! Monte Carlo VaR from correlated simulated returns
//!
//! Each trial simulates `horizon_days` of correlated asset returns, turns them
//! into a portfolio return path and reduces the path to one outcome. The
//! trial outcomes form a sample that is evaluated with the same quantile and
//! tail-mean rules as [`HistoricalEstimator`].

use crate::config::MonteCarloConfig;
use crate::error::{Result, RiskError};
use crate::estimator::{MethodOutcome, RiskEstimator};
use crate::historical::{HistoricalEstimator, DEFAULT_MIN_OBSERVATIONS};
use crate::returns::PortfolioStatistics;
use crate::sampler::{CorrelatedReturnSampler, ScenarioSet};
use crate::types::{ConfidenceLevel, RiskEstimate, VarMethod};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How a trial's daily portfolio returns collapse into one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonReduction {
    /// Portfolio return of the last simulated day
    #[default]
    Terminal,

    /// Compounded return over the whole horizon: Π(1 + r_t) - 1
    Cumulative,
}

impl HorizonReduction {
    pub fn reduce(&self, daily_returns: &[f64]) -> f64 {
        match self {
            HorizonReduction::Terminal => daily_returns.last().copied().unwrap_or(0.0),
            HorizonReduction::Cumulative => {
                daily_returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
            }
        }
    }
}

/// Simulated portfolio outcomes of one Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedSample {
    /// One reduced portfolio return per trial, in trial order
    pub returns: Vec<f64>,

    /// Percentile of `returns` at which VaR is cut, e.g. 5.0 for 95% confidence
    pub var_percentile: f64,

    pub estimate: RiskEstimate,

    /// Base seed of a partitioned run; `None` when an external stream was used
    pub seed: Option<u64>,
}

/// Monte Carlo VaR / CVaR estimator
#[derive(Debug, Clone)]
pub struct MonteCarloEstimator {
    config: MonteCarloConfig,
    historical: HistoricalEstimator,
}

impl MonteCarloEstimator {
    pub fn new(config: MonteCarloConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            historical: HistoricalEstimator::new(DEFAULT_MIN_OBSERVATIONS),
        })
    }

    /// Minimum number of trials accepted by the tail reduction
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.historical = HistoricalEstimator::new(min_observations);
        self
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// VaR / CVaR with randomness drawn from `rng`
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        mean_vector: &DVector<f64>,
        covariance: &DMatrix<f64>,
        weights: &DVector<f64>,
        confidence: ConfidenceLevel,
        rng: &mut R,
    ) -> Result<RiskEstimate> {
        Ok(self
            .simulate(mean_vector, covariance, weights, confidence, rng)?
            .estimate)
    }

    /// Full simulated sample with randomness drawn from `rng`
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        mean_vector: &DVector<f64>,
        covariance: &DMatrix<f64>,
        weights: &DVector<f64>,
        confidence: ConfidenceLevel,
        rng: &mut R,
    ) -> Result<SimulatedSample> {
        let sampler = self.sampler(mean_vector, covariance, weights)?;
        let scenarios = sampler.sample(self.config.trials, self.config.horizon_days, rng)?;
        self.evaluate(&scenarios, weights, confidence, None)
    }

    /// Full simulated sample with one RNG stream per trial derived from `seed`
    ///
    /// Runs trials on the rayon pool when `parallel` is set; the result is
    /// identical either way.
    pub fn simulate_seeded(
        &self,
        mean_vector: &DVector<f64>,
        covariance: &DMatrix<f64>,
        weights: &DVector<f64>,
        confidence: ConfidenceLevel,
        seed: u64,
    ) -> Result<SimulatedSample> {
        let sampler = self.sampler(mean_vector, covariance, weights)?;
        let scenarios = sampler.sample_partitioned(
            self.config.trials,
            self.config.horizon_days,
            seed,
            self.config.parallel,
        )?;
        self.evaluate(&scenarios, weights, confidence, Some(seed))
    }

    fn sampler(
        &self,
        mean_vector: &DVector<f64>,
        covariance: &DMatrix<f64>,
        weights: &DVector<f64>,
    ) -> Result<CorrelatedReturnSampler> {
        if weights.len() != mean_vector.len() {
            return Err(RiskError::WeightMismatch(format!(
                "{} weights for {} simulated assets",
                weights.len(),
                mean_vector.len()
            )));
        }

        debug!(
            assets = mean_vector.len(),
            trials = self.config.trials,
            horizon_days = self.config.horizon_days,
            reduction = ?self.config.reduction,
            "Starting Monte Carlo simulation"
        );

        CorrelatedReturnSampler::new(mean_vector.clone(), covariance)
    }

    fn evaluate(
        &self,
        scenarios: &ScenarioSet,
        weights: &DVector<f64>,
        confidence: ConfidenceLevel,
        seed: Option<u64>,
    ) -> Result<SimulatedSample> {
        let returns: Vec<f64> = scenarios
            .paths()
            .iter()
            .map(|path| {
                let daily = path * weights;
                self.config.reduction.reduce(daily.as_slice())
            })
            .collect();

        let estimate = self.historical.estimate(&returns, confidence)?;

        info!(
            trials = returns.len(),
            var = estimate.var,
            cvar = estimate.cvar,
            "Monte Carlo estimate complete"
        );

        Ok(SimulatedSample {
            returns,
            var_percentile: confidence.tail_probability() * 100.0,
            estimate,
            seed,
        })
    }
}

impl RiskEstimator for MonteCarloEstimator {
    fn method(&self) -> VarMethod {
        VarMethod::MonteCarlo
    }

    /// Uses the configured seed, or a fresh one recorded in the sample
    fn estimate_portfolio(
        &self,
        stats: &PortfolioStatistics,
        confidence: ConfidenceLevel,
    ) -> Result<MethodOutcome> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let sample = self.simulate_seeded(
            &stats.mean_vector,
            &stats.covariance,
            &stats.weights,
            confidence,
            seed,
        )?;
        Ok(MethodOutcome::new(VarMethod::MonteCarlo, sample.estimate).with_simulation(sample))
    }
}
