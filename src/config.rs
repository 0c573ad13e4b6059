//! Report and simulation configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```yaml
//! confidence_level: 0.99
//! portfolio_value: 250000.0
//! monte_carlo:
//!   trials: 10000
//!   seed: 42
//! ```

use crate::error::{Result, RiskError};
use crate::historical::DEFAULT_MIN_OBSERVATIONS;
use crate::monte_carlo::HorizonReduction;
use crate::returns::DEFAULT_WEIGHT_TOLERANCE;
use crate::types::ConfidenceLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Monte Carlo simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of independent trials
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Simulated days per trial
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,

    /// Base seed for reproducible runs (None = fresh seed per run)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// How each trial's daily returns reduce to one outcome
    #[serde(default)]
    pub reduction: HorizonReduction,

    /// Generate trials on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            horizon_days: default_horizon_days(),
            seed: None,
            reduction: HorizonReduction::default(),
            parallel: false,
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(RiskError::invalid("number of trials must be positive"));
        }
        if self.horizon_days == 0 {
            return Err(RiskError::invalid("horizon must be at least one day"));
        }
        Ok(())
    }
}

/// Full configuration of a risk report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,

    /// Portfolio value in currency units
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: f64,

    /// Minimum sample size for historical and simulated tails
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,

    /// Allowed |sum(weights) - 1|
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,

    /// Added to the covariance diagonal before factorization
    #[serde(default)]
    pub covariance_regularization: f64,

    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            confidence_level: ConfidenceLevel::default(),
            portfolio_value: default_portfolio_value(),
            min_observations: default_min_observations(),
            weight_tolerance: default_weight_tolerance(),
            covariance_regularization: 0.0,
            monte_carlo: MonteCarloConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ReportConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.portfolio_value.is_finite() || self.portfolio_value < 0.0 {
            return Err(RiskError::invalid(format!(
                "portfolio value {} must be finite and non-negative",
                self.portfolio_value
            )));
        }
        if self.min_observations == 0 {
            return Err(RiskError::invalid("min_observations must be positive"));
        }
        if !self.weight_tolerance.is_finite() || self.weight_tolerance < 0.0 {
            return Err(RiskError::invalid("weight tolerance must be non-negative"));
        }
        if !self.covariance_regularization.is_finite() || self.covariance_regularization < 0.0 {
            return Err(RiskError::invalid(
                "covariance regularization must be non-negative",
            ));
        }
        self.monte_carlo.validate()
    }
}

fn default_trials() -> usize {
    400
}

fn default_horizon_days() -> usize {
    1
}

fn default_portfolio_value() -> f64 {
    100_000.0
}

fn default_min_observations() -> usize {
    DEFAULT_MIN_OBSERVATIONS
}

fn default_weight_tolerance() -> f64 {
    DEFAULT_WEIGHT_TOLERANCE
}
