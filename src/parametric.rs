//! Parametric (Gaussian) VaR
//!
//! Assumes portfolio returns are normal with the sample mean and standard deviation:
//!
//! - z    = Φ⁻¹(1 - c)
//! - VaR  = μ + z·σ
//! - CVaR = μ - σ·φ(z) / (1 - c)
//!
//! z is negative for c > 0.5, so both figures are negative for losses.
//! The loss-positive form -(μ + z·σ) is available through
//! [`RiskEstimate::loss_view`].

use crate::error::{Result, RiskError};
use crate::estimator::{MethodOutcome, RiskEstimator};
use crate::returns::PortfolioStatistics;
use crate::types::{ConfidenceLevel, RiskEstimate, VarMethod};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Closed-form normal VaR / CVaR estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct ParametricEstimator;

impl ParametricEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Critical value z = Φ⁻¹(1 - c) of the standard normal
    pub fn critical_value(confidence: ConfidenceLevel) -> Result<f64> {
        let normal = standard_normal()?;
        Ok(normal.inverse_cdf(confidence.tail_probability()))
    }

    /// Estimate VaR and CVaR from a mean and standard deviation
    pub fn estimate(
        &self,
        mean: f64,
        std_dev: f64,
        confidence: ConfidenceLevel,
    ) -> Result<RiskEstimate> {
        if !mean.is_finite() {
            return Err(RiskError::invalid(format!("mean {} must be finite", mean)));
        }
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(RiskError::invalid(format!(
                "standard deviation {} must be finite and non-negative",
                std_dev
            )));
        }

        let normal = standard_normal()?;
        let tail = confidence.tail_probability();
        let z = normal.inverse_cdf(tail);

        let var = mean + z * std_dev;
        let cvar = mean - std_dev * normal.pdf(z) / tail;

        Ok(RiskEstimate::new(var, cvar))
    }
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| RiskError::invalid(e.to_string()))
}

impl RiskEstimator for ParametricEstimator {
    fn method(&self) -> VarMethod {
        VarMethod::Parametric
    }

    fn estimate_portfolio(
        &self,
        stats: &PortfolioStatistics,
        confidence: ConfidenceLevel,
    ) -> Result<MethodOutcome> {
        let estimate = self.estimate(stats.mean, stats.std_dev, confidence)?;
        Ok(MethodOutcome::new(VarMethod::Parametric, estimate))
    }
}
