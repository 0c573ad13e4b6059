//! Historical VaR: empirical percentile and tail mean of a return sample
//!
//! The quantile uses linear interpolation between order statistics, so the
//! same sample always yields the same VaR. CVaR is the mean of every
//! observation at or below VaR.

use crate::error::{Result, RiskError};
use crate::estimator::{MethodOutcome, RiskEstimator};
use crate::returns::PortfolioStatistics;
use crate::stats;
use crate::types::{ConfidenceLevel, RiskEstimate, VarMethod};

/// Default minimum sample size for a historical estimate
pub const DEFAULT_MIN_OBSERVATIONS: usize = 2;

/// Empirical VaR / CVaR estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalEstimator {
    min_observations: usize,
}

impl Default for HistoricalEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_OBSERVATIONS)
    }
}

impl HistoricalEstimator {
    /// `min_observations` is clamped to at least 1
    pub fn new(min_observations: usize) -> Self {
        Self {
            min_observations: min_observations.max(1),
        }
    }

    pub fn min_observations(&self) -> usize {
        self.min_observations
    }

    /// Estimate VaR and CVaR from a return sample
    pub fn estimate(&self, returns: &[f64], confidence: ConfidenceLevel) -> Result<RiskEstimate> {
        if returns.len() < self.min_observations {
            return Err(RiskError::InsufficientData {
                required: self.min_observations,
                actual: returns.len(),
            });
        }
        if returns.iter().any(|r| !r.is_finite()) {
            return Err(RiskError::invalid("return sample contains non-finite values"));
        }

        Ok(Self::estimate_sorted(&stats::sorted(returns), confidence))
    }

    /// Estimate from an already ascending, non-empty sample
    pub(crate) fn estimate_sorted(sorted: &[f64], confidence: ConfidenceLevel) -> RiskEstimate {
        let var = stats::linear_quantile(sorted, confidence.tail_probability());
        let cvar = stats::tail_mean(sorted, var).unwrap_or(var);
        RiskEstimate::new(var, cvar)
    }
}

impl RiskEstimator for HistoricalEstimator {
    fn method(&self) -> VarMethod {
        VarMethod::Historical
    }

    fn estimate_portfolio(
        &self,
        stats: &PortfolioStatistics,
        confidence: ConfidenceLevel,
    ) -> Result<MethodOutcome> {
        let estimate = self.estimate(&stats.portfolio_returns, confidence)?;
        Ok(MethodOutcome::new(VarMethod::Historical, estimate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn create_test_returns() -> Vec<f64> {
        vec![
            -0.05, -0.03, -0.02, -0.01, 0.00,
            0.01, 0.02, 0.03, 0.04, 0.05,
            -0.04, 0.01, 0.02, -0.01, 0.03,
            0.00, -0.02, 0.01, 0.02, -0.01,
        ]
    }

    fn level(c: f64) -> ConfidenceLevel {
        ConfidenceLevel::new(c).unwrap()
    }

    #[test]
    fn test_historical_var() {
        let estimator = HistoricalEstimator::default();
        let result = estimator.estimate(&create_test_returns(), level(0.95)).unwrap();

        // Sorted: -0.05, -0.04, ...; h = 19 * 0.05 = 0.95
        let expected_var = -0.05 + 0.95 * (-0.04 - -0.05);
        assert_relative_eq!(result.var, expected_var, epsilon = 1e-12);
        // Only -0.05 lies at or below VaR
        assert_relative_eq!(result.cvar, -0.05, epsilon = 1e-12);
        assert!(result.cvar <= result.var);
    }

    #[test]
    fn test_tail_includes_var_point() {
        let estimator = HistoricalEstimator::default();
        // h = 4 * 0.25 = 1.0 lands exactly on -0.02
        let result = estimator
            .estimate(&[0.01, -0.02, 0.03, -0.04, 0.0], level(0.75))
            .unwrap();

        assert_relative_eq!(result.var, -0.02, epsilon = 1e-12);
        assert_relative_eq!(result.cvar, -0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_insufficient_data() {
        let estimator = HistoricalEstimator::default();
        let result = estimator.estimate(&[0.01], level(0.95));
        assert_eq!(
            result.unwrap_err(),
            RiskError::InsufficientData { required: 2, actual: 1 }
        );

        let strict = HistoricalEstimator::new(30);
        assert!(strict.estimate(&create_test_returns(), level(0.95)).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let estimator = HistoricalEstimator::default();
        let result = estimator.estimate(&[0.01, f64::NAN, -0.02], level(0.95));
        assert!(matches!(result, Err(RiskError::InvalidParameter(_))));
    }

    #[test]
    fn test_order_independent() {
        let estimator = HistoricalEstimator::default();
        let mut reversed = create_test_returns();
        reversed.reverse();

        let a = estimator.estimate(&create_test_returns(), level(0.9)).unwrap();
        let b = estimator.estimate(&reversed, level(0.9)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_var_within_sample_and_cvar_below_var(
            returns in prop::collection::vec(-0.2f64..0.2, 2..300),
            confidence in 0.5f64..0.995,
        ) {
            let estimator = HistoricalEstimator::default();
            let result = estimator.estimate(&returns, level(confidence)).unwrap();

            let min = returns.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = returns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            prop_assert!(result.var >= min - 1e-12);
            prop_assert!(result.var <= max + 1e-12);
            prop_assert!(result.cvar <= result.var + 1e-12);
        }
    }
}
