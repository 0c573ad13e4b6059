//! Common interface over the VaR estimation methods

use crate::error::Result;
use crate::monte_carlo::SimulatedSample;
use crate::returns::PortfolioStatistics;
use crate::types::{ConfidenceLevel, RiskEstimate, VarMethod};

/// A VaR / CVaR estimation method
///
/// Implementations read the shared [`PortfolioStatistics`] and never
/// recompute them. [`crate::RiskReport::build_with`] runs any set of these.
pub trait RiskEstimator: Send + Sync {
    fn method(&self) -> VarMethod;

    fn estimate_portfolio(
        &self,
        stats: &PortfolioStatistics,
        confidence: ConfidenceLevel,
    ) -> Result<MethodOutcome>;
}

/// Output of one estimator run
#[derive(Debug, Clone)]
pub struct MethodOutcome {
    pub method: VarMethod,
    pub estimate: RiskEstimate,

    /// Simulated sample, for simulation-based methods only
    pub simulation: Option<SimulatedSample>,
}

impl MethodOutcome {
    pub fn new(method: VarMethod, estimate: RiskEstimate) -> Self {
        Self {
            method,
            estimate,
            simulation: None,
        }
    }

    pub fn with_simulation(mut self, simulation: SimulatedSample) -> Self {
        self.simulation = Some(simulation);
        self
    }
}
