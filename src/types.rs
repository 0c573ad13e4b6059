//! Shared value types: confidence levels, estimation methods and estimates

use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence level strictly inside (0, 1), e.g. 0.95
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// Validate and wrap a confidence level
    pub fn new(level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(RiskError::invalid(format!(
                "confidence level {} must be strictly between 0 and 1",
                level
            )));
        }
        Ok(Self(level))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Probability mass of the loss tail: 1 - level
    pub fn tail_probability(self) -> f64 {
        1.0 - self.0
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(0.95)
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = RiskError;

    fn try_from(level: f64) -> Result<Self> {
        Self::new(level)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> f64 {
        level.0
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

/// VaR calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarMethod {
    Historical,
    Parametric,
    MonteCarlo,
}

impl VarMethod {
    pub fn name(&self) -> &'static str {
        match self {
            VarMethod::Historical => "Historical",
            VarMethod::Parametric => "Parametric",
            VarMethod::MonteCarlo => "MonteCarlo",
        }
    }
}

/// A (VaR, CVaR) pair
///
/// Both figures follow the return sign convention: losses are negative.
/// A 95% VaR of `-0.02` reads "on 5% of days the portfolio loses at least 2%".
/// CVaR is never above VaR for confidence levels of 0.5 and higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    /// Value at Risk
    pub var: f64,

    /// Conditional VaR (expected shortfall)
    pub cvar: f64,
}

impl RiskEstimate {
    pub fn new(var: f64, cvar: f64) -> Self {
        Self { var, cvar }
    }

    /// Scale fractional figures to currency amounts (still negative for losses)
    pub fn scaled(&self, portfolio_value: f64) -> Self {
        Self {
            var: self.var * portfolio_value,
            cvar: self.cvar * portfolio_value,
        }
    }

    /// Same estimate with losses expressed as positive numbers
    pub fn loss_view(&self) -> Self {
        Self {
            var: -self.var,
            cvar: -self.cvar,
        }
    }
}

/// An estimate in both fractional and currency terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledEstimate {
    pub method: VarMethod,

    /// Fractional returns
    pub fractional: RiskEstimate,

    /// Currency amounts: fractional * portfolio value
    pub amount: RiskEstimate,
}

impl ScaledEstimate {
    pub fn new(method: VarMethod, fractional: RiskEstimate, portfolio_value: f64) -> Self {
        Self {
            method,
            fractional,
            amount: fractional.scaled(portfolio_value),
        }
    }
}

impl fmt::Display for ScaledEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<11} VaR {:>8.4}% ({:>12.2})  CVaR {:>8.4}% ({:>12.2})",
            self.method.name(),
            self.fractional.var * 100.0,
            self.amount.var,
            self.fractional.cvar * 100.0,
            self.amount.cvar
        )
    }
}
