//! Error types for VaR estimation

use thiserror::Error;

/// Errors that can occur while estimating portfolio risk
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Return sample too small for a quantile / tail mean
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Covariance matrix could not be Cholesky-factorized
    #[error("Covariance matrix is not positive definite: {0}")]
    NonPositiveDefiniteCovariance(String),

    /// Weights and return series disagree on the asset set, or weights do not sum to 1
    #[error("Weight mismatch: {0}")]
    WeightMismatch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RiskError::InvalidParameter(msg.into())
    }
}

impl From<serde_yaml::Error> for RiskError {
    fn from(err: serde_yaml::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

impl From<std::io::Error> for RiskError {
    fn from(err: std::io::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

/// Result type for risk estimation
pub type Result<T> = std::result::Result<T, RiskError>;
