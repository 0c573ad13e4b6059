//! Asset return series, portfolio weights and the statistics derived from them
//!
//! Returns arrive already cleaned: one aligned series of fractional daily
//! returns per asset, no gaps. Assets are kept in identifier order so that
//! mean vectors, covariance rows and weight vectors all line up.

use crate::error::{Result, RiskError};
use crate::stats;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Default tolerance on |sum(weights) - 1|
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-asset daily returns, aligned by period
#[derive(Debug, Clone, Serialize)]
pub struct ReturnSeries {
    assets: BTreeMap<String, Vec<f64>>,
    num_periods: usize,
}

impl ReturnSeries {
    /// Build from per-asset series
    ///
    /// Fails if there are no assets, if series lengths differ, or if any
    /// observation is NaN or infinite.
    pub fn new<I, S>(series: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let assets: BTreeMap<String, Vec<f64>> =
            series.into_iter().map(|(id, r)| (id.into(), r)).collect();

        let num_periods = match assets.values().next() {
            Some(first) => first.len(),
            None => return Err(RiskError::invalid("return series has no assets")),
        };

        for (asset, returns) in &assets {
            if returns.len() != num_periods {
                return Err(RiskError::invalid(format!(
                    "asset {} has {} observations, expected {}",
                    asset,
                    returns.len(),
                    num_periods
                )));
            }
            if let Some(pos) = returns.iter().position(|r| !r.is_finite()) {
                return Err(RiskError::invalid(format!(
                    "asset {} has a non-finite return at period {}",
                    asset, pos
                )));
            }
        }

        Ok(Self { assets, num_periods })
    }

    /// Asset identifiers in canonical (sorted) order
    pub fn asset_ids(&self) -> Vec<&str> {
        self.assets.keys().map(String::as_str).collect()
    }

    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    pub fn returns(&self, asset_id: &str) -> Option<&[f64]> {
        self.assets.get(asset_id).map(Vec::as_slice)
    }

    /// Weighted portfolio return per period: sum_i w_i * r_i,t
    pub fn portfolio_returns(&self, weights: &PortfolioWeights) -> Result<Vec<f64>> {
        let w = weights.aligned_to(self)?;
        Ok(self.portfolio_returns_aligned(&w))
    }

    fn portfolio_returns_aligned(&self, w: &DVector<f64>) -> Vec<f64> {
        (0..self.num_periods)
            .map(|t| {
                self.assets
                    .values()
                    .zip(w.iter())
                    .map(|(returns, weight)| weight * returns[t])
                    .sum()
            })
            .collect()
    }

    /// Mean return of each asset, in canonical order
    pub fn mean_vector(&self) -> DVector<f64> {
        DVector::from_iterator(self.assets.len(), self.assets.values().map(|r| stats::mean(r)))
    }

    /// Sample covariance matrix (n - 1 denominator) in canonical asset order
    ///
    /// `regularization` is added to the diagonal; pass 0.0 for the raw estimate.
    pub fn covariance_matrix(&self, regularization: f64) -> Result<DMatrix<f64>> {
        if self.num_periods < 2 {
            return Err(RiskError::InsufficientData {
                required: 2,
                actual: self.num_periods,
            });
        }

        let means = self.mean_vector();
        let series: Vec<&Vec<f64>> = self.assets.values().collect();
        let n = series.len();
        let denom = (self.num_periods - 1) as f64;

        let mut cov = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let c = series[i]
                    .iter()
                    .zip(series[j].iter())
                    .map(|(r_i, r_j)| (r_i - means[i]) * (r_j - means[j]))
                    .sum::<f64>()
                    / denom;
                cov[(i, j)] = c;
                cov[(j, i)] = c;
            }
        }

        for i in 0..n {
            cov[(i, i)] += regularization;
        }

        Ok(cov)
    }

    /// Compute every statistic the estimators share, once
    pub fn statistics(
        &self,
        weights: &PortfolioWeights,
        regularization: f64,
    ) -> Result<PortfolioStatistics> {
        let w = weights.aligned_to(self)?;
        let portfolio_returns = self.portfolio_returns_aligned(&w);
        let covariance = self.covariance_matrix(regularization)?;

        let mean = stats::mean(&portfolio_returns);
        let std_dev = stats::sample_std_dev(&portfolio_returns);

        debug!(
            assets = self.num_assets(),
            periods = self.num_periods,
            mean,
            std_dev,
            "Computed portfolio statistics"
        );

        Ok(PortfolioStatistics {
            asset_ids: self.assets.keys().cloned().collect(),
            weights: w,
            portfolio_returns,
            mean,
            std_dev,
            mean_vector: self.mean_vector(),
            covariance,
        })
    }
}

/// Portfolio weights keyed by asset identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PortfolioWeights {
    weights: BTreeMap<String, f64>,
}

impl PortfolioWeights {
    /// Build from (asset, weight) pairs; weights must be finite and non-negative
    pub fn new<I, S>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let weights: BTreeMap<String, f64> =
            weights.into_iter().map(|(id, w)| (id.into(), w)).collect();

        for (asset, &w) in &weights {
            if !w.is_finite() || w < 0.0 {
                return Err(RiskError::WeightMismatch(format!(
                    "weight for {} must be finite and non-negative, got {}",
                    asset, w
                )));
            }
        }

        Ok(Self { weights })
    }

    /// Equal weight 1/n across the given assets
    pub fn equal<I, S>(assets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = assets.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(RiskError::WeightMismatch("no assets to weight".to_string()));
        }
        let w = 1.0 / ids.len() as f64;
        Self::new(ids.into_iter().map(|id| (id, w)))
    }

    /// Rescale so the weights sum to exactly 1
    pub fn normalized(&self) -> Result<Self> {
        let total = self.total();
        if total <= 0.0 {
            return Err(RiskError::WeightMismatch(
                "cannot normalize weights that sum to zero".to_string(),
            ));
        }
        Ok(Self {
            weights: self
                .weights
                .iter()
                .map(|(id, w)| (id.clone(), w / total))
                .collect(),
        })
    }

    pub fn get(&self, asset_id: &str) -> Option<f64> {
        self.weights.get(asset_id).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Check the weights sum to 1 within `tolerance`
    pub fn validate_sum(&self, tolerance: f64) -> Result<()> {
        let total = self.total();
        if (total - 1.0).abs() > tolerance {
            return Err(RiskError::WeightMismatch(format!(
                "weights sum to {}, expected 1.0 (tolerance {})",
                total, tolerance
            )));
        }
        Ok(())
    }

    /// Check the weights cover exactly the assets of `returns`
    pub fn validate_against(&self, returns: &ReturnSeries) -> Result<()> {
        let missing: Vec<&str> = returns
            .asset_ids()
            .into_iter()
            .filter(|id| !self.weights.contains_key(*id))
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::WeightMismatch(format!(
                "no weight for assets: {}",
                missing.join(", ")
            )));
        }

        let unknown: Vec<&str> = self
            .weights
            .keys()
            .filter(|id| returns.returns(id).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(RiskError::WeightMismatch(format!(
                "weights reference assets without returns: {}",
                unknown.join(", ")
            )));
        }

        Ok(())
    }

    /// Weight vector in the canonical asset order of `returns`
    pub fn aligned_to(&self, returns: &ReturnSeries) -> Result<DVector<f64>> {
        self.validate_against(returns)?;
        Ok(DVector::from_iterator(
            returns.num_assets(),
            returns.asset_ids().into_iter().map(|id| self.weights[id]),
        ))
    }
}

impl TryFrom<BTreeMap<String, f64>> for PortfolioWeights {
    type Error = RiskError;

    fn try_from(weights: BTreeMap<String, f64>) -> Result<Self> {
        Self::new(weights)
    }
}

impl From<PortfolioWeights> for BTreeMap<String, f64> {
    fn from(weights: PortfolioWeights) -> Self {
        weights.weights
    }
}

/// Statistics shared by all estimators for one report
///
/// Everything here is derived once from a [`ReturnSeries`] and treated as
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct PortfolioStatistics {
    /// Asset identifiers, in the order used by every vector and matrix below
    pub asset_ids: Vec<String>,

    pub weights: DVector<f64>,

    /// Realized weighted portfolio return per period
    pub portfolio_returns: Vec<f64>,

    /// Mean of the portfolio return series
    pub mean: f64,

    /// Sample standard deviation of the portfolio return series
    pub std_dev: f64,

    /// Per-asset mean returns
    pub mean_vector: DVector<f64>,

    /// Per-asset sample covariance
    pub covariance: DMatrix<f64>,
}
