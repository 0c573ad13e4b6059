//! Correlated return simulation via Cholesky factorization
//!
//! Given per-asset means μ and a covariance matrix Σ = L·Lᵗ, each simulated
//! day is μ + L·Z with Z a vector of independent standard normals. Days are
//! drawn independently of each other: no autocorrelation is modelled.
//!
//! Randomness is always injected. [`CorrelatedReturnSampler::sample`] consumes
//! a caller-supplied stream in trial order; [`CorrelatedReturnSampler::sample_partitioned`]
//! gives every trial its own stream derived from a base seed, so trials can be
//! generated on any number of threads with identical results.

use crate::error::{Result, RiskError};
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use tracing::warn;

/// Smallest accepted ratio of a Cholesky pivot² to the matching diagonal entry
///
/// A pivot² is the variance of an asset left unexplained by the assets before
/// it; anything below this fraction of its total variance is treated as a
/// linear combination of the others.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Lower-triangular L with L·Lᵗ = `covariance`
///
/// Fails with [`RiskError::NonPositiveDefiniteCovariance`] for non-square,
/// asymmetric, non-finite, singular or indefinite matrices.
pub fn cholesky_lower(covariance: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = covariance.nrows();
    if n == 0 || covariance.ncols() != n {
        return Err(RiskError::NonPositiveDefiniteCovariance(format!(
            "matrix must be square and non-empty, got {}x{}",
            covariance.nrows(),
            covariance.ncols()
        )));
    }
    if covariance.iter().any(|v| !v.is_finite()) {
        return Err(RiskError::NonPositiveDefiniteCovariance(
            "matrix contains non-finite entries".to_string(),
        ));
    }

    let scale = covariance.diagonal().amax().max(f64::MIN_POSITIVE);
    for i in 0..n {
        for j in (i + 1)..n {
            if (covariance[(i, j)] - covariance[(j, i)]).abs() > 1e-10 * scale {
                return Err(RiskError::NonPositiveDefiniteCovariance(format!(
                    "matrix is not symmetric at ({}, {})",
                    i, j
                )));
            }
        }
    }

    let lower = match Cholesky::new(covariance.clone()) {
        Some(chol) => chol.unpack(),
        None => {
            warn!(assets = n, "Covariance factorization failed");
            return Err(RiskError::NonPositiveDefiniteCovariance(format!(
                "Cholesky factorization failed for {} assets",
                n
            )));
        }
    };

    for j in 0..n {
        let pivot_sq = lower[(j, j)] * lower[(j, j)];
        if pivot_sq <= PIVOT_TOLERANCE * covariance[(j, j)] {
            warn!(asset_index = j, pivot_sq, "Degenerate covariance pivot");
            return Err(RiskError::NonPositiveDefiniteCovariance(format!(
                "asset index {} is (nearly) a linear combination of the preceding assets",
                j
            )));
        }
    }

    Ok(lower)
}

/// Per-trial RNG stream derived from a base seed
pub fn trial_rng(seed: u64, trial: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add((trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

/// Simulated asset returns: one (days × assets) matrix per trial
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    paths: Vec<DMatrix<f64>>,
    horizon_days: usize,
    num_assets: usize,
}

impl ScenarioSet {
    pub fn trials(&self) -> usize {
        self.paths.len()
    }

    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    /// Returns of trial `trial`; row = day, column = asset
    pub fn path(&self, trial: usize) -> &DMatrix<f64> {
        &self.paths[trial]
    }

    pub fn paths(&self) -> &[DMatrix<f64>] {
        &self.paths
    }

    /// Asset return vector for one trial and day
    pub fn day(&self, trial: usize, day: usize) -> Vec<f64> {
        self.paths[trial].row(day).iter().copied().collect()
    }
}

/// Draws correlated daily asset return vectors
#[derive(Debug, Clone)]
pub struct CorrelatedReturnSampler {
    mean: DVector<f64>,
    lower: DMatrix<f64>,
}

impl CorrelatedReturnSampler {
    /// Factorize `covariance` once for repeated sampling
    pub fn new(mean_vector: DVector<f64>, covariance: &DMatrix<f64>) -> Result<Self> {
        if mean_vector.len() != covariance.nrows() {
            return Err(RiskError::invalid(format!(
                "mean vector has {} assets, covariance matrix has {}",
                mean_vector.len(),
                covariance.nrows()
            )));
        }
        if mean_vector.iter().any(|m| !m.is_finite()) {
            return Err(RiskError::invalid("mean vector contains non-finite values"));
        }

        let lower = cholesky_lower(covariance)?;
        Ok(Self {
            mean: mean_vector,
            lower,
        })
    }

    pub fn num_assets(&self) -> usize {
        self.mean.len()
    }

    /// The Cholesky factor L
    pub fn cholesky_factor(&self) -> &DMatrix<f64> {
        &self.lower
    }

    /// One day of correlated asset returns: μ + L·Z
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> DVector<f64> {
        let z = DVector::from_fn(self.num_assets(), |_, _| {
            let v: f64 = StandardNormal.sample(&mut *rng);
            v
        });
        &self.mean + &self.lower * z
    }

    /// One trial: `horizon_days` independent days
    pub fn sample_path<R: Rng + ?Sized>(&self, horizon_days: usize, rng: &mut R) -> DMatrix<f64> {
        let mut path = DMatrix::zeros(horizon_days, self.num_assets());
        for day in 0..horizon_days {
            let returns = self.draw(&mut *rng);
            path.set_row(day, &returns.transpose());
        }
        path
    }

    /// `trials` × `horizon_days` × assets, drawn sequentially from `rng`
    pub fn sample<R: Rng + ?Sized>(
        &self,
        trials: usize,
        horizon_days: usize,
        rng: &mut R,
    ) -> Result<ScenarioSet> {
        validate_shape(trials, horizon_days)?;
        let paths: Vec<DMatrix<f64>> = (0..trials)
            .map(|_| self.sample_path(horizon_days, &mut *rng))
            .collect();
        Ok(self.scenario_set(paths, horizon_days))
    }

    /// Same shape as [`Self::sample`], trial `t` drawn from [`trial_rng`]`(seed, t)`
    ///
    /// The output depends only on `seed`, never on `parallel` or thread count.
    pub fn sample_partitioned(
        &self,
        trials: usize,
        horizon_days: usize,
        seed: u64,
        parallel: bool,
    ) -> Result<ScenarioSet> {
        validate_shape(trials, horizon_days)?;
        let simulate = |trial: usize| {
            let mut rng = trial_rng(seed, trial);
            self.sample_path(horizon_days, &mut rng)
        };

        let paths: Vec<DMatrix<f64>> = if parallel {
            (0..trials).into_par_iter().map(simulate).collect()
        } else {
            (0..trials).map(simulate).collect()
        };
        Ok(self.scenario_set(paths, horizon_days))
    }

    fn scenario_set(&self, paths: Vec<DMatrix<f64>>, horizon_days: usize) -> ScenarioSet {
        ScenarioSet {
            paths,
            horizon_days,
            num_assets: self.num_assets(),
        }
    }
}

fn validate_shape(trials: usize, horizon_days: usize) -> Result<()> {
    if trials == 0 {
        return Err(RiskError::invalid("number of trials must be positive"));
    }
    if horizon_days == 0 {
        return Err(RiskError::invalid("horizon must be at least one day"));
    }
    Ok(())
}
