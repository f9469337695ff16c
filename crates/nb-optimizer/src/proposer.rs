//! Stochastic local search that picks the next point to evaluate.
//!
//! [`propose`] standardizes the observed values, then runs a greedy random-walk
//! hill-climb: every iteration perturbs the running best by `eps * U[0,1)^D`,
//! clamps into the bounds, scores the candidate with the nearest-neighbor
//! surrogate and the damped UCB, and keeps it only on strict improvement.
//!
//! The initial guess is drawn from the unit box even when custom bounds are
//! given; it is replaced by the first clamped candidate as soon as one
//! iteration runs.

use std::borrow::Cow;

use nb_types::{Bounds, InputError, NbResult, ObservationSet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::surrogate::NearestNeighborSurrogate;

/// Added to the standard deviation so identical values standardize to zero.
pub const STD_EPSILON: f64 = 1e-9;

/// Search parameters for a single proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposerConfig {
    /// Perturbation scale applied to each uniform draw.
    pub eps: f64,
    /// Number of hill-climb iterations.
    pub num_iterations: usize,
}

impl Default for ProposerConfig {
    fn default() -> Self {
        Self {
            eps: 0.1,
            num_iterations: 1000,
        }
    }
}

impl ProposerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.num_iterations = n;
        self
    }

    pub fn validate(&self) -> NbResult<()> {
        if !self.eps.is_finite() {
            return Err(InputError::NonFiniteStep { eps: self.eps }.into());
        }
        Ok(())
    }
}

/// Outcome of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub point: Vec<f64>,
    /// Acquisition score of `point`; negative infinity if no iteration ran.
    pub score: f64,
}

/// Rescale to zero mean and unit (population) variance.
pub fn standardize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let scale = STD_EPSILON + variance.sqrt();
    values.iter().map(|v| (v - mean) / scale).collect()
}

/// Propose the next point to evaluate.
///
/// `bounds` defaults to the unit box in the observations' dimensionality. All
/// input validation happens before the generator is touched.
pub fn propose<R: Rng + ?Sized>(
    observations: &ObservationSet,
    bounds: Option<&Bounds>,
    config: &ProposerConfig,
    rng: &mut R,
) -> NbResult<Vec<f64>> {
    search(observations, bounds, config, rng).map(|proposal| proposal.point)
}

/// [`propose`] using the thread-local, OS-seeded generator.
pub fn propose_with_thread_rng(
    observations: &ObservationSet,
    bounds: Option<&Bounds>,
    config: &ProposerConfig,
) -> NbResult<Vec<f64>> {
    propose(observations, bounds, config, &mut rand::rng())
}

/// Like [`propose`], but also reports the winning acquisition score.
pub fn search<R: Rng + ?Sized>(
    observations: &ObservationSet,
    bounds: Option<&Bounds>,
    config: &ProposerConfig,
    rng: &mut R,
) -> NbResult<Proposal> {
    config.validate()?;

    let standardized = standardize(observations.values());
    let surrogate = NearestNeighborSurrogate::new(observations.points(), &standardized)?;
    let num_dim = surrogate.num_dim();

    let bounds = match bounds {
        Some(b) => {
            b.check_dim(num_dim)?;
            Cow::Borrowed(b)
        }
        None => Cow::Owned(Bounds::unit(num_dim)),
    };

    debug!(
        "Searching {} dims over {} observations ({} iterations, eps {})",
        num_dim,
        observations.len(),
        config.num_iterations,
        config.eps
    );

    let mut best_point: Vec<f64> = (0..num_dim).map(|_| rng.random::<f64>()).collect();
    let mut best_score = f64::NEG_INFINITY;
    let mut candidate = vec![0.0; num_dim];

    for iteration in 0..config.num_iterations {
        for (dim, slot) in candidate.iter_mut().enumerate() {
            let step = config.eps * rng.random::<f64>();
            *slot = bounds.clamp(dim, best_point[dim] + step);
        }

        let score = surrogate.predict(&candidate)?.score()?;
        if score > best_score {
            trace!("Iteration {}: score {} -> {}", iteration, best_score, score);
            best_score = score;
            best_point.copy_from_slice(&candidate);
        }
    }

    debug!("Proposed {:?} with acquisition score {}", best_point, best_score);

    Ok(Proposal {
        point: best_point,
        score: best_score,
    })
}
