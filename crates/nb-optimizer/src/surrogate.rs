//! One-nearest-neighbor surrogate model.
//!
//! The expected value at a query point is the (standardized) value of the
//! closest observed point; the uncertainty is the square root of the Euclidean
//! distance to it, so it is exactly zero at an observed point and grows
//! sublinearly away from the data.

use nb_types::{InputError, NbResult};
use serde::{Deserialize, Serialize};

/// Surrogate estimate at one query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Value of the nearest observed point.
    pub expected: f64,
    /// `sqrt(distance)` to the nearest observed point.
    pub uncertainty: f64,
}

/// Nearest-neighbor lookup over borrowed observations.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighborSurrogate<'a> {
    points: &'a [Vec<f64>],
    values: &'a [f64],
    num_dim: usize,
}

impl<'a> NearestNeighborSurrogate<'a> {
    /// Validate the observations once so that `predict` only has to check the
    /// query shape.
    pub fn new(points: &'a [Vec<f64>], values: &'a [f64]) -> NbResult<Self> {
        let first = points.first().ok_or(InputError::EmptyObservations)?;
        if points.len() != values.len() {
            return Err(InputError::LengthMismatch {
                points: points.len(),
                values: values.len(),
            }
            .into());
        }
        let num_dim = first.len();
        if let Some(bad) = points.iter().find(|p| p.len() != num_dim) {
            return Err(InputError::DimensionMismatch {
                context: "observed point",
                expected: num_dim,
                actual: bad.len(),
            }
            .into());
        }

        Ok(Self {
            points,
            values,
            num_dim,
        })
    }

    pub fn num_dim(&self) -> usize {
        self.num_dim
    }

    /// Estimate at a single query point. Ties go to the earliest observation.
    pub fn predict(&self, query: &[f64]) -> NbResult<Prediction> {
        if query.len() != self.num_dim {
            return Err(InputError::DimensionMismatch {
                context: "query point",
                expected: self.num_dim,
                actual: query.len(),
            }
            .into());
        }

        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;
        for (i, point) in self.points.iter().enumerate() {
            let distance = euclidean(point, query);
            if distance < nearest_distance {
                nearest = i;
                nearest_distance = distance;
            }
        }

        Ok(Prediction {
            expected: self.values[nearest],
            uncertainty: nearest_distance.sqrt(),
        })
    }

    /// Estimate at each query point, failing on the first malformed one.
    pub fn predict_many(&self, queries: &[Vec<f64>]) -> NbResult<Vec<Prediction>> {
        queries.iter().map(|q| self.predict(q)).collect()
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
