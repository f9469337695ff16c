//! Observation sets and box bounds.
//!
//! Both types enforce their shape invariants on construction (and on
//! deserialization), so downstream code only has to check them against each
//! other.

use serde::{Deserialize, Serialize};

use crate::errors::{InputError, NbError, NbResult};

/// Ordered (point, value) pairs collected by a driver loop.
///
/// Every point shares the same dimensionality and there is exactly one value per
/// point. The set may be empty while a driver is still assembling it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservationSet")]
pub struct ObservationSet {
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawObservationSet {
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl TryFrom<RawObservationSet> for ObservationSet {
    type Error = NbError;

    fn try_from(raw: RawObservationSet) -> NbResult<Self> {
        Self::from_parts(raw.points, raw.values)
    }
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from parallel point/value vectors.
    pub fn from_parts(points: Vec<Vec<f64>>, values: Vec<f64>) -> NbResult<Self> {
        if points.len() != values.len() {
            return Err(InputError::LengthMismatch {
                points: points.len(),
                values: values.len(),
            }
            .into());
        }

        let mut set = Self {
            points: Vec::with_capacity(points.len()),
            values: Vec::with_capacity(values.len()),
        };
        for (point, value) in points.into_iter().zip(values) {
            set.push(point, value)?;
        }
        Ok(set)
    }

    /// Parse a JSON document of the form `{"points": [[..], ..], "values": [..]}`.
    pub fn from_json(json: &str) -> NbResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append one observation. The first point fixes the dimensionality.
    ///
    /// Values and coordinates must be finite: a single NaN would make every
    /// standardized value NaN.
    pub fn push(&mut self, point: Vec<f64>, value: f64) -> NbResult<()> {
        if point.is_empty() {
            return Err(InputError::ZeroDimensions.into());
        }
        if !value.is_finite() || point.iter().any(|x| !x.is_finite()) {
            return Err(InputError::NonFiniteObservation { point, value }.into());
        }
        if let Some(expected) = self.num_dim() {
            if point.len() != expected {
                return Err(InputError::DimensionMismatch {
                    context: "observed point",
                    expected,
                    actual: point.len(),
                }
                .into());
            }
        }
        self.points.push(point);
        self.values.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shared dimensionality, or `None` while the set is empty.
    pub fn num_dim(&self) -> Option<usize> {
        self.points.first().map(Vec::len)
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        self.points
            .iter()
            .map(Vec::as_slice)
            .zip(self.values.iter().copied())
    }

    /// Highest-valued observation; the earliest one wins on ties.
    pub fn best(&self) -> Option<(&[f64], f64)> {
        let mut best: Option<(&[f64], f64)> = None;
        for (point, value) in self.iter() {
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((point, value)),
            }
        }
        best
    }
}

/// Axis-aligned box `[lower, upper]`.
///
/// Only the lengths are validated. `lower[i] <= upper[i]` is the caller's
/// responsibility; [`Bounds::clamp`] still never panics when it is violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

#[derive(Deserialize)]
struct RawBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = NbError;

    fn try_from(raw: RawBounds) -> NbResult<Self> {
        Self::new(raw.lower, raw.upper)
    }
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> NbResult<Self> {
        if lower.len() != upper.len() {
            return Err(InputError::DimensionMismatch {
                context: "upper bound",
                expected: lower.len(),
                actual: upper.len(),
            }
            .into());
        }
        Ok(Self { lower, upper })
    }

    /// The unit box `[0, 1]^num_dim`.
    pub fn unit(num_dim: usize) -> Self {
        Self {
            lower: vec![0.0; num_dim],
            upper: vec![1.0; num_dim],
        }
    }

    pub fn num_dim(&self) -> usize {
        self.lower.len()
    }

    /// Fail unless the box has `expected` dimensions.
    pub fn check_dim(&self, expected: usize) -> NbResult<()> {
        if self.num_dim() != expected {
            return Err(InputError::DimensionMismatch {
                context: "bounds",
                expected,
                actual: self.num_dim(),
            }
            .into());
        }
        Ok(())
    }

    /// `max(lower, min(upper, x))` along dimension `dim`.
    ///
    /// Written out instead of `f64::clamp`, which panics on an inverted box.
    pub fn clamp(&self, dim: usize, x: f64) -> f64 {
        x.min(self.upper[dim]).max(self.lower[dim])
    }

    /// Whether `point` lies inside the box (inclusive).
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.num_dim()
            && point
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(x, (lo, hi))| lo <= x && x <= hi)
    }
}
