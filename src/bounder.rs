//! Bounders for numeric candidates
//!
//! A bounder clamps each coordinate of a numeric candidate to a closed interval.
//! Bounders are consulted by numeric variators after they produce new coordinates.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::{EvoResult, EvolutionError};

/// Closed interval for a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound (inclusive)
    pub lower: f64,
    /// Upper bound (inclusive)
    pub upper: f64,
}

impl Interval {
    /// Create a new interval
    ///
    /// # Panics
    /// Panics if lower > upper
    pub fn new(lower: f64, upper: f64) -> Self {
        assert!(
            lower <= upper,
            "Invalid interval: lower ({}) must be <= upper ({})",
            lower,
            upper
        );
        Self { lower, upper }
    }

    /// Create a symmetric interval centered at 0
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Width of the interval (upper - lower)
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if a value lies within the interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clamp a value into the interval
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

impl From<(f64, f64)> for Interval {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self::new(lower, upper)
    }
}

/// Per-dimension clamp to closed intervals
///
/// A bounder either declares one interval per dimension, or a single interval that is
/// broadcast to every dimension of any candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounder {
    intervals: Vec<Interval>,
    broadcast: bool,
}

impl Bounder {
    /// Create a bounder with one interval per dimension
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self {
            intervals,
            broadcast: false,
        }
    }

    /// Create a bounder that applies the same interval to every dimension
    pub fn uniform(lower: f64, upper: f64) -> Self {
        Self {
            intervals: vec![Interval::new(lower, upper)],
            broadcast: true,
        }
    }

    /// Create a bounder from parallel lower and upper bound vectors
    ///
    /// # Panics
    /// Panics if the vectors differ in length
    pub fn from_bounds(lower: &[f64], upper: &[f64]) -> Self {
        assert_eq!(
            lower.len(),
            upper.len(),
            "Lower and upper bounds must have the same length"
        );
        lower
            .iter()
            .zip(upper)
            .map(|(&lo, &hi)| Interval::new(lo, hi))
            .collect()
    }

    /// Declared number of dimensions (`None` for a broadcast bounder)
    pub fn width(&self) -> Option<usize> {
        if self.broadcast {
            None
        } else {
            Some(self.intervals.len())
        }
    }

    /// Interval for dimension `index`
    pub fn interval(&self, index: usize) -> EvoResult<Interval> {
        if self.broadcast {
            return Ok(self.intervals[0]);
        }
        self.intervals
            .get(index)
            .copied()
            .ok_or(EvolutionError::BoundsMismatch {
                index,
                width: self.intervals.len(),
            })
    }

    /// Lower bound for dimension `index`
    pub fn lower(&self, index: usize) -> EvoResult<f64> {
        self.interval(index).map(|i| i.lower)
    }

    /// Upper bound for dimension `index`
    pub fn upper(&self, index: usize) -> EvoResult<f64> {
        self.interval(index).map(|i| i.upper)
    }

    /// Clamp a single coordinate
    pub fn clamp(&self, index: usize, value: f64) -> EvoResult<f64> {
        self.interval(index).map(|i| i.clamp(value))
    }

    /// Clamp every coordinate of a numeric slice in place
    pub fn bound(&self, values: &mut [f64]) -> EvoResult<()> {
        if let Some(width) = self.width() {
            if values.len() > width {
                return Err(EvolutionError::BoundsMismatch {
                    index: width,
                    width,
                });
            }
        }
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.clamp(i, *value)?;
        }
        Ok(())
    }

    /// Clamp a candidate in place; non-numeric candidates are left untouched
    pub fn bound_candidate<C: Candidate>(&self, candidate: &mut C) -> EvoResult<()> {
        match candidate.as_reals_mut() {
            Some(values) => self.bound(values),
            None => Ok(()),
        }
    }

    /// Check whether every coordinate lies within its interval
    pub fn contains(&self, values: &[f64]) -> bool {
        values
            .iter()
            .enumerate()
            .all(|(i, &v)| self.interval(i).map_or(false, |b| b.contains(v)))
    }
}

impl FromIterator<Interval> for Bounder {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromIterator<(f64, f64)> for Bounder {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Interval::from).collect())
    }
}
