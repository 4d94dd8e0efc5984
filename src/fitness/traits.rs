//! Fitness values
//!
//! This module defines the fitness value attached to evaluated individuals: either a
//! scalar or a Pareto vector of objectives with a shared optimization direction.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// Multi-objective fitness value
///
/// All objectives share one optimization direction. Ordering between two Pareto values
/// is dominance: non-dominated pairs are incomparable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pareto {
    /// Objective values
    pub values: Vec<f64>,
    /// Whether larger objective values are better
    pub maximize: bool,
}

impl Pareto {
    /// Create a Pareto value with an explicit direction
    pub fn new(values: Vec<f64>, maximize: bool) -> Self {
        Self { values, maximize }
    }

    /// Create a Pareto value whose objectives are maximized
    pub fn maximizing(values: Vec<f64>) -> Self {
        Self::new(values, true)
    }

    /// Create a Pareto value whose objectives are minimized
    pub fn minimizing(values: Vec<f64>) -> Self {
        Self::new(values, false)
    }

    /// Number of objectives
    pub fn num_objectives(&self) -> usize {
        self.values.len()
    }

    /// Dominance comparison
    ///
    /// Returns `Greater` if `self` dominates `other`, `Less` if it is dominated, `Equal`
    /// for coordinate-wise equal values and `None` for mutually non-dominated values.
    /// Values of different arity or direction cannot be ordered.
    pub fn compare(&self, other: &Self) -> EvoResult<Option<Ordering>> {
        if self.values.len() != other.values.len() {
            return Err(EvolutionError::invalid_usage(format!(
                "cannot compare Pareto values with {} and {} objectives",
                self.values.len(),
                other.values.len()
            )));
        }
        if self.maximize != other.maximize {
            return Err(EvolutionError::invalid_usage(
                "cannot compare Pareto values with different directions",
            ));
        }

        let mut better = false;
        let mut worse = false;
        for (a, b) in self.values.iter().zip(&other.values) {
            let (a, b) = if self.maximize { (a, b) } else { (b, a) };
            if a > b {
                better = true;
            } else if a < b {
                worse = true;
            }
        }

        Ok(match (better, worse) {
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (false, false) => Some(Ordering::Equal),
            (true, true) => None,
        })
    }

    /// Check if this value dominates another
    pub fn dominates(&self, other: &Self) -> EvoResult<bool> {
        Ok(self.compare(other)? == Some(Ordering::Greater))
    }
}

impl PartialOrd for Pareto {
    /// Dominance ordering; `None` also covers values that cannot be compared at all
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok().flatten()
    }
}

/// Fitness of an evaluated candidate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Fitness {
    /// Single real objective
    Scalar(f64),
    /// Vector of objectives ordered by dominance
    Pareto(Pareto),
}

impl Fitness {
    /// Scalar value, if this is a scalar fitness
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Fitness::Scalar(value) => Some(*value),
            Fitness::Pareto(_) => None,
        }
    }

    /// Pareto value, if this is a multi-objective fitness
    pub fn pareto(&self) -> Option<&Pareto> {
        match self {
            Fitness::Scalar(_) => None,
            Fitness::Pareto(pareto) => Some(pareto),
        }
    }

    /// Check if this is a multi-objective fitness
    pub fn is_pareto(&self) -> bool {
        matches!(self, Fitness::Pareto(_))
    }

    /// Objective values (a scalar is a single objective)
    pub fn objectives(&self) -> &[f64] {
        match self {
            Fitness::Scalar(value) => std::slice::from_ref(value),
            Fitness::Pareto(pareto) => &pareto.values,
        }
    }

    /// Compare two fitness values, `Greater` meaning `self` is better
    ///
    /// Scalars follow arithmetic order, reversed when minimizing. Pareto values are
    /// compared by dominance in their own direction. Mixing the two kinds is an error.
    pub fn compare(&self, other: &Self, maximize: bool) -> EvoResult<Option<Ordering>> {
        match (self, other) {
            (Fitness::Scalar(a), Fitness::Scalar(b)) => {
                let ord = a.partial_cmp(b);
                Ok(if maximize { ord } else { ord.map(Ordering::reverse) })
            }
            (Fitness::Pareto(a), Fitness::Pareto(b)) => a.compare(b),
            _ => Err(EvolutionError::invalid_usage(
                "cannot compare scalar and Pareto fitness",
            )),
        }
    }

    /// Check if this fitness is strictly better than another
    pub fn is_better_than(&self, other: &Self, maximize: bool) -> EvoResult<bool> {
        Ok(self.compare(other, maximize)? == Some(Ordering::Greater))
    }
}

impl From<f64> for Fitness {
    fn from(value: f64) -> Self {
        Fitness::Scalar(value)
    }
}

impl From<Pareto> for Fitness {
    fn from(value: Pareto) -> Self {
        Fitness::Pareto(value)
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fitness::Scalar(value) => write!(f, "{}", value),
            Fitness::Pareto(pareto) => {
                write!(f, "[")?;
                for (i, value) in pareto.values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}
