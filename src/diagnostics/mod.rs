//! Diagnostics and statistics
//!
//! This module provides per-generation statistics and the observers that report them.

pub mod observers;

use serde::{Deserialize, Serialize};

use crate::population::population::Population;

/// Statistics for a single generation
///
/// Computed from scalar fitness values. Pareto or empty populations yield NaN
/// statistics. Field order matches the columns of the statistics file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Number of individuals
    pub pop_size: usize,
    /// Worst fitness
    pub worst: f64,
    /// Best fitness
    pub best: f64,
    /// Median fitness
    pub median: f64,
    /// Mean fitness
    pub average: f64,
    /// Sample standard deviation of the fitness
    pub stdev: f64,
}

impl GenerationStats {
    /// Compute statistics from a best-first population
    pub fn from_population<C>(population: &Population<C>, generation: usize) -> Self {
        let pop_size = population.len();
        let values = match population.scalar_fitness() {
            Ok(values) if !values.is_empty() => values,
            _ => {
                return Self {
                    generation,
                    pop_size,
                    worst: f64::NAN,
                    best: f64::NAN,
                    median: f64::NAN,
                    average: f64::NAN,
                    stdev: f64::NAN,
                }
            }
        };

        let best = values[0];
        let worst = values[values.len() - 1];

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let average = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|f| (f - average).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        Self {
            generation,
            pop_size,
            worst,
            best,
            median,
            average,
            stdev: variance.sqrt(),
        }
    }
}

pub mod prelude {
    pub use super::observers::{
        DefaultObserver, FileObserver, IndividualRecord, LoggingObserver, Observer,
    };
    pub use super::GenerationStats;
}
