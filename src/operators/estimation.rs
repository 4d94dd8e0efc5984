//! Estimation of distribution
//!
//! The estimation-of-distribution variator fits an independent Gaussian per coordinate
//! to its input candidates and samples fresh candidates from that model.

use rand::RngCore;
use rand_distr::{Distribution, Normal};

use crate::candidate::{numeric_view, numeric_view_mut, Candidate};
use crate::error::{EvoResult, EvolutionError};
use crate::operators::traits::{VariationContext, Variator};
use crate::options::Options;

/// Independent Gaussian marginals, one per coordinate
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianModel {
    /// Mean per coordinate
    pub means: Vec<f64>,
    /// Population standard deviation per coordinate
    pub stdevs: Vec<f64>,
}

impl GaussianModel {
    /// Fit the model to a set of real vectors of equal length
    pub fn fit(samples: &[&[f64]]) -> EvoResult<Self> {
        let first = samples.first().ok_or(EvolutionError::EmptyPopulation)?;
        let dimension = first.len();
        if samples.iter().any(|s| s.len() != dimension) {
            return Err(EvolutionError::invalid_usage(
                "estimation of distribution requires candidates of equal length",
            ));
        }

        let n = samples.len() as f64;
        let means: Vec<f64> = (0..dimension)
            .map(|i| samples.iter().map(|s| s[i]).sum::<f64>() / n)
            .collect();
        let stdevs = means
            .iter()
            .enumerate()
            .map(|(i, mean)| {
                let variance = samples.iter().map(|s| (s[i] - mean).powi(2)).sum::<f64>() / n;
                variance.sqrt()
            })
            .collect();

        Ok(Self { means, stdevs })
    }

    /// Number of coordinates
    pub fn dimension(&self) -> usize {
        self.means.len()
    }

    /// Draw one coordinate vector into `values`
    pub fn sample_into(&self, rng: &mut dyn RngCore, values: &mut [f64]) -> EvoResult<()> {
        for ((value, &mean), &stdev) in values.iter_mut().zip(&self.means).zip(&self.stdevs) {
            if !(stdev >= 0.0 && stdev.is_finite()) {
                return Err(EvolutionError::invalid_usage(format!(
                    "degenerate distribution model: stdev {}",
                    stdev
                )));
            }
            let normal = Normal::new(mean, stdev).map_err(|e| {
                EvolutionError::invalid_usage(format!("degenerate distribution model: {}", e))
            })?;
            *value = normal.sample(rng);
        }
        Ok(())
    }
}

/// Estimation-of-distribution variator
///
/// Produces `num_offspring` candidates (default: population size) sampled from a
/// [`GaussianModel`] of the input, clamped with the bounder in the options.
#[derive(Clone, Debug, Default)]
pub struct EstimationOfDistribution;

impl<C: Candidate> Variator<C> for EstimationOfDistribution {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let template = candidates.first().ok_or(EvolutionError::EmptyPopulation)?;
        let samples = candidates
            .iter()
            .map(numeric_view)
            .collect::<EvoResult<Vec<&[f64]>>>()?;
        let model = GaussianModel::fit(&samples)?;

        let count = options.num_offspring.unwrap_or(context.population_size);
        (0..count)
            .map(|_| {
                let mut child = template.clone();
                model.sample_into(rng, numeric_view_mut(&mut child)?)?;
                if let Some(bounder) = &options.bounder {
                    bounder.bound_candidate(&mut child)?;
                }
                Ok(child)
            })
            .collect()
    }
}
