//! Population type
//!
//! This module provides the Population container and the best-first ranking shared by
//! the engine and the built-in operators.

use std::cmp::Ordering;

use crate::candidate::{euclidean, Candidate};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;
use crate::population::individual::Individual;

/// Indices of `individuals` in best-first order
///
/// Scalar fitness is ordered by value (descending when maximizing), Pareto fitness by
/// the number of other individuals that dominate it. Ties are broken by birth index,
/// earlier first, so the order is total and deterministic.
pub fn rank_order<C>(individuals: &[Individual<C>]) -> EvoResult<Vec<usize>> {
    let fitness = individuals
        .iter()
        .map(|i| i.fitness())
        .collect::<EvoResult<Vec<&Fitness>>>()?;
    let mut order: Vec<usize> = (0..individuals.len()).collect();

    let pareto = fitness.iter().filter(|f| f.is_pareto()).count();
    if pareto == 0 {
        let maximize = individuals.first().map_or(true, |i| i.maximize);
        let values: Vec<f64> = fitness.iter().filter_map(|f| f.scalar()).collect();
        order.sort_by(|&a, &b| {
            let by_value = if maximize {
                values[b].total_cmp(&values[a])
            } else {
                values[a].total_cmp(&values[b])
            };
            by_value.then(individuals[a].birth_index.cmp(&individuals[b].birth_index))
        });
    } else if pareto == fitness.len() {
        let counts = domination_counts(individuals)?;
        order.sort_by_key(|&i| (counts[i], individuals[i].birth_index));
    } else {
        return Err(EvolutionError::invalid_usage(
            "population mixes scalar and Pareto fitness",
        ));
    }

    Ok(order)
}

/// For each individual, the number of others that dominate it
pub fn domination_counts<C>(individuals: &[Individual<C>]) -> EvoResult<Vec<usize>> {
    let mut counts = vec![0; individuals.len()];
    for (i, a) in individuals.iter().enumerate() {
        for (j, b) in individuals.iter().enumerate().skip(i + 1) {
            match a.compare(b)? {
                Some(Ordering::Greater) => counts[j] += 1,
                Some(Ordering::Less) => counts[i] += 1,
                _ => {}
            }
        }
    }
    Ok(counts)
}

/// Sort individuals best-first in place
pub fn sort_best_first<C>(individuals: &mut Vec<Individual<C>>) -> EvoResult<()> {
    let order = rank_order(individuals)?;
    let mut slots: Vec<Option<Individual<C>>> = individuals.drain(..).map(Some).collect();
    individuals.extend(order.into_iter().filter_map(|i| slots[i].take()));
    Ok(())
}

/// Clones of the `n` best individuals, best first
pub fn best_n<C: Clone>(individuals: &[Individual<C>], n: usize) -> EvoResult<Vec<Individual<C>>> {
    Ok(rank_order(individuals)?
        .into_iter()
        .take(n)
        .map(|i| individuals[i].clone())
        .collect())
}

/// A population of individuals, kept best-first by the engine
#[derive(Clone, Debug, PartialEq)]
pub struct Population<C> {
    /// The individuals in this population
    individuals: Vec<Individual<C>>,
}

impl<C> Population<C> {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
        }
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual<C>>) -> Self {
        Self { individuals }
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual<C>> {
        self.individuals.get(index)
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual<C>> {
        self.individuals.iter()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual<C>] {
        &self.individuals
    }

    /// Take the individuals out of this population
    pub fn into_individuals(self) -> Vec<Individual<C>> {
        self.individuals
    }

    /// Best individual (the first one of a sorted population)
    pub fn best(&self) -> Option<&Individual<C>> {
        self.individuals.first()
    }

    /// Worst individual (the last one of a sorted population)
    pub fn worst(&self) -> Option<&Individual<C>> {
        self.individuals.last()
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Sort the population best-first
    pub fn sort_best_first(&mut self) -> EvoResult<()> {
        sort_best_first(&mut self.individuals)
    }

    /// Check if the population is in best-first order
    pub fn is_sorted_best_first(&self) -> EvoResult<bool> {
        Ok(rank_order(&self.individuals)?
            .into_iter()
            .enumerate()
            .all(|(position, index)| position == index))
    }

    /// Scalar fitness values in population order
    pub fn scalar_fitness(&self) -> EvoResult<Vec<f64>> {
        self.individuals.iter().map(|i| i.scalar_fitness()).collect()
    }
}

impl<C: Clone> Population<C> {
    /// Copies of all candidates in population order
    pub fn candidates(&self) -> Vec<C> {
        self.individuals.iter().map(|i| i.candidate.clone()).collect()
    }
}

impl<C: Candidate> Population<C> {
    /// Maximum pairwise Euclidean distance between numeric candidates
    ///
    /// Returns `None` if any candidate has no numeric view.
    pub fn max_pairwise_distance(&self) -> Option<f64> {
        let reals = self
            .individuals
            .iter()
            .map(|i| i.candidate.as_reals())
            .collect::<Option<Vec<&[f64]>>>()?;

        let mut max = 0.0_f64;
        for (i, a) in reals.iter().enumerate() {
            for b in &reals[i + 1..] {
                max = max.max(euclidean(a, b));
            }
        }
        Some(max)
    }
}

impl<C> Default for Population<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::ops::Index<usize> for Population<C> {
    type Output = Individual<C>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl<C> IntoIterator for Population<C> {
    type Item = Individual<C>;
    type IntoIter = std::vec::IntoIter<Individual<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

impl<C> FromIterator<Individual<C>> for Population<C> {
    fn from_iter<I: IntoIterator<Item = Individual<C>>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}
