//! Individual wrapper type
//!
//! This module provides the Individual type that pairs a candidate with its fitness
//! and birth order.

use std::cmp::Ordering;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;

/// An individual in the population
///
/// Wraps a candidate with its fitness (assigned once by the evaluator) and a run-wide
/// birth index used as a deterministic tie-breaker.
#[derive(Clone, Debug, PartialEq)]
pub struct Individual<C> {
    /// The candidate solution
    pub candidate: C,
    /// The fitness value (None if not yet evaluated)
    pub fitness: Option<Fitness>,
    /// Order in which the engine created this individual
    pub birth_index: usize,
    /// Optimization direction of the run this individual belongs to
    pub maximize: bool,
}

impl<C> Individual<C> {
    /// Create a new unevaluated individual
    pub fn new(candidate: C, birth_index: usize, maximize: bool) -> Self {
        Self {
            candidate,
            fitness: None,
            birth_index,
            maximize,
        }
    }

    /// Create a new individual with a known fitness
    pub fn with_fitness(candidate: C, fitness: Fitness, birth_index: usize, maximize: bool) -> Self {
        Self {
            candidate,
            fitness: Some(fitness),
            birth_index,
            maximize,
        }
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Get the fitness value
    pub fn fitness(&self) -> EvoResult<&Fitness> {
        self.fitness
            .as_ref()
            .ok_or(EvolutionError::UnevaluatedIndividual)
    }

    /// Get the scalar fitness value
    pub fn scalar_fitness(&self) -> EvoResult<f64> {
        self.fitness()?.scalar().ok_or_else(|| {
            EvolutionError::invalid_usage("operator requires scalar fitness")
        })
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = Some(fitness);
    }

    /// Forget the fitness, e.g. after the candidate was replaced
    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    /// Get a reference to the candidate
    pub fn candidate(&self) -> &C {
        &self.candidate
    }

    /// Take the candidate out of this individual
    pub fn into_candidate(self) -> C {
        self.candidate
    }

    /// Compare by fitness, `Greater` meaning `self` is better
    pub fn compare(&self, other: &Self) -> EvoResult<Option<Ordering>> {
        self.fitness()?.compare(other.fitness()?, self.maximize)
    }

    /// Check if this individual is strictly better than another
    ///
    /// For Pareto fitness this is dominance.
    pub fn is_better_than(&self, other: &Self) -> EvoResult<bool> {
        Ok(self.compare(other)? == Some(Ordering::Greater))
    }

    /// Alias of [`Individual::is_better_than`] that reads naturally for Pareto fitness
    pub fn dominates(&self, other: &Self) -> EvoResult<bool> {
        self.is_better_than(other)
    }
}

impl<C: PartialEq> PartialOrd for Individual<C> {
    /// Fitness order; unevaluated individuals and incomparable fitnesses yield `None`
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::Pareto;

    #[test]
    fn test_individual_new() {
        let individual = Individual::new(vec![1.0, 2.0, 3.0], 7, true);

        assert!(!individual.is_evaluated());
        assert_eq!(individual.birth_index, 7);
        assert!(matches!(
            individual.fitness(),
            Err(EvolutionError::UnevaluatedIndividual)
        ));
    }

    #[test]
    fn test_individual_set_and_clear_fitness() {
        let mut individual = Individual::new(vec![1.0], 0, true);
        individual.set_fitness(Fitness::Scalar(100.0));
        assert_eq!(individual.scalar_fitness().unwrap(), 100.0);

        individual.clear_fitness();
        assert!(!individual.is_evaluated());
    }

    #[test]
    fn test_individual_is_better_than() {
        let a = Individual::with_fitness(vec![1.0], Fitness::Scalar(100.0), 0, true);
        let b = Individual::with_fitness(vec![2.0], Fitness::Scalar(50.0), 1, true);

        assert!(a.is_better_than(&b).unwrap());
        assert!(!b.is_better_than(&a).unwrap());
        assert!(a > b);
    }

    #[test]
    fn test_individual_minimizing() {
        let a = Individual::with_fitness(vec![1.0], Fitness::Scalar(1.0), 0, false);
        let b = Individual::with_fitness(vec![2.0], Fitness::Scalar(5.0), 1, false);

        assert!(a.is_better_than(&b).unwrap());
    }

    #[test]
    fn test_unevaluated_comparison_fails() {
        let a = Individual::with_fitness(vec![1.0], Fitness::Scalar(1.0), 0, true);
        let b = Individual::new(vec![2.0], 1, true);

        assert!(matches!(
            a.compare(&b),
            Err(EvolutionError::UnevaluatedIndividual)
        ));
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn test_pareto_individuals() {
        let a = Individual::with_fitness(
            vec![0.0],
            Pareto::minimizing(vec![1.0, 1.0]).into(),
            0,
            false,
        );
        let b = Individual::with_fitness(
            vec![1.0],
            Pareto::minimizing(vec![2.0, 2.0]).into(),
            1,
            false,
        );

        assert!(a.dominates(&b).unwrap());
        assert!(a.scalar_fitness().is_err());
    }
}
