//! Operator traits
//!
//! This module defines the operator roles of the evolve loop. Every operator receives the
//! run's single random source as `&mut dyn RngCore`, which keeps the traits object-safe so
//! that operators of any kind can be mixed behind `Box<dyn ...>`.

use rand::RngCore;

use crate::error::EvoResult;
use crate::fitness::traits::Fitness;
use crate::options::Options;
use crate::population::individual::Individual;

/// Engine counters visible to variators
///
/// Variators never see individuals. The only fitness information they get is the
/// optional `parent_fitness` hint, which the engine passes to the first variator of the
/// pipeline (parallel to its input candidates).
#[derive(Clone, Copy, Debug)]
pub struct VariationContext<'a> {
    /// Completed generations
    pub num_generations: usize,
    /// Evaluations so far
    pub num_evaluations: usize,
    /// Configured population size
    pub population_size: usize,
    /// Optimization direction of the run
    pub maximize: bool,
    /// Fitness of the input candidates, when known
    pub parent_fitness: Option<&'a [Fitness]>,
}

impl<'a> VariationContext<'a> {
    /// Create a context with no fitness hint
    pub fn new(population_size: usize, maximize: bool) -> Self {
        Self {
            num_generations: 0,
            num_evaluations: 0,
            population_size,
            maximize,
            parent_fitness: None,
        }
    }

    /// Set the completed generation and evaluation counters
    pub fn with_counters(mut self, num_generations: usize, num_evaluations: usize) -> Self {
        self.num_generations = num_generations;
        self.num_evaluations = num_evaluations;
        self
    }

    /// Attach the fitness of the input candidates
    pub fn with_parent_fitness(mut self, fitness: &'a [Fitness]) -> Self {
        self.parent_fitness = Some(fitness);
        self
    }

    /// Same counters without the fitness hint
    pub fn without_parent_fitness(mut self) -> Self {
        self.parent_fitness = None;
        self
    }
}

/// Engine state visible to replacers
#[derive(Debug)]
pub struct ReplaceContext<'a, C> {
    /// Current archive
    pub archive: &'a [Individual<C>],
    /// Completed generations
    pub num_generations: usize,
    /// Evaluations so far, including the offspring being placed
    pub num_evaluations: usize,
    /// Optimization direction of the run
    pub maximize: bool,
}

impl<'a, C> ReplaceContext<'a, C> {
    /// Create a context with an empty archive
    pub fn new(maximize: bool) -> Self {
        Self {
            archive: &[],
            num_generations: 0,
            num_evaluations: 0,
            maximize,
        }
    }

    /// Attach the current archive
    pub fn with_archive(mut self, archive: &'a [Individual<C>]) -> Self {
        self.archive = archive;
        self
    }

    /// Set the completed generation and evaluation counters
    pub fn with_counters(mut self, num_generations: usize, num_evaluations: usize) -> Self {
        self.num_generations = num_generations;
        self.num_evaluations = num_evaluations;
        self
    }
}

/// Selection operator
///
/// Chooses parents from the current (best-first) population. The result may contain
/// duplicates; the input is never modified.
pub trait Selector<C> {
    /// Select parents from the population
    fn select(
        &self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>>;
}

/// Variation operator
///
/// Produces offspring candidates from parent candidates. Input candidates are never
/// modified; every offspring is built from a copy.
pub trait Variator<C> {
    /// Produce new candidates
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>>;
}

/// Replacement operator
///
/// Forms the next population from the current population, the selected parents and the
/// evaluated offspring. Replacers may write adaptive state back into the options.
pub trait Replacer<C> {
    /// Build the next population
    fn replace(
        &mut self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        parents: &[Individual<C>],
        offspring: &[Individual<C>],
        context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>>;
}

/// Archiving operator
///
/// Maintains a secondary set of notable individuals across generations.
pub trait Archiver<C> {
    /// Build the next archive from the population and the current archive
    fn archive(
        &mut self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        archive: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>>;
}

/// Migration hook
///
/// Exchanges individuals with peers. The returned population has the same length as the
/// input; incoming individuals without fitness are evaluated by the engine.
///
/// `next_birth_index` is the receiving run's birth counter. Arriving individuals take
/// their birth index from it so that ties stay ordered within the island.
pub trait Migrator<C> {
    /// Exchange individuals with peers
    fn migrate(
        &mut self,
        rng: &mut dyn RngCore,
        population: Vec<Individual<C>>,
        next_birth_index: &mut usize,
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>>;
}
