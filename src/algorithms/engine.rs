//! Evolution engine
//!
//! The engine drives the generational loop. Each generation runs, in order:
//! selection, the variator pipeline, evaluation of the offspring, replacement,
//! migration, archiving, observers and finally the terminators. Every stochastic
//! decision draws from the single random source handed to the engine, so a fixed seed
//! and a deterministic evaluator reproduce a run exactly.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use crate::candidate::{Candidate, Generator};
use crate::diagnostics::observers::Observer;
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::evaluator::Evaluator;
use crate::fitness::traits::Fitness;
use crate::operators::archive::DefaultArchiver;
use crate::operators::migration::DefaultMigrator;
use crate::operators::replacement::DefaultReplacer;
use crate::operators::selection::DefaultSelector;
use crate::operators::traits::{
    Archiver, Migrator, ReplaceContext, Replacer, Selector, VariationContext, Variator,
};
use crate::options::Options;
use crate::population::individual::Individual;
use crate::population::population::{sort_best_first, Population};
use crate::termination::{DefaultTerminator, EvolutionState, Terminator};

/// Builder for [`Engine`]
///
/// Every role starts with its default variant: the whole population is selected, the
/// variator pipeline is empty (offspring are copies of the parents), offspring replace
/// the population, migration is the identity, the archive mirrors the population and
/// the run stops after initialization.
pub struct EngineBuilder<C, R = StdRng> {
    rng: R,
    selector: Box<dyn Selector<C>>,
    variators: Vec<Box<dyn Variator<C>>>,
    replacer: Box<dyn Replacer<C>>,
    migrator: Box<dyn Migrator<C>>,
    archiver: Box<dyn Archiver<C>>,
    terminators: Vec<Box<dyn Terminator<C>>>,
    observers: Vec<Box<dyn Observer<C>>>,
}

impl<C: Candidate> EngineBuilder<C, StdRng> {
    /// Create a builder whose random source is seeded with `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<C: Candidate, R: RngCore> EngineBuilder<C, R> {
    /// Create a builder around a random source
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            selector: Box::new(DefaultSelector),
            variators: Vec::new(),
            replacer: Box::new(DefaultReplacer),
            migrator: Box::new(DefaultMigrator),
            archiver: Box::new(DefaultArchiver),
            terminators: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Set the selector
    pub fn selector(mut self, selector: impl Selector<C> + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Append a variator to the pipeline
    pub fn variator(mut self, variator: impl Variator<C> + 'static) -> Self {
        self.variators.push(Box::new(variator));
        self
    }

    /// Set the replacer
    pub fn replacer(mut self, replacer: impl Replacer<C> + 'static) -> Self {
        self.replacer = Box::new(replacer);
        self
    }

    /// Set the migrator
    pub fn migrator(mut self, migrator: impl Migrator<C> + 'static) -> Self {
        self.migrator = Box::new(migrator);
        self
    }

    /// Set the archiver
    pub fn archiver(mut self, archiver: impl Archiver<C> + 'static) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    /// Add a terminator; the run stops when any terminator fires
    pub fn terminator(mut self, terminator: impl Terminator<C> + 'static) -> Self {
        self.terminators.push(Box::new(terminator));
        self
    }

    /// Add an observer; observers run in the order they were added
    pub fn observer(mut self, observer: impl Observer<C> + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Build the engine
    pub fn build(self) -> Engine<C, R> {
        let mut terminators = self.terminators;
        if terminators.is_empty() {
            terminators.push(Box::new(DefaultTerminator));
        }

        Engine {
            rng: self.rng,
            selector: self.selector,
            variators: self.variators,
            replacer: self.replacer,
            migrator: self.migrator,
            archiver: self.archiver,
            terminators,
            observers: self.observers,
            options: Options::default(),
            population: Population::new(),
            archive: Vec::new(),
            num_generations: 0,
            num_evaluations: 0,
            next_birth_index: 0,
            termination_reason: None,
        }
    }
}

/// Evolution engine
///
/// Holds the operators and the random source, and after a run the final population,
/// archive and counters. If a run fails, the accessors show the last fully formed
/// generation.
pub struct Engine<C, R = StdRng> {
    rng: R,
    selector: Box<dyn Selector<C>>,
    variators: Vec<Box<dyn Variator<C>>>,
    replacer: Box<dyn Replacer<C>>,
    migrator: Box<dyn Migrator<C>>,
    archiver: Box<dyn Archiver<C>>,
    terminators: Vec<Box<dyn Terminator<C>>>,
    observers: Vec<Box<dyn Observer<C>>>,
    options: Options,
    population: Population<C>,
    archive: Vec<Individual<C>>,
    num_generations: usize,
    num_evaluations: usize,
    next_birth_index: usize,
    termination_reason: Option<&'static str>,
}

impl<C: Candidate, R: RngCore> Engine<C, R> {
    /// Create a builder for an engine
    pub fn builder(rng: R) -> EngineBuilder<C, R> {
        EngineBuilder::new(rng)
    }

    /// Current population, best first
    pub fn population(&self) -> &Population<C> {
        &self.population
    }

    /// Current archive
    pub fn archive(&self) -> &[Individual<C>] {
        &self.archive
    }

    /// Completed generations
    pub fn num_generations(&self) -> usize {
        self.num_generations
    }

    /// Fitness evaluations so far
    pub fn num_evaluations(&self) -> usize {
        self.num_evaluations
    }

    /// Options of the last run, including any adaptation made by the operators
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Why the last run stopped, if it completed
    pub fn termination_reason(&self) -> Option<&'static str> {
        self.termination_reason
    }

    /// Run the evolve loop
    ///
    /// The initial population holds every seed followed by `pop_size - seeds.len()`
    /// generated candidates, evaluated in one batch. The loop then runs generations
    /// until a terminator fires and returns the final population.
    pub fn evolve<G, E>(
        &mut self,
        generator: &G,
        evaluator: &E,
        pop_size: usize,
        seeds: Vec<C>,
        maximize: bool,
        options: Options,
    ) -> EvoResult<Population<C>>
    where
        G: Generator<C> + ?Sized,
        E: Evaluator<C> + ?Sized,
    {
        let start_time = Instant::now();
        self.options = options;
        self.population = Population::new();
        self.archive = Vec::new();
        self.num_generations = 0;
        self.num_evaluations = 0;
        self.next_birth_index = 0;
        self.termination_reason = None;

        let mut candidates = seeds;
        while candidates.len() < pop_size {
            let candidate = generator.generate(&mut self.rng, &self.options)?;
            candidates.push(candidate);
        }
        if candidates.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        info!(pop_size = candidates.len(), maximize, "starting evolution");

        let mut individuals = evaluate_batch(
            evaluator,
            candidates,
            &self.options,
            &mut self.next_birth_index,
            maximize,
        )?;
        sort_best_first(&mut individuals)?;
        self.num_evaluations = individuals.len();
        self.archive = self.archiver.archive(
            &mut self.rng,
            &individuals,
            &self.archive,
            &self.options,
        )?;
        self.population = Population::from_individuals(individuals);
        self.notify_observers(start_time)?;

        loop {
            let fired = {
                let state = self.state(start_time);
                self.terminators
                    .iter()
                    .find(|t| t.should_terminate(&state, &self.options))
                    .map(|t| t.reason())
            };
            if let Some(reason) = fired {
                self.termination_reason = Some(reason);
                break;
            }

            self.step(evaluator, pop_size, maximize)?;
            debug!(
                generation = self.num_generations,
                evaluations = self.num_evaluations,
                best = %self.best_fitness(),
                "generation complete"
            );
            self.notify_observers(start_time)?;
        }

        info!(
            reason = self.termination_reason.unwrap_or_default(),
            generations = self.num_generations,
            evaluations = self.num_evaluations,
            best = %self.best_fitness(),
            "evolution terminated"
        );
        Ok(self.population.clone())
    }

    /// Run one generation and commit it
    fn step<E>(&mut self, evaluator: &E, pop_size: usize, maximize: bool) -> EvoResult<()>
    where
        E: Evaluator<C> + ?Sized,
    {
        let population = self.population.individuals();
        let parents = self
            .selector
            .select(&mut self.rng, population, &self.options)?;

        let parent_fitness = parents
            .iter()
            .map(|p| p.fitness().cloned())
            .collect::<EvoResult<Vec<Fitness>>>()?;
        let context = VariationContext::new(pop_size, maximize)
            .with_counters(self.num_generations, self.num_evaluations);

        let mut candidates: Vec<C> = parents.iter().map(|p| p.candidate.clone()).collect();
        for (k, variator) in self.variators.iter().enumerate() {
            let context = if k == 0 {
                context.with_parent_fitness(&parent_fitness)
            } else {
                context
            };
            candidates = variator.vary(&mut self.rng, &candidates, &context, &self.options)?;
        }

        let offspring = evaluate_batch(
            evaluator,
            candidates,
            &self.options,
            &mut self.next_birth_index,
            maximize,
        )?;
        let mut num_evaluations = self.num_evaluations + offspring.len();

        let replace_context = ReplaceContext::new(maximize)
            .with_archive(&self.archive)
            .with_counters(self.num_generations, num_evaluations);
        let mut survivors = self.replacer.replace(
            &mut self.rng,
            population,
            &parents,
            &offspring,
            &replace_context,
            &mut self.options,
        )?;
        sort_best_first(&mut survivors)?;

        survivors = self
            .migrator
            .migrate(
                &mut self.rng,
                survivors,
                &mut self.next_birth_index,
                &self.options,
            )?;
        let immigrants: Vec<usize> = survivors
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_evaluated())
            .map(|(i, _)| i)
            .collect();
        if !immigrants.is_empty() {
            let candidates: Vec<C> = immigrants
                .iter()
                .map(|&i| survivors[i].candidate.clone())
                .collect();
            let fitness = evaluate_candidates(evaluator, &candidates, &self.options)?;
            for (&i, f) in immigrants.iter().zip(fitness) {
                survivors[i].set_fitness(f);
            }
            num_evaluations += immigrants.len();
        }
        sort_best_first(&mut survivors)?;

        let archive = self
            .archiver
            .archive(&mut self.rng, &survivors, &self.archive, &self.options)?;

        self.population = Population::from_individuals(survivors);
        self.archive = archive;
        self.num_evaluations = num_evaluations;
        self.num_generations += 1;
        Ok(())
    }

    fn state(&self, start_time: Instant) -> EvolutionState<'_, C> {
        EvolutionState {
            population: &self.population,
            archive: &self.archive,
            num_generations: self.num_generations,
            num_evaluations: self.num_evaluations,
            start_time,
        }
    }

    fn notify_observers(&mut self, start_time: Instant) -> EvoResult<()> {
        let state = EvolutionState {
            population: &self.population,
            archive: &self.archive,
            num_generations: self.num_generations,
            num_evaluations: self.num_evaluations,
            start_time,
        };
        for observer in self.observers.iter_mut() {
            observer.observe(&state, &self.options)?;
        }
        Ok(())
    }

    fn best_fitness(&self) -> String {
        self.population
            .best()
            .and_then(|b| b.fitness.as_ref())
            .map(|f| f.to_string())
            .unwrap_or_default()
    }
}

fn evaluate_candidates<C, E>(
    evaluator: &E,
    candidates: &[C],
    options: &Options,
) -> EvoResult<Vec<Fitness>>
where
    E: Evaluator<C> + ?Sized,
{
    let fitness = evaluator.evaluate(candidates, options)?;
    if fitness.len() != candidates.len() {
        return Err(EvolutionError::EvaluatorMismatch {
            expected: candidates.len(),
            actual: fitness.len(),
        });
    }
    Ok(fitness)
}

/// Evaluate candidates and wrap them into individuals with fresh birth indices
fn evaluate_batch<C, E>(
    evaluator: &E,
    candidates: Vec<C>,
    options: &Options,
    next_birth_index: &mut usize,
    maximize: bool,
) -> EvoResult<Vec<Individual<C>>>
where
    E: Evaluator<C> + ?Sized,
{
    let fitness = evaluate_candidates(evaluator, &candidates, options)?;
    Ok(candidates
        .into_iter()
        .zip(fitness)
        .map(|(candidate, fitness)| {
            let birth_index = *next_birth_index;
            *next_birth_index += 1;
            Individual::with_fitness(candidate, fitness, birth_index, maximize)
        })
        .collect())
}
