//! Termination criteria
//!
//! Terminators decide, after each generation, whether the evolve loop stops. The engine
//! stops as soon as any of its terminators fires.

use std::time::Instant;

use crate::candidate::Candidate;
use crate::options::Options;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Engine state visible to terminators and observers
#[derive(Clone, Copy, Debug)]
pub struct EvolutionState<'a, C> {
    /// Current population, best first
    pub population: &'a Population<C>,
    /// Current archive
    pub archive: &'a [Individual<C>],
    /// Completed generations
    pub num_generations: usize,
    /// Fitness evaluations so far
    pub num_evaluations: usize,
    /// When the run started
    pub start_time: Instant,
}

/// Termination criterion trait
///
/// Implementations must be pure over the state and options.
pub trait Terminator<C> {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState<'_, C>, options: &Options) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminator that always fires
#[derive(Clone, Debug, Default)]
pub struct DefaultTerminator;

impl<C> Terminator<C> for DefaultTerminator {
    fn should_terminate(&self, _state: &EvolutionState<'_, C>, _options: &Options) -> bool {
        true
    }

    fn reason(&self) -> &'static str {
        "Default termination"
    }
}

/// Terminate after `max_evaluations` fitness evaluations (default: the population size)
#[derive(Clone, Debug, Default)]
pub struct EvaluationTermination;

impl<C> Terminator<C> for EvaluationTermination {
    fn should_terminate(&self, state: &EvolutionState<'_, C>, options: &Options) -> bool {
        let max = options.max_evaluations.unwrap_or(state.population.len());
        state.num_evaluations >= max
    }

    fn reason(&self) -> &'static str {
        "Maximum evaluations reached"
    }
}

/// Terminate after `max_generations` generations (default: 1)
#[derive(Clone, Debug, Default)]
pub struct GenerationTermination;

impl<C> Terminator<C> for GenerationTermination {
    fn should_terminate(&self, state: &EvolutionState<'_, C>, options: &Options) -> bool {
        state.num_generations >= options.max_generations.unwrap_or(1)
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate when the best fitness is within `min_fitness_diff` of the average
///
/// Applies to scalar fitness only; never fires on Pareto or empty populations.
#[derive(Clone, Debug, Default)]
pub struct AverageFitnessTermination;

impl<C> Terminator<C> for AverageFitnessTermination {
    fn should_terminate(&self, state: &EvolutionState<'_, C>, options: &Options) -> bool {
        let Ok(values) = state.population.scalar_fitness() else {
            return false;
        };
        let Some(&best) = values.first() else {
            return false;
        };
        let average = values.iter().sum::<f64>() / values.len() as f64;
        (best - average).abs() < options.min_fitness_diff
    }

    fn reason(&self) -> &'static str {
        "Average fitness converged to the best"
    }
}

/// Terminate when the largest pairwise Euclidean distance between candidates drops
/// below `min_diversity`
///
/// Never fires for candidates without a numeric view.
#[derive(Clone, Debug, Default)]
pub struct DiversityTermination;

impl<C: Candidate> Terminator<C> for DiversityTermination {
    fn should_terminate(&self, state: &EvolutionState<'_, C>, options: &Options) -> bool {
        state
            .population
            .max_pairwise_distance()
            .map_or(false, |diversity| diversity < options.min_diversity)
    }

    fn reason(&self) -> &'static str {
        "Diversity threshold reached"
    }
}

/// Terminate once the wall-clock time since the start of the run exceeds `max_time`
///
/// Never fires without `max_time`.
#[derive(Clone, Debug, Default)]
pub struct TimeTermination;

impl<C> Terminator<C> for TimeTermination {
    fn should_terminate(&self, state: &EvolutionState<'_, C>, options: &Options) -> bool {
        options
            .max_time
            .map_or(false, |max_time| state.start_time.elapsed() > max_time)
    }

    fn reason(&self) -> &'static str {
        "Time limit reached"
    }
}

pub mod prelude {
    pub use super::{
        AverageFitnessTermination, DefaultTerminator, DiversityTermination,
        EvaluationTermination, EvolutionState, GenerationTermination, Terminator,
        TimeTermination,
    };
}
