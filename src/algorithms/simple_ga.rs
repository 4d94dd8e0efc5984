//! Genetic algorithm preset
//!
//! A generational genetic algorithm over bit strings.

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::operators::crossover::NPointCrossover;
use crate::operators::mutation::BitFlipMutation;
use crate::operators::replacement::GenerationalReplacer;
use crate::operators::selection::RankSelector;
use crate::termination::EvaluationTermination;

/// Genetic algorithm: rank selection, n-point crossover then bit-flip mutation,
/// generational replacement (elitism through `num_elites`), stopping after
/// `max_evaluations`.
pub fn genetic_algorithm<R: RngCore>(rng: R) -> EngineBuilder<Vec<bool>, R> {
    EngineBuilder::new(rng)
        .selector(RankSelector)
        .variator(NPointCrossover)
        .variator(BitFlipMutation)
        .replacer(GenerationalReplacer)
        .terminator(EvaluationTermination)
}
