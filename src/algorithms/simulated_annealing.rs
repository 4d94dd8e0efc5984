//! Simulated annealing preset

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::candidate::Candidate;
use crate::operators::mutation::GaussianMutation;
use crate::operators::replacement::SimulatedAnnealingReplacer;
use crate::operators::selection::DefaultSelector;
use crate::termination::EvaluationTermination;

/// Simulated annealing: each member is mutated and the mutant accepted by the
/// annealing rule, cooling from `temperature` over `max_evaluations`.
pub fn simulated_annealing<C: Candidate, R: RngCore>(rng: R) -> EngineBuilder<C, R> {
    EngineBuilder::new(rng)
        .selector(DefaultSelector)
        .variator(GaussianMutation)
        .replacer(SimulatedAnnealingReplacer)
        .terminator(EvaluationTermination)
}
