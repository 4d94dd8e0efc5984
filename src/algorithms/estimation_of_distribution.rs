//! Estimation of distribution preset

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::candidate::Candidate;
use crate::operators::estimation::EstimationOfDistribution;
use crate::operators::replacement::TruncationReplacer;
use crate::operators::selection::TruncationSelector;
use crate::termination::EvaluationTermination;

/// Estimation of distribution algorithm: the `num_selected` best members fit a
/// Gaussian model that yields `num_offspring` candidates, truncation replacement,
/// stopping after `max_evaluations`.
pub fn estimation_of_distribution<C: Candidate, R: RngCore>(rng: R) -> EngineBuilder<C, R> {
    EngineBuilder::new(rng)
        .selector(TruncationSelector)
        .variator(EstimationOfDistribution)
        .replacer(TruncationReplacer)
        .terminator(EvaluationTermination)
}
