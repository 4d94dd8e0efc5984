//! PAES preset
//!
//! Pareto archived evolution strategy (Knowles & Corne, 1999): a (1 + 1) strategy
//! whose acceptance rule consults a bounded, grid-diversified archive.

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::candidate::Candidate;
use crate::operators::archive::AdaptiveGridArchiver;
use crate::operators::mutation::GaussianMutation;
use crate::operators::replacement::PaesReplacer;
use crate::operators::selection::DefaultSelector;
use crate::termination::EvaluationTermination;

/// PAES: each member is mutated, PAES replacement against the adaptive-grid archive
/// (`max_archive_size`, `num_grid_divisions`), stopping after `max_evaluations`.
pub fn paes<C: Candidate, R: RngCore>(rng: R) -> EngineBuilder<C, R> {
    EngineBuilder::new(rng)
        .selector(DefaultSelector)
        .variator(GaussianMutation)
        .replacer(PaesReplacer)
        .archiver(AdaptiveGridArchiver::new())
        .terminator(EvaluationTermination)
}
