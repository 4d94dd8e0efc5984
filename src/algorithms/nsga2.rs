//! NSGA-II preset
//!
//! Multi-objective evolution with Pareto fitness.
//!
//! Reference: Deb, K., Pratap, A., Agarwal, S., & Meyarivan, T. (2002).
//! A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II.
//! IEEE Transactions on Evolutionary Computation, 6(2).

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::candidate::Candidate;
use crate::operators::archive::BestArchiver;
use crate::operators::crossover::BlendCrossover;
use crate::operators::mutation::GaussianMutation;
use crate::operators::replacement::Nsga2Replacer;
use crate::operators::selection::CrowdedTournamentSelector;
use crate::termination::EvaluationTermination;

/// NSGA-II: crowded-comparison tournament selection, blend crossover then Gaussian mutation,
/// NSGA-II replacement and a Pareto archive, stopping after `max_evaluations`.
pub fn nsga2<C: Candidate, R: RngCore>(rng: R) -> EngineBuilder<C, R> {
    EngineBuilder::new(rng)
        .selector(CrowdedTournamentSelector)
        .variator(BlendCrossover)
        .variator(GaussianMutation)
        .replacer(Nsga2Replacer)
        .archiver(BestArchiver)
        .terminator(EvaluationTermination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounder::Bounder;
    use crate::candidate::UniformReals;
    use crate::fitness::evaluator::FnEvaluator;
    use crate::fitness::traits::{Fitness, Pareto};
    use crate::operators::archive::is_mutually_non_dominated;
    use crate::options::Options;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_nsga2_archive_is_non_dominated() {
        let schaffer = FnEvaluator::new(|x: &Vec<f64>| -> Fitness {
            Pareto::minimizing(vec![x[0] * x[0], (x[0] - 2.0).powi(2)]).into()
        });
        let options = Options::default()
            .with_max_evaluations(500)
            .with_bounder(Bounder::uniform(-4.0, 4.0));

        let mut engine = nsga2(StdRng::seed_from_u64(23)).build();
        let population = engine
            .evolve(&UniformReals::uniform(1, -4.0, 4.0), &schaffer, 25, vec![], false, options)
            .unwrap();

        assert_eq!(population.len(), 25);
        assert!(population.is_sorted_best_first().unwrap());
        assert!(!engine.archive().is_empty());
        assert!(is_mutually_non_dominated(engine.archive()).unwrap());
        // Every archived point lies on the front x in [0, 2]
        assert!(engine
            .archive()
            .iter()
            .all(|a| (-0.5..=2.5).contains(&a.candidate[0])));
    }
}
