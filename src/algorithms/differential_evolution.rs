//! Differential evolution preset

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::candidate::Candidate;
use crate::operators::crossover::DifferentialCrossover;
use crate::operators::mutation::GaussianMutation;
use crate::operators::replacement::SteadyStateReplacer;
use crate::operators::selection::TournamentSelector;
use crate::termination::EvaluationTermination;

/// Differential evolution: tournament selection, differential crossover then Gaussian
/// mutation, steady-state replacement, stopping after `max_evaluations`.
///
/// Set `num_selected` to the number of offspring per generation.
pub fn differential_evolution<C: Candidate, R: RngCore>(rng: R) -> EngineBuilder<C, R> {
    EngineBuilder::new(rng)
        .selector(TournamentSelector)
        .variator(DifferentialCrossover)
        .variator(GaussianMutation)
        .replacer(SteadyStateReplacer)
        .terminator(EvaluationTermination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::UniformReals;
    use crate::fitness::evaluator::FnEvaluator;
    use crate::fitness::traits::Fitness;
    use crate::options::Options;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_differential_evolution_runs() {
        let sphere = FnEvaluator::new(|x: &Vec<f64>| Fitness::Scalar(x.iter().map(|v| v * v).sum()));
        let options = Options::default()
            .with_num_selected(2)
            .with_max_evaluations(220);

        let mut engine = differential_evolution(StdRng::seed_from_u64(13)).build();
        let population = engine
            .evolve(&UniformReals::uniform(3, -5.0, 5.0), &sphere, 20, vec![], false, options)
            .unwrap();

        assert_eq!(population.len(), 20);
        assert_eq!(engine.num_generations(), 100);
        assert_eq!(engine.num_evaluations(), 220);
    }
}
