//! Evolution strategy preset
//!
//! A (µ + λ) evolution strategy over real vectors. Enable `use_one_fifth_rule` to
//! adapt the mutation rate from the offspring survival ratio.

use rand::RngCore;

use crate::algorithms::engine::EngineBuilder;
use crate::candidate::Candidate;
use crate::operators::mutation::GaussianMutation;
use crate::operators::replacement::PlusReplacer;
use crate::operators::selection::DefaultSelector;
use crate::termination::EvaluationTermination;

/// Evolution strategy: every member is a parent, Gaussian mutation, plus replacement,
/// stopping after `max_evaluations`.
pub fn evolution_strategy<C: Candidate, R: RngCore>(rng: R) -> EngineBuilder<C, R> {
    EngineBuilder::new(rng)
        .selector(DefaultSelector)
        .variator(GaussianMutation)
        .replacer(PlusReplacer)
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
    fn test_evolution_strategy_is_elitist() {
        let sphere = FnEvaluator::new(|x: &Vec<f64>| Fitness::Scalar(x.iter().map(|v| v * v).sum()));
        let generator = UniformReals::uniform(4, -5.0, 5.0);
        let options = Options::default()
            .with_max_evaluations(600)
            .with_mutation_rate(0.5)
            .with_one_fifth_rule(true);

        let mut initial = evolution_strategy(StdRng::seed_from_u64(5)).build();
        let start = initial
            .evolve(&generator, &sphere, 30, vec![], false, options.clone().with_max_evaluations(30))
            .unwrap();

        let mut engine = evolution_strategy(StdRng::seed_from_u64(5)).build();
        let population = engine
            .evolve(&generator, &sphere, 30, vec![], false, options)
            .unwrap();

        let before = start.best().unwrap().scalar_fitness().unwrap();
        let after = population.best().unwrap().scalar_fitness().unwrap();
        assert!(after <= before);
        assert_eq!(population.len(), 30);
        // The one-fifth rule rewrote the rate
        assert_ne!(engine.options().mutation_rate, Some(0.5));
    }
}
