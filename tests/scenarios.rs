//! End-to-end scenarios
//!
//! Full evolve runs with seeded random sources.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use evocomp::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn sphere() -> FnEvaluator<impl Fn(&Vec<f64>) -> Fitness> {
    FnEvaluator::new(|x: &Vec<f64>| Fitness::Scalar(x.iter().map(|v| v * v).sum()))
}

fn sphere_engine(seed: u64) -> EngineBuilder<Vec<f64>> {
    EngineBuilder::new(StdRng::seed_from_u64(seed))
        .selector(TournamentSelector)
        .variator(UniformCrossover)
        .variator(GaussianMutation)
        .replacer(GenerationalReplacer)
}

fn sphere_options() -> Options {
    Options::default()
        .with_tourn_size(2)
        .with_mutation_rate(0.1)
        .with_stdev(1.0)
        .with_bounder(Bounder::uniform(-5.12, 5.12))
}

#[test]
fn sphere_minimization() {
    let sizes = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&sizes);

    let mut engine = sphere_engine(1234)
        .archiver(BestArchiver)
        .terminator(EvaluationTermination)
        .observer(move |state: &EvolutionState<'_, Vec<f64>>, _: &Options| -> EvoResult<()> {
            seen.borrow_mut().push(state.population.len());
            Ok(())
        })
        .build();

    let population = engine
        .evolve(
            &UniformReals::uniform(3, -5.12, 5.12),
            &sphere(),
            100,
            vec![],
            false,
            sphere_options().with_max_evaluations(30_000),
        )
        .unwrap();

    assert_eq!(population.len(), 100);
    assert!(sizes.borrow().iter().all(|&n| n == 100));
    assert_eq!(engine.num_evaluations(), 30_000);
    assert_eq!(engine.termination_reason(), Some("Maximum evaluations reached"));

    let best = engine.archive()[0].scalar_fitness().unwrap();
    assert!(best < 0.02, "best fitness {} not below 0.02", best);
}

#[test]
fn binary_maximization() {
    let binary_value = FnEvaluator::new(|bits: &Vec<bool>| {
        Fitness::Scalar(bits.iter().fold(0.0, |acc, &b| acc * 2.0 + if b { 1.0 } else { 0.0 }))
    });
    let options = Options::default()
        .with_num_crossover_points(1)
        .with_crossover_rate(1.0)
        .with_mutation_rate(0.1)
        .with_num_elites(1)
        .with_max_evaluations(2000);

    let mut engine = genetic_algorithm(StdRng::seed_from_u64(1)).build();
    let population = engine
        .evolve(&RandomBits::new(8), &binary_value, 20, vec![], true, options)
        .unwrap();

    assert_eq!(population.len(), 20);
    assert_eq!(engine.num_evaluations(), 2000);
    let best = population.best().unwrap();
    assert_eq!(best.scalar_fitness().unwrap(), 255.0);
    assert_eq!(best.candidate, vec![true; 8]);
}

#[test]
fn pareto_front_two_objectives() {
    let objectives = FnEvaluator::new(|x: &Vec<f64>| -> Fitness {
        Pareto::minimizing(vec![x[0] * x[0], (x[0] - 1.0).powi(2)]).into()
    });
    let options = Options::default()
        .with_max_evaluations(1000)
        .with_stdev(0.1)
        .with_bounder(Bounder::uniform(0.0, 1.0));

    let mut engine = nsga2(StdRng::seed_from_u64(42)).build();
    engine
        .evolve(&UniformReals::uniform(1, 0.0, 1.0), &objectives, 50, vec![], false, options)
        .unwrap();

    let archive = engine.archive();
    assert!(is_mutually_non_dominated(archive).unwrap());

    let points: Vec<(f64, f64)> = archive
        .iter()
        .map(|a| {
            let f = a.fitness.as_ref().unwrap().objectives();
            (f[0], f[1])
        })
        .collect();

    for k in 0..20 {
        let t = k as f64 / 19.0;
        let target = (t * t, (1.0 - t).powi(2));
        let nearest = points
            .iter()
            .map(|p| ((p.0 - target.0).powi(2) + (p.1 - target.1).powi(2)).sqrt())
            .fold(f64::INFINITY, f64::min);
        assert!(
            nearest < 0.02,
            "no archived point within 0.02 of {:?} (nearest {})",
            target,
            nearest
        );
    }
}

#[test]
fn gaussian_mutation_respects_bounds() {
    let out_of_bounds = Rc::new(Cell::new(0usize));
    let generations = Rc::new(Cell::new(0usize));
    let (violations, count) = (Rc::clone(&out_of_bounds), Rc::clone(&generations));

    let mut engine = evolution_strategy(StdRng::seed_from_u64(4))
        .observer(move |state: &EvolutionState<'_, Vec<f64>>, _: &Options| -> EvoResult<()> {
            count.set(count.get() + 1);
            let outside = state
                .population
                .iter()
                .flat_map(|i| i.candidate.iter())
                .filter(|&&v| !(-1.0..=1.0).contains(&v))
                .count();
            violations.set(violations.get() + outside);
            Ok(())
        })
        .build();

    let options = Options::default()
        .with_stdev(10.0)
        .with_mutation_rate(1.0)
        .with_max_evaluations(1000)
        .with_bounder(Bounder::uniform(-1.0, 1.0));
    let population = engine
        .evolve(&UniformReals::uniform(5, -1.0, 1.0), &sphere(), 10, vec![], false, options)
        .unwrap();

    assert_eq!(generations.get(), 100);
    assert_eq!(out_of_bounds.get(), 0);
    assert!(population.iter().all(|i| i.candidate.len() == 5));
}

#[test]
fn identical_seeds_reproduce_a_run() {
    let run = |seed: u64| {
        let mut engine = sphere_engine(seed).terminator(GenerationTermination).build();
        let population = engine
            .evolve(
                &UniformReals::uniform(3, -5.12, 5.12),
                &sphere(),
                100,
                vec![],
                false,
                sphere_options().with_max_generations(50),
            )
            .unwrap();
        assert_eq!(engine.num_generations(), 50);
        population.candidates()
    };

    let first = run(1234);
    let second = run(1234);
    assert_eq!(first, second);

    let other = run(4321);
    assert_ne!(first, other);
}

/// Replacer that counts its calls before delegating to generational replacement
struct CountingReplacer {
    calls: Rc<Cell<usize>>,
}

impl Replacer<Vec<f64>> for CountingReplacer {
    fn replace(
        &mut self,
        rng: &mut dyn rand::RngCore,
        population: &[Individual<Vec<f64>>],
        parents: &[Individual<Vec<f64>>],
        offspring: &[Individual<Vec<f64>>],
        context: &ReplaceContext<'_, Vec<f64>>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<Vec<f64>>>> {
        self.calls.set(self.calls.get() + 1);
        GenerationalReplacer.replace(rng, population, parents, offspring, context, options)
    }
}

#[test]
fn short_evaluator_aborts_before_replacement() {
    let calls = Rc::new(Cell::new(0));
    let short = |candidates: &[Vec<f64>], _: &Options| -> Vec<Fitness> {
        candidates
            .iter()
            .skip(1)
            .map(|x| Fitness::Scalar(x.iter().map(|v| v * v).sum()))
            .collect()
    };

    let mut engine = sphere_engine(6)
        .replacer(CountingReplacer { calls: Rc::clone(&calls) })
        .terminator(GenerationTermination)
        .build();
    let result = engine.evolve(
        &UniformReals::uniform(3, -5.12, 5.12),
        &short,
        10,
        vec![],
        false,
        sphere_options().with_max_generations(5),
    );

    assert!(matches!(
        result,
        Err(EvolutionError::EvaluatorMismatch { expected: 10, actual: 9 })
    ));
    assert_eq!(calls.get(), 0);
}

#[test]
fn evaluator_failing_mid_run_keeps_last_population() {
    let calls = Rc::new(Cell::new(0));
    let batches = Cell::new(0);
    let flaky = |candidates: &[Vec<f64>], _: &Options| -> Vec<Fitness> {
        batches.set(batches.get() + 1);
        let take = if batches.get() == 3 {
            candidates.len() - 1
        } else {
            candidates.len()
        };
        candidates
            .iter()
            .take(take)
            .map(|x| Fitness::Scalar(x.iter().map(|v| v * v).sum()))
            .collect()
    };

    let mut engine = sphere_engine(7)
        .replacer(CountingReplacer { calls: Rc::clone(&calls) })
        .terminator(GenerationTermination)
        .build();
    let result = engine.evolve(
        &UniformReals::uniform(3, -5.12, 5.12),
        &flaky,
        10,
        vec![],
        false,
        sphere_options().with_max_generations(5),
    );

    assert!(matches!(result, Err(EvolutionError::EvaluatorMismatch { .. })));
    // Initial batch and one full generation succeeded
    assert_eq!(calls.get(), 1);
    assert_eq!(engine.num_generations(), 1);
    assert_eq!(engine.num_evaluations(), 20);
    assert_eq!(engine.population().len(), 10);
    assert!(engine.population().all_evaluated());
}

#[test]
fn time_limit_stops_the_run() {
    let mut engine = sphere_engine(8)
        .terminator(TimeTermination)
        .terminator(GenerationTermination)
        .build();

    // An exhausted time budget stops the run before the first generation
    let population = engine
        .evolve(
            &UniformReals::uniform(3, -5.12, 5.12),
            &sphere(),
            10,
            vec![],
            false,
            sphere_options()
                .with_max_time(Duration::ZERO)
                .with_max_generations(50),
        )
        .unwrap();
    assert_eq!(population.len(), 10);
    assert_eq!(engine.num_generations(), 0);
    assert_eq!(engine.num_evaluations(), 10);
    assert_eq!(engine.termination_reason(), Some("Time limit reached"));

    // A generous budget leaves the generation limit in charge
    engine
        .evolve(
            &UniformReals::uniform(3, -5.12, 5.12),
            &sphere(),
            10,
            vec![],
            false,
            sphere_options()
                .with_max_time(Duration::from_secs(3600))
                .with_max_generations(3),
        )
        .unwrap();
    assert_eq!(engine.num_generations(), 3);
    assert_eq!(engine.termination_reason(), Some("Maximum generations reached"));
}
