//! Selection operators
//!
//! This module provides the built-in selectors. All of them read `num_selected` from the
//! options (defaulting to the population size) and return clones of the chosen
//! individuals; selecting more than the population holds implies sampling with
//! replacement.

use std::cmp::Ordering;

use rand::seq::index;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, WeightedIndex};
use tracing::warn;

use crate::error::{EvoResult, EvolutionError};
use crate::options::Options;
use crate::operators::pareto::{crowding_distance, fast_non_dominated_sort};
use crate::operators::traits::Selector;
use crate::population::individual::Individual;
use crate::population::population::{best_n, rank_order};

fn num_selected<C>(population: &[Individual<C>], options: &Options) -> usize {
    options.num_selected.unwrap_or(population.len())
}

/// Selector that returns the whole population unchanged
#[derive(Clone, Debug, Default)]
pub struct DefaultSelector;

impl<C: Clone> Selector<C> for DefaultSelector {
    fn select(
        &self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        Ok(population.to_vec())
    }
}

/// Truncation selection
///
/// Deterministically returns the `num_selected` best individuals, ties broken by birth
/// order.
#[derive(Clone, Debug, Default)]
pub struct TruncationSelector;

impl<C: Clone> Selector<C> for TruncationSelector {
    fn select(
        &self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        best_n(population, num_selected(population, options))
    }
}

/// Uniform selection with replacement
#[derive(Clone, Debug, Default)]
pub struct UniformSelector;

impl<C: Clone> Selector<C> for UniformSelector {
    fn select(
        &self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let count = num_selected(population, options);
        if count > 0 && population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        Ok((0..count)
            .map(|_| population[rng.gen_range(0..population.len())].clone())
            .collect())
    }
}

/// Fitness-proportionate (roulette-wheel) selection
///
/// Only defined for maximized, non-negative scalar fitness. When all fitness values are
/// equal the wheel degenerates and selection falls back to uniform.
#[derive(Clone, Debug, Default)]
pub struct RouletteSelector;

impl<C: Clone> Selector<C> for RouletteSelector {
    fn select(
        &self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let count = num_selected(population, options);
        if count == 0 {
            return Ok(Vec::new());
        }
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if population.iter().any(|i| !i.maximize) {
            return Err(EvolutionError::invalid_usage(
                "fitness-proportionate selection requires maximization",
            ));
        }

        let weights = population
            .iter()
            .map(|i| i.scalar_fitness())
            .collect::<EvoResult<Vec<f64>>>()?;
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(EvolutionError::invalid_usage(
                "fitness-proportionate selection requires finite non-negative fitness",
            ));
        }

        if weights.iter().all(|w| *w == weights[0]) {
            warn!(
                population = population.len(),
                "all fitness values are equal, roulette selection falls back to uniform"
            );
            return UniformSelector.select(rng, population, options);
        }

        let wheel = WeightedIndex::new(&weights)
            .map_err(|e| EvolutionError::invalid_usage(format!("roulette wheel: {}", e)))?;
        Ok((0..count)
            .map(|_| population[wheel.sample(rng)].clone())
            .collect())
    }
}

/// Linear rank selection
///
/// The best of `n` individuals gets weight `n`, the worst weight 1. Insensitive to the
/// sign and scale of fitness.
#[derive(Clone, Debug, Default)]
pub struct RankSelector;

impl<C: Clone> Selector<C> for RankSelector {
    fn select(
        &self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let count = num_selected(population, options);
        if count == 0 {
            return Ok(Vec::new());
        }
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let order = rank_order(population)?;
        let n = order.len();
        let weights: Vec<usize> = (0..n).map(|rank| n - rank).collect();
        let wheel = WeightedIndex::new(&weights)
            .map_err(|e| EvolutionError::invalid_usage(format!("rank wheel: {}", e)))?;

        Ok((0..count)
            .map(|_| population[order[wheel.sample(rng)]].clone())
            .collect())
    }
}

/// Tournament selection
///
/// For each draw, samples `tourn_size` individuals without replacement and keeps the
/// best. Ties go to the contestant that comes first in the population.
#[derive(Clone, Debug, Default)]
pub struct TournamentSelector;

impl<C: Clone> Selector<C> for TournamentSelector {
    fn select(
        &self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let count = num_selected(population, options);
        if count == 0 {
            return Ok(Vec::new());
        }
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if options.tourn_size == 0 {
            return Err(EvolutionError::configuration(
                "tourn_size must be at least 1",
            ));
        }

        let tourn_size = options.tourn_size.min(population.len());
        let mut selected = Vec::with_capacity(count);
        for _ in 0..count {
            let mut contestants = index::sample(rng, population.len(), tourn_size).into_vec();
            contestants.sort_unstable();

            let mut best = contestants[0];
            for &challenger in &contestants[1..] {
                if population[challenger].compare(&population[best])? == Some(Ordering::Greater) {
                    best = challenger;
                }
            }
            selected.push(population[best].clone());
        }
        Ok(selected)
    }
}

/// Crowded-comparison tournament selection (Deb et al., 2002)
///
/// Like [`TournamentSelector`], but contestants are ranked by non-domination front and,
/// within a front, by descending crowding distance. Ties go to the contestant that comes
/// first in the population.
#[derive(Clone, Debug, Default)]
pub struct CrowdedTournamentSelector;

impl<C: Clone> Selector<C> for CrowdedTournamentSelector {
    fn select(
        &self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let count = num_selected(population, options);
        if count == 0 {
            return Ok(Vec::new());
        }
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if options.tourn_size == 0 {
            return Err(EvolutionError::configuration(
                "tourn_size must be at least 1",
            ));
        }

        let mut front_rank = vec![0usize; population.len()];
        let mut crowding = vec![0.0; population.len()];
        for (rank, front) in fast_non_dominated_sort(population)?.iter().enumerate() {
            for (&i, distance) in front.iter().zip(crowding_distance(population, front)?) {
                front_rank[i] = rank;
                crowding[i] = distance;
            }
        }
        let beats = |a: usize, b: usize| match front_rank[a].cmp(&front_rank[b]) {
            Ordering::Less => true,
            Ordering::Equal => crowding[a] > crowding[b],
            Ordering::Greater => false,
        };

        let tourn_size = options.tourn_size.min(population.len());
        let mut selected = Vec::with_capacity(count);
        for _ in 0..count {
            let mut contestants = index::sample(rng, population.len(), tourn_size).into_vec();
            contestants.sort_unstable();

            let mut best = contestants[0];
            for &challenger in &contestants[1..] {
                if beats(challenger, best) {
                    best = challenger;
                }
            }
            selected.push(population[best].clone());
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::{Fitness, Pareto};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_population(size: usize, maximize: bool) -> Vec<Individual<Vec<f64>>> {
        (0..size)
            .map(|i| Individual::with_fitness(vec![i as f64], Fitness::Scalar(i as f64), i, maximize))
            .collect()
    }

    #[test]
    fn test_default_selector_returns_population() {
        let mut rng = StdRng::seed_from_u64(0);
        let population = create_population(5, true);
        let selected = DefaultSelector
            .select(&mut rng, &population, &Options::default())
            .unwrap();
        assert_eq!(selected, population);
    }

    #[test]
    fn test_truncation_selects_top() {
        let mut rng = StdRng::seed_from_u64(0);
        let population = create_population(10, true);
        let options = Options::default().with_num_selected(3);

        let selected = TruncationSelector
            .select(&mut rng, &population, &options)
            .unwrap();
        let values: Vec<f64> = selected.iter().map(|i| i.candidate[0]).collect();
        assert_eq!(values, vec![9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_uniform_selector_with_replacement() {
        let mut rng = StdRng::seed_from_u64(1);
        let population = create_population(3, true);
        let options = Options::default().with_num_selected(20);

        let selected = UniformSelector
            .select(&mut rng, &population, &options)
            .unwrap();
        assert_eq!(selected.len(), 20);
    }

    #[test]
    fn test_roulette_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(2);
        let population = vec![
            Individual::with_fitness(vec![0.0], Fitness::Scalar(1.0), 0, true),
            Individual::with_fitness(vec![1.0], Fitness::Scalar(99.0), 1, true),
        ];
        let options = Options::default().with_num_selected(1000);

        let selected = RouletteSelector
            .select(&mut rng, &population, &options)
            .unwrap();
        let fitter = selected.iter().filter(|i| i.candidate[0] == 1.0).count();
        assert!(fitter > 900);
    }

    #[test]
    fn test_roulette_rejects_minimization() {
        let mut rng = StdRng::seed_from_u64(0);
        let population = create_population(5, false);
        let result = RouletteSelector.select(&mut rng, &population, &Options::default());
        assert!(matches!(result, Err(EvolutionError::InvalidUsage(_))));
    }

    #[test]
    fn test_roulette_equal_fitness_falls_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(3);
        let population: Vec<_> = (0..4)
            .map(|i| Individual::with_fitness(vec![i as f64], Fitness::Scalar(0.0), i, true))
            .collect();
        let selected = RouletteSelector
            .select(&mut rng, &population, &Options::default())
            .unwrap();
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_rank_selection_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(4);
        let population = create_population(2, false);
        let options = Options::default().with_num_selected(3000);

        // Minimizing: candidate 0 is best with weight 2 against weight 1
        let selected = RankSelector.select(&mut rng, &population, &options).unwrap();
        let best = selected.iter().filter(|i| i.candidate[0] == 0.0).count();
        assert!(best > 1800 && best < 2200);
    }

    #[test]
    fn test_tournament_full_size_selects_best() {
        let mut rng = StdRng::seed_from_u64(5);
        let population = create_population(8, true);
        let options = Options::default().with_tourn_size(8);

        let selected = TournamentSelector
            .select(&mut rng, &population, &options)
            .unwrap();
        assert_eq!(selected.len(), 8);
        assert!(selected.iter().all(|i| i.candidate[0] == 7.0));
    }

    #[test]
    fn test_tournament_unevaluated_fails() {
        let mut rng = StdRng::seed_from_u64(6);
        let population = vec![
            Individual::new(vec![0.0], 0, true),
            Individual::new(vec![1.0], 1, true),
        ];
        let options = Options::default().with_tourn_size(2);
        let result = TournamentSelector.select(&mut rng, &population, &options);
        assert!(matches!(result, Err(EvolutionError::UnevaluatedIndividual)));
    }

    #[test]
    fn test_tournament_size_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        let population = create_population(3, true);
        let options = Options::default().with_tourn_size(0);
        let result = TournamentSelector.select(&mut rng, &population, &options);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    #[test]
    fn test_selectors_on_empty_population() {
        let mut rng = StdRng::seed_from_u64(0);
        let population: Vec<Individual<Vec<f64>>> = Vec::new();
        let options = Options::default().with_num_selected(2);
        assert!(matches!(
            TournamentSelector.select(&mut rng, &population, &options),
            Err(EvolutionError::EmptyPopulation)
        ));
        assert!(DefaultSelector
            .select(&mut rng, &population, &Options::default())
            .unwrap()
            .is_empty());
    }

    fn front(points: &[(f64, f64)]) -> Vec<Individual<Vec<f64>>> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                Individual::with_fitness(vec![x, y], Pareto::minimizing(vec![x, y]).into(), i, false)
            })
            .collect()
    }

    #[test]
    fn test_crowded_tournament_prefers_less_crowded() {
        let mut rng = StdRng::seed_from_u64(7);
        // Mutually non-dominated; the oldest member sits in the most crowded spot
        let population = front(&[(1.1, 2.9), (1.0, 3.0), (1.2, 2.8), (0.0, 4.0), (4.0, 0.0)]);
        let options = Options::default().with_tourn_size(5).with_num_selected(6);

        let plain = TournamentSelector.select(&mut rng, &population, &options).unwrap();
        assert!(plain.iter().all(|i| i.birth_index == 0));

        let crowded = CrowdedTournamentSelector
            .select(&mut rng, &population, &options)
            .unwrap();
        assert_eq!(crowded.len(), 6);
        assert!(crowded.iter().all(|i| i.birth_index == 3));
    }

    #[test]
    fn test_crowded_tournament_interior_by_distance() {
        let mut rng = StdRng::seed_from_u64(8);
        let population = front(&[(1.1, 2.9), (1.0, 3.0), (1.2, 2.8), (0.0, 4.0), (4.0, 0.0)]);
        let interior = &population[..3];
        let options = Options::default().with_tourn_size(3).with_num_selected(4);

        // Within the interior slice, (1.0, 3.0) and (1.2, 2.8) are boundaries
        let selected = CrowdedTournamentSelector
            .select(&mut rng, interior, &options)
            .unwrap();
        assert!(selected.iter().all(|i| i.birth_index == 1));
    }

    #[test]
    fn test_crowded_tournament_prefers_lower_front() {
        let mut rng = StdRng::seed_from_u64(9);
        // (2, 2) is dominated by (1, 1) and sits in the second front
        let population = front(&[(2.0, 2.0), (1.0, 1.0)]);
        let options = Options::default().with_tourn_size(2);

        let selected = CrowdedTournamentSelector
            .select(&mut rng, &population, &options)
            .unwrap();
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|i| i.birth_index == 1));
    }
}
