//! Replacement operators
//!
//! Replacers form the next population from the current population, the selected parents
//! and the evaluated offspring. Every built-in replacer except [`CommaReplacer`] keeps the
//! population size; the engine re-sorts the result best-first.

use std::collections::HashSet;

use rand::seq::index;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::candidate::Candidate;
use crate::error::{EvoResult, EvolutionError};
use crate::operators::archive::{objective_vectors, AdaptiveGrid};
use crate::operators::pareto::{crowding_distance, fast_non_dominated_sort};
use crate::operators::traits::{ReplaceContext, Replacer};
use crate::options::Options;
use crate::population::individual::Individual;
use crate::population::population::{best_n, rank_order};

fn survivors_of<C: Clone>(
    pool: Vec<Individual<C>>,
    size: usize,
    name: &str,
) -> EvoResult<Vec<Individual<C>>> {
    if pool.len() < size {
        return Err(EvolutionError::invalid_usage(format!(
            "{} replacement needs at least {} individuals, got {}",
            name,
            size,
            pool.len()
        )));
    }
    best_n(&pool, size)
}

/// Replacer that returns the offspring as the new population
#[derive(Clone, Debug, Default)]
pub struct DefaultReplacer;

impl<C: Clone> Replacer<C> for DefaultReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        _population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        _options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        Ok(offspring.to_vec())
    }
}

/// Truncation replacement
///
/// Keeps the best `|population|` individuals of the population and offspring combined.
#[derive(Clone, Debug, Default)]
pub struct TruncationReplacer;

impl<C: Clone> Replacer<C> for TruncationReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        _options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let pool: Vec<_> = population.iter().chain(offspring).cloned().collect();
        best_n(&pool, population.len())
    }
}

/// Steady-state replacement
///
/// Offspring overwrite the worst members of the population, even when they are worse.
#[derive(Clone, Debug, Default)]
pub struct SteadyStateReplacer;

impl<C: Clone> Replacer<C> for SteadyStateReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        _options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let mut survivors = population.to_vec();
        let worst_first = rank_order(population)?.into_iter().rev();
        for (slot, child) in worst_first.zip(offspring) {
            survivors[slot] = child.clone();
        }
        Ok(survivors)
    }
}

/// Generational replacement with weak elitism
///
/// The new population is the best `|population|` of the offspring plus the
/// `num_elites` best members of the current population.
#[derive(Clone, Debug, Default)]
pub struct GenerationalReplacer;

impl<C: Clone> Replacer<C> for GenerationalReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let mut pool = offspring.to_vec();
        pool.extend(best_n(population, options.num_elites)?);
        survivors_of(pool, population.len(), "generational")
    }
}

/// Random replacement
///
/// Offspring overwrite randomly chosen members of the population, sparing the
/// `num_elites` best.
#[derive(Clone, Debug, Default)]
pub struct RandomReplacer;

impl<C: Clone> Replacer<C> for RandomReplacer {
    fn replace(
        &mut self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let mut survivors = best_n(population, population.len())?;
        let num_elites = options.num_elites.min(population.len());
        let replaceable = population.len() - num_elites;
        let count = offspring.len().min(replaceable);

        for (slot, child) in index::sample(rng, replaceable, count).into_iter().zip(offspring) {
            survivors[num_elites + slot] = child.clone();
        }
        Ok(survivors)
    }
}

/// Plus replacement (µ + λ)
///
/// Keeps the best `|population|` of parents and offspring combined. With
/// `use_one_fifth_rule`, the share of offspring among the survivors adapts
/// `mutation_rate`: below one fifth it is multiplied by 0.8, above by 1.2.
#[derive(Clone, Debug, Default)]
pub struct PlusReplacer;

impl<C: Clone> Replacer<C> for PlusReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let pool: Vec<_> = parents.iter().chain(offspring).cloned().collect();
        let survivors = survivors_of(pool, population.len(), "plus")?;

        if options.use_one_fifth_rule && !offspring.is_empty() {
            if let Some(rate) = options.mutation_rate {
                let births: HashSet<usize> = offspring.iter().map(|o| o.birth_index).collect();
                let survived = survivors
                    .iter()
                    .filter(|s| births.contains(&s.birth_index))
                    .count();
                let success = survived as f64 / offspring.len() as f64;

                let factor = if success < 0.2 {
                    0.8
                } else if success > 0.2 {
                    1.2
                } else {
                    1.0
                };
                options.mutation_rate = Some(rate * factor);
                debug!(success, mutation_rate = rate * factor, "one-fifth rule");
            }
        }

        Ok(survivors)
    }
}

/// Comma replacement (µ, λ)
///
/// Keeps the best `|population|` offspring; parents never survive.
#[derive(Clone, Debug, Default)]
pub struct CommaReplacer;

impl<C: Clone> Replacer<C> for CommaReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        _options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        survivors_of(offspring.to_vec(), population.len(), "comma")
    }
}

/// Distance between two candidates
pub type DistanceFn<C> = Box<dyn Fn(&C, &C) -> f64 + Send + Sync>;

/// Crowding replacement (De Jong)
///
/// Each offspring is compared with the nearest of `crowding_distance` randomly drawn
/// members and takes its place if strictly better. The distance defaults to
/// [`Candidate::distance`].
pub struct CrowdingReplacer<C> {
    distance: Option<DistanceFn<C>>,
}

impl<C> CrowdingReplacer<C> {
    /// Crowding replacement with the candidate's own distance
    pub fn new() -> Self {
        Self { distance: None }
    }

    /// Crowding replacement with a custom distance
    pub fn with_distance<F>(distance: F) -> Self
    where
        F: Fn(&C, &C) -> f64 + Send + Sync + 'static,
    {
        Self {
            distance: Some(Box::new(distance)),
        }
    }
}

impl<C> Default for CrowdingReplacer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for CrowdingReplacer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrowdingReplacer")
            .field("custom_distance", &self.distance.is_some())
            .finish()
    }
}

impl<C: Candidate> Replacer<C> for CrowdingReplacer<C> {
    fn replace(
        &mut self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let mut survivors = population.to_vec();
        if survivors.is_empty() {
            return Ok(survivors);
        }
        let sample_size = options.crowding_distance.clamp(1, survivors.len());

        for child in offspring {
            let mut closest: Option<(usize, f64)> = None;
            for i in index::sample(rng, survivors.len(), sample_size).into_iter() {
                let d = match &self.distance {
                    Some(distance) => distance(&child.candidate, &survivors[i].candidate),
                    None => child.candidate.distance(&survivors[i].candidate),
                };
                if closest.map_or(true, |(_, best)| d < best) {
                    closest = Some((i, d));
                }
            }
            if let Some((i, _)) = closest {
                if child.is_better_than(&survivors[i])? {
                    survivors[i] = child.clone();
                }
            }
        }
        Ok(survivors)
    }
}

/// Simulated-annealing replacement
///
/// Each offspring replaces its parent if it is no worse, and otherwise with probability
/// `exp(-Δ/T)` where `Δ` is the loss in fitness. The temperature starts at `temperature`
/// and decays linearly to zero over `max_evaluations`. Scalar fitness only.
#[derive(Clone, Debug, Default)]
pub struct SimulatedAnnealingReplacer;

impl SimulatedAnnealingReplacer {
    /// Temperature after `num_evaluations` of `max_evaluations`
    pub fn temperature(initial: f64, num_evaluations: usize, max_evaluations: usize) -> f64 {
        let progress = num_evaluations as f64 / max_evaluations.max(1) as f64;
        (initial * (1.0 - progress)).max(0.0)
    }
}

impl<C: Clone> Replacer<C> for SimulatedAnnealingReplacer {
    fn replace(
        &mut self,
        rng: &mut dyn RngCore,
        population: &[Individual<C>],
        parents: &[Individual<C>],
        offspring: &[Individual<C>],
        context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let max_evaluations = options.max_evaluations.ok_or_else(|| {
            EvolutionError::configuration("simulated annealing requires max_evaluations")
        })?;
        if parents.len() != population.len() {
            return Err(EvolutionError::invalid_usage(format!(
                "simulated annealing needs one parent per population member ({} != {})",
                parents.len(),
                population.len()
            )));
        }

        let temperature =
            Self::temperature(options.temperature, context.num_evaluations, max_evaluations);
        let mut survivors = parents.to_vec();
        for (slot, child) in survivors.iter_mut().zip(offspring) {
            let parent_value = slot.scalar_fitness()?;
            let child_value = child.scalar_fitness()?;
            let loss = if context.maximize {
                parent_value - child_value
            } else {
                child_value - parent_value
            };

            let accept = if loss <= 0.0 {
                true
            } else if temperature > 0.0 {
                rng.gen::<f64>() < (-loss / temperature).exp()
            } else {
                false
            };
            if accept {
                *slot = child.clone();
            }
        }
        Ok(survivors)
    }
}

/// NSGA-II replacement (Deb et al., 2002)
///
/// Fills the next population front by front from the non-dominated sorting of
/// population and offspring; the front that overflows is truncated by descending
/// crowding distance.
#[derive(Clone, Debug, Default)]
pub struct Nsga2Replacer;

impl<C: Clone> Replacer<C> for Nsga2Replacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _parents: &[Individual<C>],
        offspring: &[Individual<C>],
        _context: &ReplaceContext<'_, C>,
        _options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let size = population.len();
        let pool: Vec<_> = population.iter().chain(offspring).cloned().collect();
        let fronts = fast_non_dominated_sort(&pool)?;

        let mut chosen: Vec<usize> = Vec::with_capacity(size);
        for front in &fronts {
            if chosen.len() + front.len() <= size {
                chosen.extend(front);
                continue;
            }

            let distances = crowding_distance(&pool, front)?;
            let mut by_distance: Vec<usize> = (0..front.len()).collect();
            by_distance.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));
            let remaining = size - chosen.len();
            chosen.extend(by_distance.into_iter().take(remaining).map(|k| front[k]));
            break;
        }

        Ok(chosen.into_iter().map(|i| pool[i].clone()).collect())
    }
}

/// PAES replacement (Knowles & Corne)
///
/// Decides per parent/offspring pair. The offspring wins if it dominates its parent and
/// loses if dominated by the parent or by an archive member. Otherwise the less crowded
/// cell of an [`AdaptiveGrid`] over the archive and the offspring decides, with ties
/// keeping the parent.
#[derive(Clone, Debug, Default)]
pub struct PaesReplacer;

impl PaesReplacer {
    fn offspring_wins<C: PartialEq>(
        parent: &Individual<C>,
        child: &Individual<C>,
        archive: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<bool> {
        if child.candidate == parent.candidate {
            return Ok(false);
        }
        if child.dominates(parent)? {
            return Ok(true);
        }
        if parent.dominates(child)? {
            return Ok(false);
        }
        for member in archive {
            if member.dominates(child)? {
                return Ok(false);
            }
        }

        let mut points = objective_vectors(archive)?;
        points.push(child.fitness()?.objectives());
        let grid = AdaptiveGrid::enclosing(&points, options.num_grid_divisions)?;
        let occupancy = grid.occupancy(&points);
        let crowding = |objectives: &[f64]| {
            occupancy
                .get(&grid.location(objectives))
                .copied()
                .unwrap_or(0)
        };
        Ok(crowding(child.fitness()?.objectives()) < crowding(parent.fitness()?.objectives()))
    }
}

impl<C: Clone + PartialEq> Replacer<C> for PaesReplacer {
    fn replace(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        parents: &[Individual<C>],
        offspring: &[Individual<C>],
        context: &ReplaceContext<'_, C>,
        options: &mut Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        if parents.len() != population.len() {
            return Err(EvolutionError::invalid_usage(format!(
                "PAES needs one parent per population member ({} != {})",
                parents.len(),
                population.len()
            )));
        }

        let mut survivors = parents.to_vec();
        for (slot, child) in survivors.iter_mut().zip(offspring) {
            if Self::offspring_wins(slot, child, context.archive, options)? {
                *slot = child.clone();
            }
        }
        Ok(survivors)
    }
}
