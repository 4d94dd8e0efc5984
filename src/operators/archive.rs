//! Archivers
//!
//! Archivers maintain a secondary set of notable individuals across generations. The
//! archive is not ordered like a population; its update policy is archiver-defined.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::RngCore;

use crate::error::{EvoResult, EvolutionError};
use crate::operators::traits::Archiver;
use crate::options::Options;
use crate::population::individual::Individual;

/// Archiver that replaces the archive with the current population
#[derive(Clone, Debug, Default)]
pub struct DefaultArchiver;

impl<C: Clone> Archiver<C> for DefaultArchiver {
    fn archive(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        _archive: &[Individual<C>],
        _options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        Ok(population.to_vec())
    }
}

/// How an incoming individual relates to an archive
enum Admission {
    /// Duplicate candidate or fitness, or dominated by a member
    Rejected,
    /// Non-dominated; the listed members are dominated by it
    Accepted(Vec<usize>),
}

fn admission<C: PartialEq>(archive: &[Individual<C>], incoming: &Individual<C>) -> EvoResult<Admission> {
    let mut dominated = Vec::new();
    for (i, member) in archive.iter().enumerate() {
        if member.candidate == incoming.candidate {
            return Ok(Admission::Rejected);
        }
        match incoming.compare(member)? {
            Some(Ordering::Equal) | Some(Ordering::Less) => return Ok(Admission::Rejected),
            Some(Ordering::Greater) => dominated.push(i),
            None => {}
        }
    }
    Ok(Admission::Accepted(dominated))
}

fn remove_indices<C>(archive: &mut Vec<Individual<C>>, indices: &[usize]) {
    let mut position = 0;
    archive.retain(|_| {
        let keep = !indices.contains(&position);
        position += 1;
        keep
    });
}

/// Pareto archive of the best individuals seen so far
///
/// An individual enters iff no member dominates it and no member has an equal candidate
/// or fitness; members it dominates are removed. With scalar fitness the archive keeps
/// the single best individual.
#[derive(Clone, Debug, Default)]
pub struct BestArchiver;

impl<C: Clone + PartialEq> Archiver<C> for BestArchiver {
    fn archive(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        archive: &[Individual<C>],
        _options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let mut new_archive = archive.to_vec();
        for individual in population {
            if let Admission::Accepted(dominated) = admission(&new_archive, individual)? {
                remove_indices(&mut new_archive, &dominated);
                new_archive.push(individual.clone());
            }
        }
        Ok(new_archive)
    }
}

/// Recursive objective-space grid (Knowles & Corne's PAES)
///
/// Each level halves every objective's range, giving `2^objectives` cells per level;
/// `divisions` levels are nested. The envelope is padded by 20% of its span on each side
/// (20% of the magnitude, or 0.2, for a degenerate span).
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveGrid {
    /// Padded lower corner of the envelope
    pub lower: Vec<f64>,
    /// Padded upper corner of the envelope
    pub upper: Vec<f64>,
    /// Number of nested levels
    pub divisions: usize,
}

impl AdaptiveGrid {
    /// Build the grid enclosing a set of objective vectors
    pub fn enclosing(points: &[&[f64]], divisions: usize) -> EvoResult<Self> {
        let first = points.first().ok_or(EvolutionError::EmptyPopulation)?;
        let num_objectives = first.len();
        if points.iter().any(|p| p.len() != num_objectives) {
            return Err(EvolutionError::invalid_usage(
                "adaptive grid requires objective vectors of equal length",
            ));
        }
        if num_objectives * divisions >= 128 {
            return Err(EvolutionError::configuration(format!(
                "adaptive grid with {} objectives supports fewer than {} divisions",
                num_objectives,
                128 / num_objectives.max(1)
            )));
        }

        let mut lower = first.to_vec();
        let mut upper = first.to_vec();
        for point in &points[1..] {
            for (m, &value) in point.iter().enumerate() {
                lower[m] = lower[m].min(value);
                upper[m] = upper[m].max(value);
            }
        }
        for m in 0..num_objectives {
            let span = upper[m] - lower[m];
            let pad = if span > 0.0 {
                0.2 * span
            } else {
                0.2 * lower[m].abs().max(1.0)
            };
            lower[m] -= pad;
            upper[m] += pad;
        }

        Ok(Self {
            lower,
            upper,
            divisions,
        })
    }

    /// Cell index of an objective vector
    pub fn location(&self, objectives: &[f64]) -> u128 {
        let num_objectives = self.lower.len();
        let mut lower = self.lower.clone();
        let mut width: Vec<f64> = self
            .upper
            .iter()
            .zip(&self.lower)
            .map(|(hi, lo)| hi - lo)
            .collect();
        let mut inc: Vec<u128> = (0..num_objectives).map(|m| 1u128 << m).collect();

        let mut location = 0u128;
        for _ in 0..self.divisions {
            for m in 0..num_objectives {
                let mid = lower[m] + width[m] / 2.0;
                if objectives[m] < mid {
                    location += inc[m];
                } else {
                    lower[m] = mid;
                }
            }
            for m in 0..num_objectives {
                inc[m] <<= num_objectives;
                width[m] /= 2.0;
            }
        }
        location
    }

    /// Number of points per occupied cell
    pub fn occupancy(&self, points: &[&[f64]]) -> BTreeMap<u128, usize> {
        let mut counts = BTreeMap::new();
        for point in points {
            *counts.entry(self.location(point)).or_insert(0) += 1;
        }
        counts
    }
}

/// Objective vectors of a set of individuals
pub fn objective_vectors<C>(individuals: &[Individual<C>]) -> EvoResult<Vec<&[f64]>> {
    individuals
        .iter()
        .map(|i| i.fitness().map(|f| f.objectives()))
        .collect()
}

/// Bounded Pareto archive kept diverse with an [`AdaptiveGrid`]
///
/// Holds at most `max_archive_size` individuals. A newcomer that dominates members
/// replaces them; a non-dominated newcomer enters a full archive only if its grid cell is
/// less crowded than the most crowded one, evicting a member of that cell. The grid is
/// rebuilt from the archive and the newcomer on every update.
#[derive(Clone, Debug, Default)]
pub struct AdaptiveGridArchiver {
    grid: Option<AdaptiveGrid>,
}

impl AdaptiveGridArchiver {
    /// Create a new adaptive-grid archiver
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid built by the most recent update, if any
    pub fn grid(&self) -> Option<&AdaptiveGrid> {
        self.grid.as_ref()
    }

    fn insert<C: Clone + PartialEq>(
        &mut self,
        archive: &mut Vec<Individual<C>>,
        incoming: &Individual<C>,
        options: &Options,
    ) -> EvoResult<()> {
        let dominated = match admission(archive, incoming)? {
            Admission::Rejected => return Ok(()),
            Admission::Accepted(dominated) => dominated,
        };
        if !dominated.is_empty() {
            remove_indices(archive, &dominated);
            archive.push(incoming.clone());
            return Ok(());
        }
        if archive.len() < options.max_archive_size {
            archive.push(incoming.clone());
            return Ok(());
        }

        let mut points = objective_vectors(archive)?;
        points.push(incoming.fitness()?.objectives());
        let grid = AdaptiveGrid::enclosing(&points, options.num_grid_divisions)?;
        let occupancy = grid.occupancy(&points);

        let incoming_count = occupancy
            .get(&grid.location(incoming.fitness()?.objectives()))
            .copied()
            .unwrap_or(0);
        let crowded = occupancy
            .iter()
            .fold(None, |best: Option<(u128, usize)>, (&cell, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((cell, count)),
            });

        if let Some((cell, count)) = crowded {
            if incoming_count < count {
                let evicted = points[..archive.len()]
                    .iter()
                    .position(|p| grid.location(p) == cell);
                if let Some(evicted) = evicted {
                    archive.remove(evicted);
                    archive.push(incoming.clone());
                }
            }
        }
        self.grid = Some(grid);
        Ok(())
    }
}

impl<C: Clone + PartialEq> Archiver<C> for AdaptiveGridArchiver {
    fn archive(
        &mut self,
        _rng: &mut dyn RngCore,
        population: &[Individual<C>],
        archive: &[Individual<C>],
        options: &Options,
    ) -> EvoResult<Vec<Individual<C>>> {
        let mut new_archive = archive.to_vec();
        for individual in population {
            self.insert(&mut new_archive, individual, options)?;
        }
        Ok(new_archive)
    }
}

/// Check that no archive member dominates another
pub fn is_mutually_non_dominated<C>(archive: &[Individual<C>]) -> EvoResult<bool> {
    for (i, a) in archive.iter().enumerate() {
        for b in &archive[i + 1..] {
            if matches!(a.compare(b)?, Some(Ordering::Greater) | Some(Ordering::Less)) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
