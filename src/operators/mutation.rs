//! Mutation operators
//!
//! Mutation variators copy each input candidate and perturb the copy position-wise with
//! probability `mutation_rate`. Numeric mutations clamp their result with the bounder
//! found in the options.

use rand::seq::{index, SliceRandom};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

use crate::candidate::{numeric_view_mut, Candidate};
use crate::error::{EvoResult, EvolutionError};
use crate::operators::traits::{VariationContext, Variator};
use crate::options::Options;

/// Apply `mutate` to a copy of every candidate
pub fn mutate_each<C, F>(rng: &mut dyn RngCore, candidates: &[C], mut mutate: F) -> EvoResult<Vec<C>>
where
    C: Clone,
    F: FnMut(&mut dyn RngCore, &mut C) -> EvoResult<()>,
{
    candidates
        .iter()
        .map(|candidate| {
            let mut mutant = candidate.clone();
            mutate(&mut *rng, &mut mutant)?;
            Ok(mutant)
        })
        .collect()
}

fn bound<C: Candidate>(candidate: &mut C, options: &Options) -> EvoResult<()> {
    match &options.bounder {
        Some(bounder) => bounder.bound_candidate(candidate),
        None => Ok(()),
    }
}

/// Bit-flip mutation
///
/// Flips each bit independently with probability `mutation_rate`.
#[derive(Clone, Debug, Default)]
pub struct BitFlipMutation;

impl Variator<Vec<bool>> for BitFlipMutation {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[Vec<bool>],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<Vec<bool>>> {
        let rate = options.mutation_rate();
        mutate_each(rng, candidates, |rng, bits| {
            for bit in bits.iter_mut() {
                if rng.gen::<f64>() < rate {
                    *bit = !*bit;
                }
            }
            Ok(())
        })
    }
}

/// Gaussian mutation
///
/// Adds `N(mean, stdev)` noise to each coordinate selected with probability
/// `mutation_rate`.
#[derive(Clone, Debug, Default)]
pub struct GaussianMutation;

impl<C: Candidate> Variator<C> for GaussianMutation {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let rate = options.mutation_rate();
        if !(options.stdev >= 0.0 && options.stdev.is_finite()) {
            return Err(EvolutionError::configuration(format!(
                "Gaussian mutation stdev must be finite and non-negative, got {}",
                options.stdev
            )));
        }
        let normal = Normal::new(options.mean, options.stdev).map_err(|e| {
            EvolutionError::configuration(format!("invalid Gaussian mutation stdev: {}", e))
        })?;

        mutate_each(rng, candidates, |rng, candidate| {
            for value in numeric_view_mut(candidate)?.iter_mut() {
                if rng.gen::<f64>() < rate {
                    *value += normal.sample(rng);
                }
            }
            bound(candidate, options)
        })
    }
}

/// Non-uniform mutation
///
/// Moves each selected coordinate toward its lower or upper bound (50% each) by
/// `(bound − c)·(1 − U^e)`, where `e = (1 − g/G)^mutation_range` shrinks the steps as the
/// generation count `g` approaches `G = max_generations`. Requires a bounder.
#[derive(Clone, Debug, Default)]
pub struct NonUniformMutation;

impl<C: Candidate> Variator<C> for NonUniformMutation {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let bounder = options.bounder.as_ref().ok_or_else(|| {
            EvolutionError::configuration("non-uniform mutation requires a bounder")
        })?;
        let max_generations = options.max_generations.ok_or_else(|| {
            EvolutionError::configuration("non-uniform mutation requires max_generations")
        })?;

        let progress = context.num_generations as f64 / max_generations.max(1) as f64;
        let exponent = (1.0 - progress).max(0.0).powf(options.mutation_range);
        let rate = options.mutation_rate();

        mutate_each(rng, candidates, |rng, candidate| {
            for (i, value) in numeric_view_mut(candidate)?.iter_mut().enumerate() {
                if rng.gen::<f64>() >= rate {
                    continue;
                }
                let interval = bounder.interval(i)?;
                let shrink = 1.0 - rng.gen::<f64>().powf(exponent);
                if rng.gen_bool(0.5) {
                    *value += (interval.upper - *value) * shrink;
                } else {
                    *value -= (*value - interval.lower) * shrink;
                }
            }
            bounder.bound_candidate(candidate)
        })
    }
}

/// Pick a random slice `[start, end)` of a sequence of length `len`
fn random_slice(rng: &mut dyn RngCore, len: usize) -> (usize, usize) {
    let mut cuts = index::sample(rng, len + 1, 2).into_vec();
    cuts.sort_unstable();
    (cuts[0], cuts[1])
}

/// Scramble mutation
///
/// With probability `mutation_rate`, shuffles the elements between two random cut points.
#[derive(Clone, Debug, Default)]
pub struct ScrambleMutation;

impl<T: Clone> Variator<Vec<T>> for ScrambleMutation {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[Vec<T>],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<Vec<T>>> {
        let rate = options.mutation_rate();
        mutate_each(rng, candidates, |rng, sequence| {
            if sequence.len() >= 2 && rng.gen::<f64>() < rate {
                let (start, end) = random_slice(rng, sequence.len());
                sequence[start..end].shuffle(rng);
            }
            Ok(())
        })
    }
}

/// Inversion mutation
///
/// With probability `mutation_rate`, reverses the elements between two random cut points.
#[derive(Clone, Debug, Default)]
pub struct InversionMutation;

impl<T: Clone> Variator<Vec<T>> for InversionMutation {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[Vec<T>],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<Vec<T>>> {
        let rate = options.mutation_rate();
        mutate_each(rng, candidates, |rng, sequence| {
            if sequence.len() >= 2 && rng.gen::<f64>() < rate {
                let (start, end) = random_slice(rng, sequence.len());
                sequence[start..end].reverse();
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounder::Bounder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context() -> VariationContext<'static> {
        VariationContext::new(4, true)
    }

    #[test]
    fn test_bit_flip_rate_one_inverts() {
        let mut rng = StdRng::seed_from_u64(0);
        let parents = vec![vec![true, false, true]];
        let options = Options::default().with_mutation_rate(1.0);
        let children = BitFlipMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();
        assert_eq!(children, vec![vec![false, true, false]]);
        assert_eq!(parents, vec![vec![true, false, true]]);
    }

    #[test]
    fn test_bit_flip_rate_zero_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let parents = vec![vec![true; 16]];
        let options = Options::default().with_mutation_rate(0.0);
        let children = BitFlipMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();
        assert_eq!(children, parents);
    }

    #[test]
    fn test_gaussian_mutation_changes_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let parents = vec![vec![0.0; 10]];
        let options = Options::default().with_mutation_rate(1.0);
        let children = GaussianMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();
        assert!(children[0].iter().all(|x| *x != 0.0));
    }

    #[test]
    fn test_gaussian_mutation_bounded() {
        let mut rng = StdRng::seed_from_u64(2);
        let parents = vec![vec![0.0; 5]; 10];
        let options = Options::default()
            .with_mutation_rate(1.0)
            .with_stdev(10.0)
            .with_bounder(Bounder::uniform(-1.0, 1.0));
        let children = GaussianMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();
        assert!(children.iter().flatten().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn test_gaussian_mutation_negative_stdev() {
        let mut rng = StdRng::seed_from_u64(0);
        let options = Options::default().with_stdev(-1.0);
        let result = GaussianMutation.vary(&mut rng, &[vec![0.0]], &context(), &options);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));

        let options = Options::default().with_stdev(f64::INFINITY);
        let result = GaussianMutation.vary(&mut rng, &[vec![0.0]], &context(), &options);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    #[test]
    fn test_non_uniform_requires_configuration() {
        let mut rng = StdRng::seed_from_u64(0);
        let options = Options::default().with_max_generations(10);
        let result = NonUniformMutation.vary(&mut rng, &[vec![0.0]], &context(), &options);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));

        let options = Options::default().with_bounder(Bounder::uniform(0.0, 1.0));
        let result = NonUniformMutation.vary(&mut rng, &[vec![0.0]], &context(), &options);
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    #[test]
    fn test_non_uniform_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = Options::default()
            .with_mutation_rate(1.0)
            .with_max_generations(10)
            .with_bounder(Bounder::uniform(-2.0, 2.0));
        let parents = vec![vec![0.5, -1.5, 1.9]; 20];
        let children = NonUniformMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();
        assert!(children.iter().flatten().all(|x| (-2.0..=2.0).contains(x)));
    }

    #[test]
    fn test_non_uniform_frozen_at_last_generation() {
        let mut rng = StdRng::seed_from_u64(4);
        let options = Options::default()
            .with_mutation_rate(1.0)
            .with_max_generations(10)
            .with_bounder(Bounder::uniform(-2.0, 2.0));
        let context = VariationContext::new(4, true).with_counters(10, 100);
        let parents = vec![vec![0.5, -1.5]];
        let children = NonUniformMutation
            .vary(&mut rng, &parents, &context, &options)
            .unwrap();
        // Exponent 0 makes every step vanish
        assert_eq!(children, parents);
    }

    #[test]
    fn test_scramble_preserves_elements() {
        let mut rng = StdRng::seed_from_u64(5);
        let parents = vec![(0..10).collect::<Vec<usize>>()];
        let options = Options::default().with_mutation_rate(1.0);
        let children = ScrambleMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();
        let mut sorted = children[0].clone();
        sorted.sort_unstable();
        assert_eq!(sorted, parents[0]);
    }

    #[test]
    fn test_inversion_reverses_a_slice() {
        let mut rng = StdRng::seed_from_u64(6);
        let parents = vec![(0..10).collect::<Vec<usize>>()];
        let options = Options::default().with_mutation_rate(1.0);
        let children = InversionMutation
            .vary(&mut rng, &parents, &context(), &options)
            .unwrap();

        let child = &children[0];
        let start = (0..10).find(|&i| child[i] != i).unwrap_or(10);
        let end = (0..10).rev().find(|&i| child[i] != i).map_or(start, |i| i + 1);
        let reversed: Vec<usize> = (start..end).rev().collect();
        assert_eq!(&child[start..end], &reversed[..]);
    }
}
