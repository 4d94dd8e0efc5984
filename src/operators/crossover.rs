//! Crossover operators
//!
//! Crossover variators recombine consecutive pairs of a shuffled copy of their input.
//! Each pair is recombined with probability `crossover_rate`, otherwise both parents pass
//! through unchanged; an odd last candidate is carried through as is.
//!
//! Numeric crossovers clamp their children with the bounder found in the options.

use std::cmp::Ordering;

use rand::seq::{index, SliceRandom};
use rand::{Rng, RngCore};

use crate::candidate::{numeric_view, numeric_view_mut, Candidate};
use crate::error::{EvoResult, EvolutionError};
use crate::operators::traits::{VariationContext, Variator};
use crate::options::Options;

/// Recombine consecutive pairs of `candidates`
///
/// With `shuffle` the pairs are drawn from a shuffled copy; otherwise input order is kept.
/// `recombine` receives a pair and returns its two children.
pub fn crossover_pairs<C, F>(
    rng: &mut dyn RngCore,
    candidates: &[C],
    shuffle: bool,
    crossover_rate: f64,
    mut recombine: F,
) -> EvoResult<Vec<C>>
where
    C: Clone,
    F: FnMut(&mut dyn RngCore, usize, &C, &C) -> EvoResult<(C, C)>,
{
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    if shuffle {
        order.shuffle(rng);
    }

    let mut children = Vec::with_capacity(candidates.len());
    for pair in order.chunks(2) {
        match *pair {
            [i, j] => {
                if rng.gen::<f64>() < crossover_rate {
                    let (a, b) = recombine(&mut *rng, i, &candidates[i], &candidates[j])?;
                    children.push(a);
                    children.push(b);
                } else {
                    children.push(candidates[i].clone());
                    children.push(candidates[j].clone());
                }
            }
            [i] => children.push(candidates[i].clone()),
            _ => {}
        }
    }
    Ok(children)
}

fn check_lengths(a: usize, b: usize) -> EvoResult<()> {
    if a == b {
        Ok(())
    } else {
        Err(EvolutionError::invalid_usage(format!(
            "crossover parents differ in length ({} and {})",
            a, b
        )))
    }
}

/// Build two numeric children coordinate by coordinate and clamp them
///
/// `combine` maps a coordinate index and the two parent values to the two child values.
fn numeric_children<C, F>(
    rng: &mut dyn RngCore,
    mom: &C,
    dad: &C,
    options: &Options,
    mut combine: F,
) -> EvoResult<(C, C)>
where
    C: Candidate,
    F: FnMut(&mut dyn RngCore, usize, f64, f64) -> EvoResult<(f64, f64)>,
{
    let (m, d) = (numeric_view(mom)?, numeric_view(dad)?);
    check_lengths(m.len(), d.len())?;

    let mut bro = mom.clone();
    let mut sis = dad.clone();
    {
        let bro_values = numeric_view_mut(&mut bro)?;
        let sis_values = numeric_view_mut(&mut sis)?;
        for (i, (&x, &y)) in m.iter().zip(d).enumerate() {
            let (b, s) = combine(&mut *rng, i, x, y)?;
            bro_values[i] = b;
            sis_values[i] = s;
        }
    }

    if let Some(bounder) = &options.bounder {
        bounder.bound_candidate(&mut bro)?;
        bounder.bound_candidate(&mut sis)?;
    }
    Ok((bro, sis))
}

/// N-point crossover for sequence candidates
///
/// Chooses `min(len - 1, num_crossover_points)` distinct cut points and produces two
/// children by alternating segments between the parents.
#[derive(Clone, Debug, Default)]
pub struct NPointCrossover;

impl<T: Clone> Variator<Vec<T>> for NPointCrossover {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[Vec<T>],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<Vec<T>>> {
        let num_points = options.num_crossover_points;
        crossover_pairs(rng, candidates, true, options.crossover_rate, |rng, _, mom, dad| {
            check_lengths(mom.len(), dad.len())?;
            let len = mom.len();
            let num_cuts = num_points.min(len.saturating_sub(1));

            let mut cuts: Vec<usize> = index::sample(rng, len.saturating_sub(1), num_cuts)
                .into_iter()
                .map(|c| c + 1)
                .collect();
            cuts.sort_unstable();

            let mut bro = mom.clone();
            let mut sis = dad.clone();
            let mut swapped = false;
            let mut next_cut = cuts.iter().peekable();
            for i in 0..len {
                while next_cut.next_if(|&&c| c == i).is_some() {
                    swapped = !swapped;
                }
                if swapped {
                    bro[i] = dad[i].clone();
                    sis[i] = mom[i].clone();
                }
            }
            Ok((bro, sis))
        })
    }
}

/// Uniform crossover for sequence candidates
///
/// Each position of the first child comes from the first parent with probability
/// `pux_bias`; the second child gets the complement.
#[derive(Clone, Debug, Default)]
pub struct UniformCrossover;

impl<T: Clone> Variator<Vec<T>> for UniformCrossover {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[Vec<T>],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<Vec<T>>> {
        let bias = options.pux_bias;
        crossover_pairs(rng, candidates, true, options.crossover_rate, |rng, _, mom, dad| {
            check_lengths(mom.len(), dad.len())?;
            let mut bro = mom.clone();
            let mut sis = dad.clone();
            for i in 0..mom.len() {
                if rng.gen::<f64>() >= bias {
                    bro[i] = dad[i].clone();
                    sis[i] = mom[i].clone();
                }
            }
            Ok((bro, sis))
        })
    }
}

/// Blend crossover (BLX-α)
///
/// Each child coordinate is drawn uniformly from the parents' range extended by
/// `blx_alpha` times its width on both sides.
#[derive(Clone, Debug, Default)]
pub struct BlendCrossover;

impl<C: Candidate> Variator<C> for BlendCrossover {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let alpha = options.blx_alpha;
        crossover_pairs(rng, candidates, true, options.crossover_rate, |rng, _, mom, dad| {
            numeric_children(rng, mom, dad, options, |rng, i, x, y| {
                let (lo, hi) = (x.min(y), x.max(y));
                let delta = alpha * (hi - lo);
                if !x.is_finite() || !y.is_finite() || !(hi + delta - (lo - delta)).is_finite() {
                    return Err(EvolutionError::invalid_usage(format!(
                        "blend crossover needs finite coordinates, got {} and {} at {}",
                        x, y, i
                    )));
                }
                Ok((
                    rng.gen_range(lo - delta..=hi + delta),
                    rng.gen_range(lo - delta..=hi + delta),
                ))
            })
        })
    }
}

/// Arithmetic crossover
///
/// Children are `α·a + (1−α)·b` and `(1−α)·a + α·b` with `α = ax_alpha`.
#[derive(Clone, Debug, Default)]
pub struct ArithmeticCrossover;

impl<C: Candidate> Variator<C> for ArithmeticCrossover {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let alpha = options.ax_alpha;
        crossover_pairs(rng, candidates, true, options.crossover_rate, |rng, _, mom, dad| {
            numeric_children(rng, mom, dad, options, |_, _, x, y| {
                Ok((
                    alpha * x + (1.0 - alpha) * y,
                    (1.0 - alpha) * x + alpha * y,
                ))
            })
        })
    }
}

/// Differential crossover
///
/// Pairs consecutive candidates without shuffling. Each child coordinate is
/// `d + φ·U·(m − d)` where `m` is the better parent and `d` the worse one.
///
/// The better parent is read from the context's `parent_fitness` hint; without it the
/// first candidate of each pair is taken as the better one.
#[derive(Clone, Debug, Default)]
pub struct DifferentialCrossover;

impl<C: Candidate> Variator<C> for DifferentialCrossover {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let phi = options.differential_phi;
        let fitness = context
            .parent_fitness
            .filter(|f| f.len() == candidates.len());

        crossover_pairs(rng, candidates, false, options.crossover_rate, |rng, i, first, second| {
            let first_is_better = match fitness {
                Some(f) => f[i].compare(&f[i + 1], context.maximize)? != Some(Ordering::Less),
                None => true,
            };
            let (m, d) = if first_is_better {
                (first, second)
            } else {
                (second, first)
            };
            numeric_children(rng, d, m, options, |rng, _, d, m| {
                Ok((
                    d + phi * rng.gen::<f64>() * (m - d),
                    d + phi * rng.gen::<f64>() * (m - d),
                ))
            })
        })
    }
}

/// Simulated binary crossover (SBX)
///
/// Children are placed symmetrically around the parents' midpoint with a spread drawn
/// from a polynomial distribution of index `sbx_etac`. With a bounder in the options the
/// spread is limited by the distance to the bounds. Coordinates where both parents agree
/// are left unchanged.
///
/// Reference: Deb, K., & Agrawal, R. B. (1995). Simulated Binary Crossover
/// for Continuous Search Space.
#[derive(Clone, Debug, Default)]
pub struct SimulatedBinaryCrossover;

impl SimulatedBinaryCrossover {
    /// Spread factor β from a uniform random value
    fn spread_factor(u: f64, eta: f64) -> f64 {
        if u <= 0.5 {
            (2.0 * u).powf(1.0 / (eta + 1.0))
        } else {
            (1.0 / (2.0 * (1.0 - u))).powf(1.0 / (eta + 1.0))
        }
    }

    /// Spread factor limited by the distance of the parents `m <= d` to `[lower, upper]`
    fn bounded_spread_factor(u: f64, eta: f64, m: f64, d: f64, lower: f64, upper: f64) -> f64 {
        let beta = 1.0 + 2.0 * (m - lower).min(upper - d) / (d - m);
        let alpha = 2.0 - 1.0 / beta.powf(eta + 1.0);
        if u <= 1.0 / alpha {
            (u * alpha).powf(1.0 / (eta + 1.0))
        } else {
            (1.0 / (2.0 - u * alpha)).powf(1.0 / (eta + 1.0))
        }
    }
}

impl<C: Candidate> Variator<C> for SimulatedBinaryCrossover {
    fn vary(
        &self,
        rng: &mut dyn RngCore,
        candidates: &[C],
        _context: &VariationContext<'_>,
        options: &Options,
    ) -> EvoResult<Vec<C>> {
        let eta = options.sbx_etac;
        crossover_pairs(rng, candidates, true, options.crossover_rate, |rng, _, mom, dad| {
            numeric_children(rng, mom, dad, options, |rng, i, x, y| {
                if x == y {
                    return Ok((x, y));
                }
                let (m, d) = (x.min(y), x.max(y));
                let u = rng.gen::<f64>();
                let beta = match &options.bounder {
                    Some(bounder) => {
                        let interval = bounder.interval(i)?;
                        Self::bounded_spread_factor(u, eta, m, d, interval.lower, interval.upper)
                    }
                    None => Self::spread_factor(u, eta),
                };

                let bro = 0.5 * ((m + d) - beta * (d - m));
                let sis = 0.5 * ((m + d) + beta * (d - m));
                if rng.gen_bool(0.5) {
                    Ok((sis, bro))
                } else {
                    Ok((bro, sis))
                }
            })
        })
    }
}
