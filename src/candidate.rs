//! Candidate solutions and generators
//!
//! The engine treats candidates as opaque values. The [`Candidate`] trait only exposes
//! an optional numeric view, used by bounders, distance measures and numeric statistics.

use std::fmt::Debug;

use rand::{Rng, RngCore};

use crate::bounder::Bounder;
use crate::error::{EvoResult, EvolutionError};
use crate::options::Options;

/// A user-shaped solution value
///
/// Candidates must be cloneable (offspring are always built from deep copies of their
/// parents) and comparable for equality (archives refuse duplicates).
pub trait Candidate: Clone + Debug + PartialEq + 'static {
    /// Numeric view of the candidate, if it has one
    fn as_reals(&self) -> Option<&[f64]> {
        None
    }

    /// Mutable numeric view of the candidate, if it has one
    fn as_reals_mut(&mut self) -> Option<&mut [f64]> {
        None
    }

    /// Distance between two candidates
    ///
    /// Defaults to the coordinate-wise absolute difference over the numeric view,
    /// and 0.0 for candidates without one.
    fn distance(&self, other: &Self) -> f64 {
        match (self.as_reals(), other.as_reals()) {
            (Some(a), Some(b)) => manhattan(a, b),
            _ => 0.0,
        }
    }
}

impl Candidate for Vec<f64> {
    fn as_reals(&self) -> Option<&[f64]> {
        Some(self)
    }

    fn as_reals_mut(&mut self) -> Option<&mut [f64]> {
        Some(self)
    }
}

impl Candidate for f64 {
    fn as_reals(&self) -> Option<&[f64]> {
        Some(std::slice::from_ref(self))
    }

    fn as_reals_mut(&mut self) -> Option<&mut [f64]> {
        Some(std::slice::from_mut(self))
    }
}

impl Candidate for Vec<bool> {
    /// Hamming distance
    fn distance(&self, other: &Self) -> f64 {
        let differing = self.iter().zip(other).filter(|(a, b)| a != b).count();
        (differing + self.len().abs_diff(other.len())) as f64
    }
}

impl Candidate for Vec<i64> {
    fn distance(&self, other: &Self) -> f64 {
        self.iter()
            .zip(other)
            .map(|(a, b)| (a - b).unsigned_abs() as f64)
            .sum()
    }
}

impl Candidate for Vec<usize> {
    fn distance(&self, other: &Self) -> f64 {
        self.iter()
            .zip(other)
            .map(|(a, b)| a.abs_diff(*b) as f64)
            .sum()
    }
}

/// Numeric view of a candidate, for operators that only work on real vectors
pub fn numeric_view<C: Candidate>(candidate: &C) -> EvoResult<&[f64]> {
    candidate
        .as_reals()
        .ok_or_else(|| EvolutionError::invalid_usage("operator requires numeric candidates"))
}

/// Mutable numeric view of a candidate
pub fn numeric_view_mut<C: Candidate>(candidate: &mut C) -> EvoResult<&mut [f64]> {
    candidate
        .as_reals_mut()
        .ok_or_else(|| EvolutionError::invalid_usage("operator requires numeric candidates"))
}

/// Sum of coordinate-wise absolute differences
pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Euclidean distance
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Produces new candidates for the initial population
pub trait Generator<C> {
    /// Generate one candidate
    fn generate(&self, rng: &mut dyn RngCore, options: &Options) -> EvoResult<C>;
}

impl<C, F> Generator<C> for F
where
    F: Fn(&mut dyn RngCore, &Options) -> C,
{
    fn generate(&self, rng: &mut dyn RngCore, options: &Options) -> EvoResult<C> {
        Ok(self(rng, options))
    }
}

/// Uniformly distributed real vectors within a bounder
#[derive(Clone, Debug)]
pub struct UniformReals {
    /// Number of coordinates
    pub dimension: usize,
    /// Sampling intervals
    pub bounder: Bounder,
}

impl UniformReals {
    /// Create a generator for `dimension` coordinates within `bounder`
    pub fn new(dimension: usize, bounder: Bounder) -> Self {
        Self { dimension, bounder }
    }

    /// Create a generator with the same interval on every coordinate
    pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Self {
        Self::new(dimension, Bounder::uniform(lower, upper))
    }
}

impl Generator<Vec<f64>> for UniformReals {
    fn generate(&self, rng: &mut dyn RngCore, _options: &Options) -> EvoResult<Vec<f64>> {
        (0..self.dimension)
            .map(|i| {
                let interval = self.bounder.interval(i)?;
                Ok(rng.gen_range(interval.lower..=interval.upper))
            })
            .collect()
    }
}

/// Uniformly random bit strings
#[derive(Clone, Debug)]
pub struct RandomBits {
    /// Number of bits
    pub length: usize,
}

impl RandomBits {
    /// Create a generator for bit strings of `length` bits
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Generator<Vec<bool>> for RandomBits {
    fn generate(&self, rng: &mut dyn RngCore, _options: &Options) -> EvoResult<Vec<bool>> {
        Ok((0..self.length).map(|_| rng.gen_bool(0.5)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_real_vector_numeric_view() {
        let mut c = vec![1.0, 2.0];
        assert_eq!(c.as_reals(), Some(&[1.0, 2.0][..]));
        c.as_reals_mut().unwrap()[0] = 5.0;
        assert_eq!(c, vec![5.0, 2.0]);
    }

    #[test]
    fn test_bits_have_no_numeric_view() {
        let c = vec![true, false];
        assert!(c.as_reals().is_none());
    }

    #[test]
    fn test_default_distance_is_manhattan() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, -4.0];
        assert_eq!(a.distance(&b), 7.0);
        assert_eq!(euclidean(&a, &b), 5.0);
    }

    #[test]
    fn test_numeric_view_rejects_bits() {
        assert!(numeric_view(&vec![1.0]).is_ok());
        assert!(matches!(
            numeric_view(&vec![true]),
            Err(EvolutionError::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_hamming_distance() {
        let a = vec![true, true, false, false];
        let b = vec![true, false, true, false];
        assert_eq!(a.distance(&b), 2.0);
    }

    #[test]
    fn test_uniform_reals_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let generator = UniformReals::uniform(5, -1.0, 1.0);
        let options = Options::default();
        for _ in 0..100 {
            let c = generator.generate(&mut rng, &options).unwrap();
            assert_eq!(c.len(), 5);
            assert!(c.iter().all(|x| (-1.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_uniform_reals_wider_than_bounder_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let generator = UniformReals::new(3, Bounder::from_bounds(&[0.0], &[1.0]));
        assert!(generator.generate(&mut rng, &Options::default()).is_err());
    }

    #[test]
    fn test_closure_generator() {
        let mut rng = StdRng::seed_from_u64(1);
        let generator = |rng: &mut dyn RngCore, _: &Options| -> Vec<bool> {
            (0..8).map(|_| rng.gen_bool(0.5)).collect()
        };
        let c = generator.generate(&mut rng, &Options::default()).unwrap();
        assert_eq!(c.len(), 8);
    }
}
