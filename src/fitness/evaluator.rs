//! Evaluators
//!
//! An evaluator maps a batch of candidates to their fitness values, preserving order.
//! The engine calls it once on the initial population and once per generation on the
//! offspring; these calls are the only place where parallelism may be interposed.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::EvoResult;
use crate::fitness::traits::Fitness;
use crate::options::Options;

/// Batch fitness evaluation
pub trait Evaluator<C> {
    /// Evaluate every candidate, returning one fitness per candidate in input order
    fn evaluate(&self, candidates: &[C], options: &Options) -> EvoResult<Vec<Fitness>>;
}

impl<C, F> Evaluator<C> for F
where
    F: Fn(&[C], &Options) -> Vec<Fitness>,
{
    fn evaluate(&self, candidates: &[C], options: &Options) -> EvoResult<Vec<Fitness>> {
        Ok(self(candidates, options))
    }
}

/// Evaluator built from a per-candidate function
pub struct FnEvaluator<F> {
    f: F,
}

impl<F> FnEvaluator<F> {
    /// Create a new function-based evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<C, F> Evaluator<C> for FnEvaluator<F>
where
    F: Fn(&C) -> Fitness,
{
    fn evaluate(&self, candidates: &[C], _options: &Options) -> EvoResult<Vec<Fitness>> {
        Ok(candidates.iter().map(&self.f).collect())
    }
}

/// Evaluator that spreads a per-candidate function over the rayon thread pool
///
/// Results are collected in input order.
#[cfg(feature = "parallel")]
pub struct ParallelEvaluator<F> {
    f: F,
}

#[cfg(feature = "parallel")]
impl<F> ParallelEvaluator<F> {
    /// Create a new parallel evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[cfg(feature = "parallel")]
impl<C, F> Evaluator<C> for ParallelEvaluator<F>
where
    C: Sync,
    F: Fn(&C) -> Fitness + Sync + Send,
{
    fn evaluate(&self, candidates: &[C], _options: &Options) -> EvoResult<Vec<Fitness>> {
        Ok(candidates.par_iter().map(|c| (self.f)(c)).collect())
    }
}
