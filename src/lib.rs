//! # evocomp
//!
//! An operator-composition framework for evolutionary computation.
//!
//! A run is driven by an [`Engine`](algorithms::engine::Engine) that repeats
//! selection, variation, evaluation, replacement, migration and archiving until one of
//! its terminators fires. Every role is a trait with built-in variants, and any
//! combination of operators can be installed on an
//! [`EngineBuilder`](algorithms::engine::EngineBuilder).
//!
//! ## Core Concepts
//!
//! - **Candidates**: user-shaped solution values; numeric operators reach them through
//!   the [`Candidate`](candidate::Candidate) numeric view
//! - **Fitness**: either a scalar or a Pareto vector, ordered by dominance
//! - **Single random source**: every stochastic decision draws from the engine's RNG, so a
//!   seed reproduces a run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evocomp::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let sphere = FnEvaluator::new(|x: &Vec<f64>| Fitness::Scalar(x.iter().map(|v| v * v).sum()));
//! let options = Options::default()
//!     .with_max_evaluations(30_000)
//!     .with_bounder(Bounder::uniform(-5.12, 5.12));
//!
//! let mut engine = EngineBuilder::new(StdRng::seed_from_u64(1234))
//!     .selector(TournamentSelector)
//!     .variator(UniformCrossover)
//!     .variator(GaussianMutation)
//!     .replacer(GenerationalReplacer)
//!     .terminator(EvaluationTermination)
//!     .build();
//!
//! let population = engine.evolve(
//!     &UniformReals::uniform(3, -5.12, 5.12),
//!     &sphere,
//!     100,
//!     vec![],
//!     false,
//!     options,
//! )?;
//! ```

pub mod algorithms;
pub mod bounder;
pub mod candidate;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod operators;
pub mod options;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::bounder::*;
    pub use crate::candidate::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::options::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
