//! Fitness values and evaluation
//!
//! This module provides the scalar/Pareto fitness value and the evaluator abstraction.

pub mod evaluator;
pub mod traits;

pub mod prelude {
    pub use super::evaluator::*;
    pub use super::traits::*;
}
