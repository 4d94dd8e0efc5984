//! Evolutionary operators
//!
//! This module provides the operator roles of the evolve loop and their built-in
//! variants: selection, variation (crossover, mutation, estimation of distribution),
//! replacement, archiving and migration.

pub mod archive;
pub mod crossover;
pub mod estimation;
pub mod migration;
pub mod mutation;
pub mod pareto;
pub mod replacement;
pub mod selection;
pub mod traits;

pub mod prelude {
    pub use super::archive::*;
    pub use super::crossover::*;
    pub use super::estimation::*;
    pub use super::migration::*;
    pub use super::mutation::*;
    pub use super::pareto::*;
    pub use super::replacement::*;
    pub use super::selection::*;
    pub use super::traits::*;
}
