//! Evolutionary algorithms
//!
//! This module provides the evolution engine and presets that install a classic
//! combination of operators on an [`EngineBuilder`](engine::EngineBuilder).

pub mod differential_evolution;
pub mod engine;
pub mod estimation_of_distribution;
pub mod evolution_strategy;
pub mod nsga2;
pub mod paes;
pub mod simple_ga;
pub mod simulated_annealing;

pub mod prelude {
    pub use super::differential_evolution::*;
    pub use super::engine::*;
    pub use super::estimation_of_distribution::*;
    pub use super::evolution_strategy::*;
    pub use super::nsga2::*;
    pub use super::paes::*;
    pub use super::simple_ga::*;
    pub use super::simulated_annealing::*;
}
