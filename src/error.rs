//! Error types for evocomp
//!
//! This module defines all error types surfaced by the engine and the built-in operators.

use thiserror::Error;

/// Top-level error type for evolution operations
///
/// Errors are fatal: the engine aborts the current run and keeps the last fully
/// formed population.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// An operator was used in a setting it does not support
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// The evaluator returned a different number of fitness values than candidates
    #[error("Evaluator mismatch: expected {expected} fitness values, got {actual}")]
    EvaluatorMismatch { expected: usize, actual: usize },

    /// A comparison or selection touched an individual without fitness
    #[error("Individual has not been evaluated")]
    UnevaluatedIndividual,

    /// A bounder was consulted on a dimension outside its declared width
    #[error("Bounds mismatch: dimension {index} is outside the bounder width {width}")]
    BoundsMismatch { index: usize, width: usize },

    /// Missing or invalid option for an operator that needs it
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Operation needs at least one individual
    #[error("Empty population")]
    EmptyPopulation,

    /// IO error while writing observer output or reading options
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error in a file observer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Options could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EvolutionError {
    /// Shorthand for an [`EvolutionError::InvalidUsage`] error
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage(message.into())
    }

    /// Shorthand for an [`EvolutionError::Configuration`] error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
