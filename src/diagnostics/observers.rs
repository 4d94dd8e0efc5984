//! Observers
//!
//! Observers are invoked once for the initial population and then after every
//! generation, with the population sorted best-first.

use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::diagnostics::GenerationStats;
use crate::error::EvoResult;
use crate::options::Options;
use crate::termination::EvolutionState;

/// Observer trait
pub trait Observer<C> {
    /// Observe the state after a generation
    fn observe(&mut self, state: &EvolutionState<'_, C>, options: &Options) -> EvoResult<()>;
}

impl<C, F> Observer<C> for F
where
    F: FnMut(&EvolutionState<'_, C>, &Options) -> EvoResult<()>,
{
    fn observe(&mut self, state: &EvolutionState<'_, C>, options: &Options) -> EvoResult<()> {
        self(state, options)
    }
}

/// Observer that does nothing
#[derive(Clone, Debug, Default)]
pub struct DefaultObserver;

impl<C> Observer<C> for DefaultObserver {
    fn observe(&mut self, _state: &EvolutionState<'_, C>, _options: &Options) -> EvoResult<()> {
        Ok(())
    }
}

/// Observer that reports generation statistics through `tracing`
#[derive(Clone, Debug, Default)]
pub struct LoggingObserver {
    individuals: bool,
}

impl LoggingObserver {
    /// Report statistics only
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report every individual at debug level
    pub fn with_individuals(mut self) -> Self {
        self.individuals = true;
        self
    }
}

impl<C: Debug> Observer<C> for LoggingObserver {
    fn observe(&mut self, state: &EvolutionState<'_, C>, _options: &Options) -> EvoResult<()> {
        let stats = GenerationStats::from_population(state.population, state.num_generations);
        let best = state
            .population
            .best()
            .and_then(|b| b.fitness.as_ref())
            .map(|f| f.to_string())
            .unwrap_or_default();

        info!(
            generation = stats.generation,
            evaluations = state.num_evaluations,
            pop_size = stats.pop_size,
            best = %best,
            worst = stats.worst,
            median = stats.median,
            average = stats.average,
            stdev = stats.stdev,
            archive_size = state.archive.len(),
            "generation statistics"
        );

        if self.individuals {
            for (id, individual) in state.population.iter().enumerate() {
                debug!(
                    generation = state.num_generations,
                    id,
                    fitness = ?individual.fitness,
                    candidate = ?individual.candidate,
                    "individual"
                );
            }
        }
        Ok(())
    }
}

/// One row of the individuals file
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndividualRecord {
    /// Generation number
    pub generation: usize,
    /// Position in the best-first population
    pub id: usize,
    /// Rendered fitness
    pub fitness: String,
    /// Rendered candidate
    pub candidate: String,
}

/// Observer that writes CSV statistics and individuals files
///
/// The statistics file has the columns `generation, pop_size, worst, best, median,
/// average, stdev`; the individuals file `generation, id, fitness, candidate`. Both are
/// flushed after every generation.
#[derive(Debug)]
pub struct FileObserver<W: Write = File> {
    statistics: csv::Writer<W>,
    individuals: csv::Writer<W>,
}

impl FileObserver<File> {
    /// Create (or truncate) the two files
    pub fn create(
        statistics_path: impl AsRef<Path>,
        individuals_path: impl AsRef<Path>,
    ) -> EvoResult<Self> {
        Ok(Self::new(
            File::create(statistics_path)?,
            File::create(individuals_path)?,
        ))
    }
}

impl<W: Write> FileObserver<W> {
    /// Write to arbitrary sinks
    pub fn new(statistics: W, individuals: W) -> Self {
        Self {
            statistics: csv::Writer::from_writer(statistics),
            individuals: csv::Writer::from_writer(individuals),
        }
    }

    /// Flush and return the underlying sinks
    pub fn into_inner(self) -> EvoResult<(W, W)> {
        let statistics = self
            .statistics
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        let individuals = self
            .individuals
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        Ok((statistics, individuals))
    }
}

impl<C: Debug, W: Write> Observer<C> for FileObserver<W> {
    fn observe(&mut self, state: &EvolutionState<'_, C>, _options: &Options) -> EvoResult<()> {
        let generation = state.num_generations;
        self.statistics
            .serialize(GenerationStats::from_population(state.population, generation))?;
        self.statistics.flush()?;

        for (id, individual) in state.population.iter().enumerate() {
            self.individuals.serialize(IndividualRecord {
                generation,
                id,
                fitness: individual
                    .fitness
                    .as_ref()
                    .map(|f| f.to_string())
                    .unwrap_or_default(),
                candidate: format!("{:?}", individual.candidate),
            })?;
        }
        self.individuals.flush()?;
        Ok(())
    }
}
