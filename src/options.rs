//! Shared run options
//!
//! [`Options`] is the record of recognised keys passed by reference to every operator
//! invocation. It is the only channel operators share beyond the engine interfaces;
//! the one-fifth rule of [`PlusReplacer`](crate::operators::replacement::PlusReplacer)
//! is the only built-in operator that writes to it.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bounder::Bounder;
use crate::error::EvoResult;

/// Options shared by all operators of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Number of parents chosen by a selector (default: population size)
    pub num_selected: Option<usize>,
    /// Tournament size
    pub tourn_size: usize,
    /// Probability that a pair of parents is recombined
    pub crossover_rate: f64,
    /// Number of cut points for n-point crossover
    pub num_crossover_points: usize,
    /// Probability that a child takes the first parent's element in uniform crossover
    pub pux_bias: f64,
    /// Range extension factor for blend crossover
    pub blx_alpha: f64,
    /// Weight of the first parent in arithmetic crossover
    pub ax_alpha: f64,
    /// Step factor for differential crossover
    pub differential_phi: f64,
    /// Distribution index for simulated binary crossover
    pub sbx_etac: f64,
    /// Per-position mutation probability; `None` disables the one-fifth rule
    pub mutation_rate: Option<f64>,
    /// Decay exponent `s` of non-uniform mutation
    pub mutation_range: f64,
    /// Mean of Gaussian mutation noise
    pub mean: f64,
    /// Standard deviation of Gaussian mutation noise
    pub stdev: f64,
    /// Evaluation budget (default: population size)
    pub max_evaluations: Option<usize>,
    /// Generation budget (default: 1)
    pub max_generations: Option<usize>,
    /// Wall-clock budget
    pub max_time: Option<Duration>,
    /// Diversity threshold for the diversity terminator
    pub min_diversity: f64,
    /// Fitness spread threshold for the average-fitness terminator
    pub min_fitness_diff: f64,
    /// Number of elites kept by generational and random replacement
    pub num_elites: usize,
    /// Adapt `mutation_rate` from offspring survival in plus replacement
    pub use_one_fifth_rule: bool,
    /// Number of population members compared in crowding replacement
    pub crowding_distance: usize,
    /// Capacity of the adaptive-grid archive
    pub max_archive_size: usize,
    /// Number of recursive grid levels in the adaptive-grid archive
    pub num_grid_divisions: usize,
    /// Re-evaluate incoming migrants
    pub evaluate_migrant: bool,
    /// Number of candidates sampled by the estimation-of-distribution variator
    /// (default: population size)
    pub num_offspring: Option<usize>,
    /// Initial temperature of simulated-annealing replacement
    pub temperature: f64,
    /// Clamp applied by numeric variators
    pub bounder: Option<Bounder>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            num_selected: None,
            tourn_size: 2,
            crossover_rate: 1.0,
            num_crossover_points: 1,
            pux_bias: 0.5,
            blx_alpha: 0.1,
            ax_alpha: 0.5,
            differential_phi: 0.1,
            sbx_etac: 10.0,
            mutation_rate: Some(0.1),
            mutation_range: 1.0,
            mean: 0.0,
            stdev: 1.0,
            max_evaluations: None,
            max_generations: None,
            max_time: None,
            min_diversity: 0.001,
            min_fitness_diff: 0.001,
            num_elites: 0,
            use_one_fifth_rule: false,
            crowding_distance: 2,
            max_archive_size: 100,
            num_grid_divisions: 6,
            evaluate_migrant: false,
            num_offspring: None,
            temperature: 1.0,
            bounder: None,
        }
    }
}

impl Options {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document; missing keys take their defaults
    pub fn from_json_str(json: &str) -> EvoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> EvoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Mutation rate in effect (0.1 when unset)
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate.unwrap_or(0.1)
    }

    /// Set the number of selected parents
    pub fn with_num_selected(mut self, num_selected: usize) -> Self {
        self.num_selected = Some(num_selected);
        self
    }

    /// Set the tournament size
    pub fn with_tourn_size(mut self, tourn_size: usize) -> Self {
        self.tourn_size = tourn_size;
        self
    }

    /// Set the crossover rate
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Set the number of n-point crossover cut points
    pub fn with_num_crossover_points(mut self, points: usize) -> Self {
        self.num_crossover_points = points;
        self
    }

    /// Set the uniform crossover bias
    pub fn with_pux_bias(mut self, bias: f64) -> Self {
        self.pux_bias = bias;
        self
    }

    /// Set the blend crossover alpha
    pub fn with_blx_alpha(mut self, alpha: f64) -> Self {
        self.blx_alpha = alpha;
        self
    }

    /// Set the arithmetic crossover weight
    pub fn with_ax_alpha(mut self, alpha: f64) -> Self {
        self.ax_alpha = alpha;
        self
    }

    /// Set the differential crossover phi
    pub fn with_differential_phi(mut self, phi: f64) -> Self {
        self.differential_phi = phi;
        self
    }

    /// Set the SBX distribution index
    pub fn with_sbx_etac(mut self, etac: f64) -> Self {
        self.sbx_etac = etac;
        self
    }

    /// Set the mutation rate
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = Some(rate);
        self
    }

    /// Clear the mutation rate (mutations fall back to 0.1, the one-fifth rule is disabled)
    pub fn without_mutation_rate(mut self) -> Self {
        self.mutation_rate = None;
        self
    }

    /// Set the non-uniform mutation decay exponent
    pub fn with_mutation_range(mut self, range: f64) -> Self {
        self.mutation_range = range;
        self
    }

    /// Set the Gaussian mutation mean
    pub fn with_mean(mut self, mean: f64) -> Self {
        self.mean = mean;
        self
    }

    /// Set the Gaussian mutation standard deviation
    pub fn with_stdev(mut self, stdev: f64) -> Self {
        self.stdev = stdev;
        self
    }

    /// Set the evaluation budget
    pub fn with_max_evaluations(mut self, max: usize) -> Self {
        self.max_evaluations = Some(max);
        self
    }

    /// Set the generation budget
    pub fn with_max_generations(mut self, max: usize) -> Self {
        self.max_generations = Some(max);
        self
    }

    /// Set the wall-clock budget
    pub fn with_max_time(mut self, max: Duration) -> Self {
        self.max_time = Some(max);
        self
    }

    /// Set the diversity threshold
    pub fn with_min_diversity(mut self, min: f64) -> Self {
        self.min_diversity = min;
        self
    }

    /// Set the average-fitness threshold
    pub fn with_min_fitness_diff(mut self, min: f64) -> Self {
        self.min_fitness_diff = min;
        self
    }

    /// Set the number of elites
    pub fn with_num_elites(mut self, num_elites: usize) -> Self {
        self.num_elites = num_elites;
        self
    }

    /// Enable or disable the one-fifth rule
    pub fn with_one_fifth_rule(mut self, enabled: bool) -> Self {
        self.use_one_fifth_rule = enabled;
        self
    }

    /// Set the crowding replacement sample size
    pub fn with_crowding_distance(mut self, distance: usize) -> Self {
        self.crowding_distance = distance;
        self
    }

    /// Set the adaptive-grid archive capacity
    pub fn with_max_archive_size(mut self, size: usize) -> Self {
        self.max_archive_size = size;
        self
    }

    /// Set the number of adaptive-grid levels
    pub fn with_num_grid_divisions(mut self, divisions: usize) -> Self {
        self.num_grid_divisions = divisions;
        self
    }

    /// Enable or disable migrant re-evaluation
    pub fn with_evaluate_migrant(mut self, enabled: bool) -> Self {
        self.evaluate_migrant = enabled;
        self
    }

    /// Set the number of EDA offspring
    pub fn with_num_offspring(mut self, num_offspring: usize) -> Self {
        self.num_offspring = Some(num_offspring);
        self
    }

    /// Set the initial annealing temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the bounder used by numeric variators
    pub fn with_bounder(mut self, bounder: Bounder) -> Self {
        self.bounder = Some(bounder);
        self
    }
}
