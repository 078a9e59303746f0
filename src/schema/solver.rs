//! Genetic solver configuration, progress reporting and error types.

use serde::{Deserialize, Serialize};

/// Genetic solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Number of individuals per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Generation budget used by the CLI.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Stop once the best fitness is within this distance of zero.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Probability that a child gets one tray perturbed.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Probability of adding a tray to a randomly chosen gene.
    /// Only used when `max_elements_per_gene > 1`.
    #[serde(default = "default_element_count_rate")]
    pub mutation_rate_elements_up: f64,
    /// Probability of removing a tray from a randomly chosen gene.
    /// Only used when `max_elements_per_gene > 1`.
    #[serde(default = "default_element_count_rate")]
    pub mutation_rate_elements_down: f64,
    /// Weight of the surplus tray count.
    #[serde(default)]
    pub number_of_elements_factor: f64,
    /// Weight of the space left empty.
    #[serde(default = "default_unused_space_factor")]
    pub unused_space_factor: f64,
    /// Weight of trays smaller than their class footprint.
    #[serde(default = "default_penalty_factor")]
    pub unfit_factor: f64,
    /// Weight of trays occupying the same space.
    #[serde(default = "default_penalty_factor")]
    pub overlap_factor: f64,
    /// Weight of trays sticking out of the box.
    #[serde(default = "default_penalty_factor")]
    pub overfit_factor: f64,
    /// Upper bound on trays per gene.
    #[serde(default = "default_max_elements_per_gene")]
    pub max_elements_per_gene: usize,
    /// Range of the blend factor used by crossover.
    #[serde(default = "default_alpha_range")]
    pub alpha_range: (f64, f64),
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            max_generations: default_max_generations(),
            tolerance: default_tolerance(),
            mutation_rate: default_mutation_rate(),
            mutation_rate_elements_up: default_element_count_rate(),
            mutation_rate_elements_down: default_element_count_rate(),
            number_of_elements_factor: 0.0,
            unused_space_factor: default_unused_space_factor(),
            unfit_factor: default_penalty_factor(),
            overlap_factor: default_penalty_factor(),
            overfit_factor: default_penalty_factor(),
            max_elements_per_gene: default_max_elements_per_gene(),
            alpha_range: default_alpha_range(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    200
}
fn default_max_generations() -> usize {
    2000
}
fn default_tolerance() -> f64 {
    0.001
}
fn default_mutation_rate() -> f64 {
    0.25
}
fn default_element_count_rate() -> f64 {
    0.1
}
fn default_unused_space_factor() -> f64 {
    1.0
}
fn default_penalty_factor() -> f64 {
    10.0
}
fn default_max_elements_per_gene() -> usize {
    1
}
fn default_alpha_range() -> (f64, f64) {
    (-0.05, 1.05)
}

impl SolverConfig {
    /// Number of individuals carried over unchanged each generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size * 6 / 100).max(1)
    }

    /// Number of individuals competing in each tournament.
    pub fn tournament_size(&self) -> usize {
        (self.population_size / 100).max(4)
    }

    /// Validate solver parameters.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        if self.population_size < 2 {
            return Err(SolverConfigError::PopulationTooSmall);
        }

        let check_rate = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SolverConfigError::InvalidRate { name, value })
            }
        };
        check_rate(self.mutation_rate, "mutation_rate")?;
        check_rate(self.mutation_rate_elements_up, "mutation_rate_elements_up")?;
        check_rate(
            self.mutation_rate_elements_down,
            "mutation_rate_elements_down",
        )?;

        let check_factor = |value: f64, name: &'static str| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(SolverConfigError::InvalidFactor { name, value })
            }
        };
        check_factor(self.number_of_elements_factor, "number_of_elements_factor")?;
        check_factor(self.unused_space_factor, "unused_space_factor")?;
        check_factor(self.unfit_factor, "unfit_factor")?;
        check_factor(self.overlap_factor, "overlap_factor")?;
        check_factor(self.overfit_factor, "overfit_factor")?;

        if self.max_elements_per_gene == 0 {
            return Err(SolverConfigError::ZeroMaxElements);
        }

        let (lo, hi) = self.alpha_range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(SolverConfigError::InvalidAlphaRange { min: lo, max: hi });
        }

        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(SolverConfigError::InvalidTolerance(self.tolerance));
        }

        Ok(())
    }
}

/// Progress of a running solve, reported once per generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverProgress {
    /// Zero-based generation index.
    pub generation: usize,
    /// Generation budget of this solve.
    pub max_generations: usize,
    /// Fitness of the best individual.
    pub best_fitness: f64,
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Standard deviation of the population's fitness.
    pub fitness_std: f64,
}

/// Per-generation fitness history.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FitnessHistory {
    pub best_fitness: Vec<f64>,
    pub mean_fitness: Vec<f64>,
    pub fitness_std: Vec<f64>,
}

/// Statistics from a solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStats {
    /// Generations run.
    pub generations: usize,
    /// Fitness of the returned individual.
    pub best_fitness: f64,
    /// Mean fitness of the final population.
    pub final_mean_fitness: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason a solve stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Best fitness came within tolerance of zero.
    ToleranceReached,
    /// Generation budget exhausted.
    MaxGenerations,
}

/// Solver configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SolverConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("{name} must be a non-negative number, got {value}")]
    InvalidFactor { name: &'static str, value: f64 },
    #[error("Max elements per gene must be at least 1")]
    ZeroMaxElements,
    #[error("Invalid alpha range: min ({min}) > max ({max})")]
    InvalidAlphaRange { min: f64, max: f64 },
    #[error("Tolerance must be non-negative, got {0}")]
    InvalidTolerance(f64),
}

/// Errors raised by the genetic solver.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid solver config: {0}")]
    Config(#[from] SolverConfigError),
    #[error("Box dimensions must be positive")]
    InvalidBoxDimensions,
    #[error("Box volume does not fit in a 64-bit integer")]
    BoxTooLarge,
    #[error("Box has no item classes to place")]
    NoItemClasses,
    #[error("Smallest layer extent is {0}; at least 2 is needed to seed trays")]
    LayerTooThin(i64),
    #[error("Population is empty; generate it before solving")]
    EmptyPopulation,
    #[error("Solve needs at least one generation")]
    NoGenerations,
}
