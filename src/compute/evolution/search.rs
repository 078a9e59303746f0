//! The genetic solver driving the search for a tray layout.

use std::time::Instant;

use log::{debug, info, trace, warn};
use rayon::prelude::*;

use super::{FitnessEvaluator, FitnessWeights, TrayRng};
use crate::compute::{GameBox, Individual, ItemClass};
use crate::schema::{
    Extent3, FitnessHistory, SolveStats, SolverConfig, SolverConfigError, SolverError,
    SolverProgress, StopReason,
};

/// Outcome of a completed solve.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Fittest individual of the final population.
    pub best: Individual,
    pub stats: SolveStats,
    pub history: FitnessHistory,
}

/// Genetic algorithm that evolves tray layouts for one box.
pub struct GeneticSolver {
    config: SolverConfig,
    layer_size: Extent3,
    item_classes: Vec<ItemClass>,
    evaluator: FitnessEvaluator,
    rng: TrayRng,
    population: Vec<Individual>,
}

impl GeneticSolver {
    /// Create a solver for `game_box`.
    ///
    /// Fails when the config is invalid, the box has a non-positive dimension,
    /// a volume beyond `i64` or no items, or a layer is too thin to seed
    /// random trays in.
    pub fn new(game_box: &GameBox, config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;

        let (length, width, height) = game_box.dimensions();
        if length <= 0 || width <= 0 || height <= 0 {
            return Err(SolverError::InvalidBoxDimensions);
        }
        if game_box.volume().is_none() {
            return Err(SolverError::BoxTooLarge);
        }

        let item_classes = game_box.item_classes();
        if item_classes.is_empty() {
            return Err(SolverError::NoItemClasses);
        }

        let layer_size = game_box.layer_size(1);
        let thinnest = layer_size.0.min(layer_size.1).min(layer_size.2);
        if thinnest < 2 {
            return Err(SolverError::LayerTooThin(thinnest));
        }

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let rng = TrayRng::new(seed);
        let evaluator =
            FitnessEvaluator::new(game_box, &item_classes, FitnessWeights::from(&config));

        debug!(
            "Solver for {}x{}x{} box with {} item classes, seed {}",
            length,
            width,
            height,
            item_classes.len(),
            seed
        );

        Ok(Self {
            config,
            layer_size,
            item_classes,
            evaluator,
            rng,
            population: Vec::new(),
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Item classes in catalog order; gene `i` places class `i`.
    pub fn item_classes(&self) -> &[ItemClass] {
        &self.item_classes
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Replace the population with `population_size` random individuals.
    pub fn generate_population(&mut self) {
        let gene_count = self.item_classes.len();
        let max_trays = self.config.max_elements_per_gene;
        let layer_size = self.layer_size;

        self.population = (0..self.config.population_size)
            .map(|_| self.rng.random_individual(gene_count, max_trays, layer_size))
            .collect();

        info!(
            "Generated {} individuals with {} genes each",
            self.population.len(),
            gene_count
        );
    }

    /// Fitness of `individual`, computed once and cached on it.
    pub fn compute_fitness(&self, individual: &mut Individual) -> f64 {
        self.evaluator.evaluate(individual)
    }

    fn evaluate_population(&mut self) {
        let evaluator = &self.evaluator;
        self.population.par_iter_mut().for_each(|individual| {
            evaluator.evaluate(individual);
        });
    }

    /// Advance one generation.
    ///
    /// The population is evaluated and ranked, the elite is carried over
    /// unchanged, and the rest is refilled with mutated offspring of
    /// tournament winners. Offspring are not evaluated yet.
    pub fn run_generation(&mut self) -> Result<&[Individual], SolverError> {
        if self.population.is_empty() {
            return Err(SolverError::EmptyPopulation);
        }

        self.evaluate_population();
        self.population
            .sort_by(|a, b| b.score().total_cmp(&a.score()));

        let size = self.config.population_size;
        let elite_count = self.config.elite_count().min(self.population.len());
        let pairs = (size.saturating_sub(elite_count) + 1) / 2;

        // Each pair is bred on its own RNG so offspring can be built in parallel.
        let seeds: Vec<u64> = (0..pairs).map(|_| self.rng.next_seed()).collect();
        let offspring: Vec<Individual> = seeds
            .into_par_iter()
            .flat_map_iter(|seed| self.breed(seed))
            .collect();

        let mut next_gen = Vec::with_capacity(elite_count + offspring.len());
        next_gen.extend_from_slice(&self.population[..elite_count]);
        next_gen.extend(offspring);
        next_gen.truncate(size);
        trace!(
            "Next generation: {} elites, {} offspring",
            elite_count,
            next_gen.len() - elite_count
        );

        self.population = next_gen;
        Ok(&self.population)
    }

    /// Two children of two tournament winners.
    fn breed(&self, seed: u64) -> [Individual; 2] {
        let mut rng = TrayRng::new(seed);
        let tournament = self.config.tournament_size();
        let parent1 = rng.select(&self.population, tournament);
        let parent2 = rng.select(&self.population, tournament);

        [(); 2].map(|_| {
            let mut child = rng.crossover(parent1, parent2, self.config.alpha_range);
            rng.mutate(&mut child, self.config.mutation_rate);
            if self.config.max_elements_per_gene > 1 {
                rng.mutate_tray_count(
                    &mut child,
                    self.config.mutation_rate_elements_up,
                    self.config.mutation_rate_elements_down,
                    self.layer_size,
                );
            }
            child
        })
    }

    /// The fittest individual of the current population.
    ///
    /// Only individuals with a computed fitness can win over unevaluated ones.
    pub fn best(&self) -> Option<&Individual> {
        self.population
            .iter()
            .max_by(|a, b| a.score().total_cmp(&b.score()))
    }

    /// Fitness statistics of the current population.
    pub fn progress(&self, generation: usize, max_generations: usize) -> SolverProgress {
        let scores: Vec<f64> = self
            .population
            .iter()
            .filter_map(Individual::fitness)
            .collect();

        let (mean, std) = if scores.is_empty() {
            (0.0, 0.0)
        } else {
            let n = scores.len() as f64;
            let mean = scores.iter().sum::<f64>() / n;
            let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
            (mean, variance.sqrt())
        };

        SolverProgress {
            generation,
            max_generations,
            best_fitness: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_fitness: mean,
            fitness_std: std,
        }
    }

    /// Evolve until the best fitness is within `tolerance` of zero or
    /// `max_generations` have run, and return the best individual.
    pub fn solve(
        &mut self,
        max_generations: usize,
        tolerance: f64,
    ) -> Result<Individual, SolverError> {
        self.solve_with_callback(max_generations, tolerance, |_| {})
            .map(|result| result.best)
    }

    /// Like [`solve`](Self::solve), reporting progress after every generation.
    pub fn solve_with_callback<F>(
        &mut self,
        max_generations: usize,
        tolerance: f64,
        mut callback: F,
    ) -> Result<SolveResult, SolverError>
    where
        F: FnMut(&SolverProgress),
    {
        if self.population.is_empty() {
            return Err(SolverError::EmptyPopulation);
        }
        if max_generations == 0 {
            return Err(SolverError::NoGenerations);
        }
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(SolverConfigError::InvalidTolerance(tolerance).into());
        }

        let start_time = Instant::now();
        info!(
            "Solving with population {} for up to {} generations (tolerance {})",
            self.population.len(),
            max_generations,
            tolerance
        );

        let mut history = FitnessHistory::default();
        let mut generations = 0;
        let mut stop_reason = StopReason::MaxGenerations;

        for generation in 0..max_generations {
            self.run_generation()?;
            self.evaluate_population();
            generations = generation + 1;

            let progress = self.progress(generation, max_generations);
            history.best_fitness.push(progress.best_fitness);
            history.mean_fitness.push(progress.mean_fitness);
            history.fitness_std.push(progress.fitness_std);
            debug!(
                "Generation {}: best {:.4}, mean {:.4}, std {:.4}",
                generation, progress.best_fitness, progress.mean_fitness, progress.fitness_std
            );
            callback(&progress);

            if progress.best_fitness.abs() <= tolerance {
                stop_reason = StopReason::ToleranceReached;
                break;
            }
        }

        let best = self.best().cloned().ok_or(SolverError::EmptyPopulation)?;
        let best_fitness = best.score();
        let final_mean_fitness = history.mean_fitness.last().copied().unwrap_or(0.0);
        let elapsed_seconds = start_time.elapsed().as_secs_f64();

        match stop_reason {
            StopReason::ToleranceReached => info!(
                "Converged after {} generations in {:.2}s, fitness {:.6}",
                generations, elapsed_seconds, best_fitness
            ),
            StopReason::MaxGenerations => warn!(
                "Generation budget of {} exhausted, best fitness {:.6}",
                max_generations, best_fitness
            ),
        }

        Ok(SolveResult {
            best,
            stats: SolveStats {
                generations,
                best_fitness,
                final_mean_fitness,
                elapsed_seconds,
                stop_reason,
            },
            history,
        })
    }
}
