//! Genetic search for tray layouts.
//!
//! # Overview
//!
//! - **Fitness** (`fitness`): penalty score of a layout against its box
//! - **Layout Operations** (`genome`): random seeding, selection, crossover, and mutation
//! - **Search** (`search`): the generational loop with elitism and convergence checks
//!
//! # Example
//!
//! ```rust,no_run
//! use tray_packer::compute::GameBox;
//! use tray_packer::compute::evolution::GeneticSolver;
//! use tray_packer::schema::{Item, SolverConfig};
//!
//! let mut game_box = GameBox::new(300, 300, 120);
//! game_box.add_items(Item::new(88, 63, 1), 100);
//!
//! let mut solver = GeneticSolver::new(&game_box, SolverConfig::default())?;
//! solver.generate_population();
//! let result = solver.solve_with_callback(2000, 0.001, |progress| {
//!     println!("Generation {}: best fitness = {:.3}",
//!         progress.generation, progress.best_fitness);
//! })?;
//!
//! println!("{}", result.best);
//! # Ok::<(), tray_packer::schema::SolverError>(())
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessBreakdown, FitnessEvaluator, FitnessWeights};
pub use genome::TrayRng;
pub use search::{GeneticSolver, SolveResult};
