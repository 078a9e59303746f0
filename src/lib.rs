//! Tray Packer - Genetic search for board game box insert layouts.
//!
//! Given a box and a catalog of items (cards, tiles, tokens), this crate
//! searches for a set of trays, one group per item class, that fills the box
//! without overlap while giving every class enough room for its stack.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Item geometry, configuration types and errors
//! - `compute`: The layout model (box, trays, chromosomes) and the genetic search
//!
//! # Example
//!
//! ```rust,no_run
//! use tray_packer::{
//!     schema::{Item, SolverConfig},
//!     compute::{GameBox, evolution::GeneticSolver},
//! };
//!
//! let mut game_box = GameBox::new(300, 300, 120);
//! game_box.add_items(Item::new(88, 63, 1), 100);
//! game_box.add_items(Item::new(100, 100, 1), 100);
//!
//! let mut solver = GeneticSolver::new(&game_box, SolverConfig::default())?;
//! solver.generate_population();
//! let best = solver.solve(2000, 0.001)?;
//!
//! println!("Fitness: {:?}", best.fitness());
//! println!("{best}");
//! # Ok::<(), tray_packer::schema::SolverError>(())
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{GeneticSolver, SolveResult};
pub use compute::{GameBox, Individual, Tray};
pub use schema::{Item, PackingConfig, SolverConfig};
