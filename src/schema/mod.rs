//! Schema module - Item geometry and configuration types for packing runs.

mod config;
mod item;
mod solver;

pub use config::*;
pub use item::*;
pub use solver::*;
