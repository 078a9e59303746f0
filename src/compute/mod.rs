//! Compute module - Layout model and the genetic search over it.

mod chromosome;
mod footprint;
mod game_box;
mod tray;

pub mod evolution;

pub use chromosome::*;
pub use footprint::*;
pub use game_box::*;
pub use tray::*;
