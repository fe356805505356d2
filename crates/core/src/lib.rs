//! Simulation side of the workspace: the environment and controller
//! interfaces, plus a reference maze-chase game. Keep this crate free of IO.

pub mod direction;
pub mod env;
pub mod game;
pub mod maze;
pub mod policies;
pub mod rng;

pub use direction::*;
pub use env::*;
pub use game::*;
pub use maze::*;
pub use policies::*;
pub use rng::*;
