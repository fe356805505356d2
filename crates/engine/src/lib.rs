//! Anytime Monte-Carlo tree search for a maze-chase agent: a fresh tree per
//! decision, searched until the host's deadline and always answered.

pub mod agent;
pub mod config;
pub mod context;
pub mod decision_points;
pub mod episode;
pub mod error;
pub mod rollout;
pub mod search;
pub mod select;
pub mod snapshot;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use agent::*;
pub use config::*;
pub use context::*;
pub use decision_points::*;
pub use episode::*;
pub use error::*;
pub use rollout::*;
pub use search::*;
pub use select::*;
pub use snapshot::*;
pub use tree::*;
