use crate::{DecisionPoints, EngineConfig};
use mazeplay_core::{Controller, Environment, SeededRng};
use std::time::Instant;

/// Everything one search borrows from its session.
pub struct SearchContext<'a, E: Environment> {
    pub config: &'a EngineConfig,
    pub points: &'a DecisionPoints<E::Position>,
    pub adversary: &'a mut dyn Controller<E, Action = E::Opponent>,
    pub rng: &'a mut SeededRng,
    pub started: Instant,
    pub deadline: Instant,
}

impl<'a, E: Environment> SearchContext<'a, E> {
    pub fn new(
        config: &'a EngineConfig,
        points: &'a DecisionPoints<E::Position>,
        adversary: &'a mut dyn Controller<E, Action = E::Opponent>,
        rng: &'a mut SeededRng,
        deadline: Instant,
    ) -> Self {
        Self {
            config,
            points,
            adversary,
            rng,
            started: Instant::now(),
            deadline,
        }
    }

    /// One adversary response for `env`, decided against the search deadline.
    pub fn respond(&mut self, env: &E) -> E::Opponent {
        self.adversary.decide(env, self.deadline)
    }
}
