use crate::{search, DecisionPoints, EngineConfig, Resolution, SearchContext, SearchStats};
use log::{info, warn};
use mazeplay_core::{Controller, Direction, Environment, SeededRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Running totals across every decision an agent made.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStats {
    pub decisions: u32,
    pub iterations: u64,
    pub fallbacks: u32,
    pub aborts: u32,
    pub index_rebuilds: u32,
}

/// The tree-search agent. Owns the adversary model used inside its
/// simulations and the decision-point index, which survives between
/// decisions and is rebuilt only when the level changes.
pub struct MctsAgent<E: Environment> {
    config: EngineConfig,
    points: DecisionPoints<E::Position>,
    adversary: Box<dyn Controller<E, Action = E::Opponent>>,
    rng: SeededRng,
    last_stats: SearchStats,
    session: SessionStats,
}

impl<E: Environment> MctsAgent<E> {
    pub fn new(
        config: EngineConfig,
        adversary: Box<dyn Controller<E, Action = E::Opponent>>,
    ) -> Self {
        let rng = SeededRng::from_seed(config.seed);
        Self {
            config,
            points: DecisionPoints::default(),
            adversary,
            rng,
            last_stats: SearchStats::default(),
            session: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn decision_points(&self) -> &DecisionPoints<E::Position> {
        &self.points
    }

    pub fn last_stats(&self) -> &SearchStats {
        &self.last_stats
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    /// Searches until `deadline`, or `search_time_ms` from now when that is
    /// sooner, and returns the chosen move.
    pub fn search(&mut self, env: &E, deadline: Instant) -> Direction {
        if self.points.refresh(env) {
            self.session.index_rebuilds += 1;
            info!(
                "decision points rebuilt for level {}: {} positions",
                env.level(),
                self.points.len()
            );
        }

        let deadline = match self.config.search_time_ms {
            0 => deadline,
            ms => deadline.min(Instant::now() + Duration::from_millis(ms)),
        };
        let mut ctx = SearchContext::new(
            &self.config,
            &self.points,
            self.adversary.as_mut(),
            &mut self.rng,
            deadline,
        );
        let outcome = search(env, &mut ctx);

        self.session.decisions += 1;
        self.session.iterations += u64::from(outcome.stats.iterations);
        match outcome.resolution {
            Resolution::BestChild => {}
            Resolution::Fallback => {
                self.session.fallbacks += 1;
                warn!(
                    "no safe move after {} iterations, falling back to {}",
                    outcome.stats.iterations, outcome.action
                );
            }
            Resolution::Aborted => {
                self.session.aborts += 1;
                warn!(
                    "search aborted after {} iterations, playing {}",
                    outcome.stats.iterations, outcome.action
                );
            }
        }
        self.last_stats = outcome.stats;
        outcome.action
    }
}

impl<E: Environment> Controller<E> for MctsAgent<E> {
    type Action = Direction;

    fn decide(&mut self, state: &E, deadline: Instant) -> Direction {
        self.search(state, deadline)
    }
}
