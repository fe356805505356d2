//! Baseline controllers. Adversaries drive the ghost team; `RandomAgent`
//! drives the agent on any environment.

use crate::{Controller, Direction, Environment, GameState, Ghost, GhostMoves, Maze, SeededRng};
use std::time::Instant;

/// Exits a ghost may take this tick: everything but a reversal, unless the
/// reversal is the only way out.
fn forward_moves(maze: &Maze, ghost: &Ghost) -> Vec<Direction> {
    let exits = maze.moves_from(ghost.position);
    let forward: Vec<Direction> = exits
        .iter()
        .copied()
        .filter(|dir| *dir != ghost.last_move.opposite())
        .collect();
    if forward.is_empty() {
        exits
    } else {
        forward
    }
}

#[derive(Debug, Clone)]
pub struct RandomGhosts {
    rng: SeededRng,
}

impl RandomGhosts {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededRng::from_seed(seed),
        }
    }
}

impl Controller<GameState> for RandomGhosts {
    type Action = GhostMoves;

    fn decide(&mut self, state: &GameState, _deadline: Instant) -> GhostMoves {
        let maze = state.maze();
        GhostMoves(
            state
                .ghosts()
                .iter()
                .map(|ghost| {
                    self.rng
                        .choose(&forward_moves(maze, ghost))
                        .unwrap_or(ghost.last_move)
                })
                .collect(),
        )
    }
}

/// Every ghost takes the shortest path towards the agent.
#[derive(Debug, Clone, Default)]
pub struct AggressiveGhosts;

impl Controller<GameState> for AggressiveGhosts {
    type Action = GhostMoves;

    fn decide(&mut self, state: &GameState, _deadline: Instant) -> GhostMoves {
        let maze = state.maze();
        let target = state.agent_position();
        GhostMoves(
            state
                .ghosts()
                .iter()
                .map(|ghost| {
                    maze.step_relative(
                        ghost.position,
                        target,
                        Some(ghost.last_move.opposite()),
                        true,
                    )
                    .unwrap_or(ghost.last_move)
                })
                .collect(),
        )
    }
}

/// Flees while edible or while the agent is about to reach a power pill,
/// otherwise chases most of the time and wanders the rest.
#[derive(Debug, Clone)]
pub struct StarterGhosts {
    rng: SeededRng,
    chase_probability: f64,
    pill_proximity: u32,
}

impl StarterGhosts {
    pub const DEFAULT_CHASE_PROBABILITY: f64 = 0.9;
    pub const DEFAULT_PILL_PROXIMITY: u32 = 15;

    pub fn new(seed: u64) -> Self {
        Self::with_params(
            seed,
            Self::DEFAULT_CHASE_PROBABILITY,
            Self::DEFAULT_PILL_PROXIMITY,
        )
    }

    pub fn with_params(seed: u64, chase_probability: f64, pill_proximity: u32) -> Self {
        Self {
            rng: SeededRng::from_seed(seed),
            chase_probability,
            pill_proximity,
        }
    }

    fn agent_near_power_pill(&self, state: &GameState) -> bool {
        let agent = state.agent_position();
        state
            .remaining_power_pills()
            .any(|pill| state.maze().distance(agent, pill) < self.pill_proximity)
    }
}

impl Controller<GameState> for StarterGhosts {
    type Action = GhostMoves;

    fn decide(&mut self, state: &GameState, _deadline: Instant) -> GhostMoves {
        let maze = state.maze();
        let agent = state.agent_position();
        let threatened = self.agent_near_power_pill(state);
        let mut moves = Vec::with_capacity(state.ghosts().len());
        for ghost in state.ghosts() {
            let reverse = Some(ghost.last_move.opposite());
            let chosen = if ghost.is_edible() || threatened {
                maze.step_relative(ghost.position, agent, reverse, false)
            } else if self.rng.chance(self.chase_probability) {
                maze.step_relative(ghost.position, agent, reverse, true)
            } else {
                self.rng.choose(&forward_moves(maze, ghost))
            };
            moves.push(chosen.unwrap_or(ghost.last_move));
        }
        GhostMoves(moves)
    }
}

/// Uniform over the legal actions of any environment.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: SeededRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededRng::from_seed(seed),
        }
    }
}

impl<E: Environment> Controller<E> for RandomAgent {
    type Action = Direction;

    fn decide(&mut self, state: &E, _deadline: Instant) -> Direction {
        self.rng
            .choose(&state.legal_actions())
            .unwrap_or_else(|| state.last_action())
    }
}
