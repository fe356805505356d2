use mazeplay_core::{Direction, Environment};

/// One immutable point-in-time copy of the environment held by a search
/// node. Simulation always happens on a [`Snapshot::fork`].
#[derive(Debug, Clone)]
pub struct Snapshot<E> {
    env: E,
    action: Direction,
    alive: bool,
}

impl<E: Environment> Snapshot<E> {
    /// Root of a search: alive, labelled with the agent's last real move.
    pub fn root(env: E) -> Self {
        let action = env.last_action();
        Self {
            env,
            action,
            alive: true,
        }
    }

    pub fn new(env: E, action: Direction, alive: bool) -> Self {
        Self { env, action, alive }
    }

    /// Result of applying `action` from a state that had `lives_before`
    /// lives: alive unless a life was lost or none remain.
    pub fn after_transition(env: E, action: Direction, lives_before: u32) -> Self {
        let alive = env.lives() >= lives_before && env.lives() > 0;
        Self { env, action, alive }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn fork(&self) -> E {
        self.env.clone()
    }

    pub fn action(&self) -> Direction {
        self.action
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn lives(&self) -> u32 {
        self.env.lives()
    }

    pub fn score(&self) -> i64 {
        self.env.score()
    }
}
