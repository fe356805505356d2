use mazeplay_core::{Controller, Direction, Environment};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A ring corridor scoring a fixed amount per step. Clones share the
/// `advances` counter so tests can see how many simulator steps ran.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedEnv {
    pub len: usize,
    pub position: usize,
    pub last: Direction,
    pub score: i64,
    pub lives: u32,
    pub level: u32,
    pub tick: u32,
    pub points_per_step: i64,
    pub death_ticks: Vec<u32>,
    pub junctions: Vec<usize>,
    pub game_over: bool,
    pub advances: Rc<Cell<u32>>,
}

impl ScriptedEnv {
    pub fn ring(len: usize) -> Self {
        Self {
            len,
            position: 0,
            last: Direction::Right,
            score: 0,
            lives: 3,
            level: 1,
            tick: 0,
            points_per_step: 7,
            death_ticks: Vec::new(),
            junctions: Vec::new(),
            game_over: false,
            advances: Rc::new(Cell::new(0)),
        }
    }

    pub fn advances(&self) -> u32 {
        self.advances.get()
    }
}

impl Environment for ScriptedEnv {
    type Position = usize;
    type Opponent = ();

    fn advance(&mut self, action: Direction, _opponent: &()) {
        if self.game_over {
            return;
        }
        self.advances.set(self.advances.get() + 1);
        self.tick += 1;
        let dir = match action {
            Direction::Left | Direction::Right => action,
            _ => self.last,
        };
        if let Some(next) = self.neighbor(self.position, dir) {
            self.position = next;
            self.last = dir;
        }
        self.score += self.points_per_step;
        if self.death_ticks.contains(&self.tick) {
            self.lives = self.lives.saturating_sub(1);
        }
        if self.lives == 0 {
            self.game_over = true;
        }
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn lives(&self) -> u32 {
        self.lives
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn agent_position(&self) -> usize {
        self.position
    }

    fn last_action(&self) -> Direction {
        self.last
    }

    fn positions(&self) -> Vec<usize> {
        (0..self.len).collect()
    }

    fn junctions(&self) -> Vec<usize> {
        self.junctions.clone()
    }

    fn neighbor(&self, position: usize, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Right => Some((position + 1) % self.len),
            Direction::Left => Some((position + self.len - 1) % self.len),
            _ => None,
        }
    }
}

/// Adversary for environments without an opposing side.
#[derive(Debug, Clone, Default)]
pub(crate) struct Idle;

impl<E: Environment<Opponent = ()>> Controller<E> for Idle {
    type Action = ();

    fn decide(&mut self, _state: &E, _deadline: Instant) {}
}
