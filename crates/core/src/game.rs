//! Reference maze-chase simulator: one agent collecting pills while a team
//! of adversaries hunts it.

use crate::{builtin_layouts, Direction, Environment, Maze, MazeError, PillKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameRules {
    pub pill_score: i64,
    pub power_pill_score: i64,
    /// Value of the first adversary eaten during one power period; doubles
    /// for each further one.
    pub ghost_eat_score: i64,
    pub edible_ticks: u32,
    pub lair_ticks: u32,
    pub initial_lives: u32,
    pub extra_life_score: i64,
    pub level_tick_limit: u32,
    pub max_levels: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            pill_score: 10,
            power_pill_score: 50,
            ghost_eat_score: 200,
            edible_ticks: 60,
            lair_ticks: 20,
            initial_lives: 3,
            extra_life_score: 10_000,
            level_tick_limit: 3_000,
            max_levels: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ghost {
    pub position: usize,
    pub last_move: Direction,
    pub edible_ticks: u32,
    pub lair_ticks: u32,
}

impl Ghost {
    pub fn in_lair(&self) -> bool {
        self.lair_ticks > 0
    }

    pub fn is_edible(&self) -> bool {
        self.edible_ticks > 0
    }
}

/// One requested direction per adversary, in adversary order. Missing
/// entries fall back to the adversary's default step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GhostMoves(pub Vec<Direction>);

#[derive(Debug, Clone)]
pub struct GameState {
    rules: Arc<GameRules>,
    layouts: Arc<[Arc<Maze>]>,
    maze: Arc<Maze>,
    pills: Vec<bool>,
    pills_remaining: usize,
    agent: usize,
    agent_last_move: Direction,
    ghosts: Vec<Ghost>,
    score: i64,
    lives: u32,
    level: u32,
    level_ticks: u32,
    total_ticks: u32,
    ghost_eat_multiplier: i64,
    extra_life_awarded: bool,
    game_over: bool,
    cleared: bool,
}

impl GameState {
    pub fn new(rules: GameRules) -> Result<Self, MazeError> {
        Self::with_layouts(rules, builtin_layouts()?)
    }

    pub fn with_layouts(rules: GameRules, layouts: Vec<Arc<Maze>>) -> Result<Self, MazeError> {
        let first = layouts
            .first()
            .cloned()
            .ok_or_else(|| MazeError::Empty("layout list".to_string()))?;
        let mut state = Self {
            lives: rules.initial_lives,
            rules: Arc::new(rules),
            layouts: layouts.into(),
            maze: first,
            pills: Vec::new(),
            pills_remaining: 0,
            agent: 0,
            agent_last_move: Direction::Left,
            ghosts: Vec::new(),
            score: 0,
            level: 1,
            level_ticks: 0,
            total_ticks: 0,
            ghost_eat_multiplier: 1,
            extra_life_awarded: false,
            game_over: false,
            cleared: false,
        };
        state.start_level();
        Ok(state)
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn has_pill(&self, node: usize) -> bool {
        self.pills.get(node).copied().unwrap_or(false)
    }

    pub fn pills_remaining(&self) -> usize {
        self.pills_remaining
    }

    pub fn remaining_power_pills(&self) -> impl Iterator<Item = usize> + '_ {
        self.maze
            .pill_nodes()
            .filter(|(_, kind)| *kind == PillKind::PowerPill)
            .map(|(idx, _)| idx)
            .filter(|idx| self.has_pill(*idx))
    }

    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    pub fn level_ticks(&self) -> u32 {
        self.level_ticks
    }

    /// True once the final level has been cleared.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    fn start_level(&mut self) {
        let slot = (self.level.saturating_sub(1) as usize) % self.layouts.len();
        self.maze = self.layouts[slot].clone();
        self.pills = vec![false; self.maze.node_count()];
        self.pills_remaining = 0;
        for (idx, _) in self.maze.pill_nodes() {
            self.pills[idx] = true;
            self.pills_remaining += 1;
        }
        self.level_ticks = 0;
        self.reset_actors();
    }

    fn reset_actors(&mut self) {
        self.agent = self.maze.agent_start();
        self.agent_last_move = Direction::Left;
        self.ghost_eat_multiplier = 1;
        let lair_ticks = self.rules.lair_ticks;
        self.ghosts = self
            .maze
            .lair()
            .iter()
            .enumerate()
            .map(|(idx, position)| Ghost {
                position: *position,
                last_move: Direction::Up,
                edible_ticks: 0,
                lair_ticks: lair_ticks * (idx as u32 + 1),
            })
            .collect();
    }

    fn move_agent(&mut self, action: Direction) {
        for dir in [action, self.agent_last_move] {
            if let Some(next) = self.maze.neighbor(self.agent, dir) {
                self.agent = next;
                self.agent_last_move = dir;
                return;
            }
        }
    }

    fn eat_at_agent(&mut self) {
        if !self.has_pill(self.agent) {
            return;
        }
        self.pills[self.agent] = false;
        self.pills_remaining -= 1;
        let kind = self.maze.node(self.agent).and_then(|node| node.pill);
        match kind {
            Some(PillKind::PowerPill) => {
                self.score += self.rules.power_pill_score;
                self.ghost_eat_multiplier = 1;
                let edible = self.rules.edible_ticks;
                for ghost in self.ghosts.iter_mut().filter(|ghost| !ghost.in_lair()) {
                    ghost.edible_ticks = edible;
                    ghost.last_move = ghost.last_move.opposite();
                }
            }
            Some(PillKind::Pill) => self.score += self.rules.pill_score,
            None => {}
        }
    }

    fn move_ghosts(&mut self, opponent: &GhostMoves) {
        let slow_tick = self.total_ticks % 2 == 1;
        for (idx, ghost) in self.ghosts.iter_mut().enumerate() {
            if ghost.in_lair() {
                ghost.lair_ticks -= 1;
                continue;
            }
            if ghost.is_edible() && slow_tick {
                continue;
            }
            let requested = opponent.0.get(idx).copied();
            if let Some(dir) = ghost_step(&self.maze, ghost, requested) {
                if let Some(next) = self.maze.neighbor(ghost.position, dir) {
                    ghost.position = next;
                    ghost.last_move = dir;
                }
            }
        }
    }

    fn resolve_collisions(&mut self, agent_from: usize, ghosts_from: &[usize]) {
        let mut died = false;
        for (idx, ghost) in self.ghosts.iter_mut().enumerate() {
            if ghost.in_lair() {
                continue;
            }
            let met = ghost.position == self.agent
                || (ghost.position == agent_from && ghosts_from[idx] == self.agent);
            if !met {
                continue;
            }
            if ghost.is_edible() {
                self.score += self.rules.ghost_eat_score * self.ghost_eat_multiplier;
                self.ghost_eat_multiplier *= 2;
                let lair = self.maze.lair();
                ghost.position = lair[idx % lair.len()];
                ghost.edible_ticks = 0;
                ghost.lair_ticks = self.rules.lair_ticks;
            } else {
                died = true;
            }
        }
        if died {
            self.lives = self.lives.saturating_sub(1);
            self.reset_actors();
        }
    }

    fn finish_level(&mut self) {
        debug!(
            "level {} finished after {} ticks with {} pills left",
            self.level, self.level_ticks, self.pills_remaining
        );
        if self.level >= self.rules.max_levels {
            self.cleared = true;
            self.game_over = true;
        } else {
            self.level += 1;
            self.start_level();
        }
    }
}

/// Adversaries may not reverse unless the reversal is their only exit.
fn ghost_step(maze: &Maze, ghost: &Ghost, requested: Option<Direction>) -> Option<Direction> {
    let reverse = ghost.last_move.opposite();
    let exits = maze.moves_from(ghost.position);
    let forward: Vec<Direction> = exits.iter().copied().filter(|dir| *dir != reverse).collect();
    if forward.is_empty() {
        return exits.first().copied();
    }
    match requested {
        Some(dir) if forward.contains(&dir) => Some(dir),
        _ => forward.first().copied(),
    }
}

impl Environment for GameState {
    type Position = usize;
    type Opponent = GhostMoves;

    fn advance(&mut self, action: Direction, opponent: &GhostMoves) {
        if self.game_over {
            return;
        }
        let agent_from = self.agent;
        let ghosts_from: Vec<usize> = self.ghosts.iter().map(|ghost| ghost.position).collect();

        self.move_agent(action);
        self.eat_at_agent();
        self.move_ghosts(opponent);
        self.resolve_collisions(agent_from, &ghosts_from);

        for ghost in self.ghosts.iter_mut() {
            ghost.edible_ticks = ghost.edible_ticks.saturating_sub(1);
        }
        if self.ghosts.iter().all(|ghost| !ghost.is_edible()) {
            self.ghost_eat_multiplier = 1;
        }
        if !self.extra_life_awarded && self.score >= self.rules.extra_life_score {
            self.lives += 1;
            self.extra_life_awarded = true;
        }

        self.total_ticks += 1;
        self.level_ticks += 1;
        if self.lives == 0 {
            self.game_over = true;
            return;
        }
        if self.pills_remaining == 0 || self.level_ticks >= self.rules.level_tick_limit {
            self.finish_level();
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
        self.agent
    }

    fn last_action(&self) -> Direction {
        self.agent_last_move
    }

    fn positions(&self) -> Vec<usize> {
        (0..self.maze.node_count()).collect()
    }

    fn junctions(&self) -> Vec<usize> {
        self.maze.junctions().to_vec()
    }

    fn neighbor(&self, position: usize, direction: Direction) -> Option<usize> {
        self.maze.neighbor(position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(rows: &[&str], rules: GameRules) -> GameState {
        let maze = Maze::parse("test", rows).expect("parse");
        GameState::with_layouts(rules, vec![Arc::new(maze)]).expect("state")
    }

    fn hunting_rules() -> GameRules {
        GameRules {
            lair_ticks: 0,
            ..GameRules::default()
        }
    }

    #[test]
    fn eating_a_pill_scores_ten() {
        let mut state = game(&["#####", "#P..#", "#G###"], GameRules::default());
        state.advance(Direction::Right, &GhostMoves::default());
        assert_eq!(state.score(), 10);
        assert_eq!(state.pills_remaining(), 1);
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn clearing_all_pills_advances_the_level() {
        let mut state = game(&["####", "#P.#", "#G##"], GameRules::default());
        state.advance(Direction::Right, &GhostMoves::default());
        assert_eq!(state.level(), 2);
        assert_eq!(state.pills_remaining(), 1);
        assert_eq!(state.agent_position(), state.maze().agent_start());
    }

    #[test]
    fn meeting_a_hunting_ghost_costs_a_life() {
        let mut state = game(&["######", "#P-G.#", "######"], hunting_rules());
        state.advance(Direction::Right, &GhostMoves(vec![Direction::Left]));
        assert_eq!(state.lives(), 2);
        assert_eq!(state.agent_position(), state.maze().agent_start());
        assert!(!state.is_game_over());
    }

    #[test]
    fn swapping_places_counts_as_a_collision() {
        let mut state = game(&["#####", "#PG.#", "#####"], hunting_rules());
        state.advance(Direction::Right, &GhostMoves(vec![Direction::Left]));
        assert_eq!(state.lives(), 2);
    }

    #[test]
    fn losing_the_last_life_ends_the_game() {
        let rules = GameRules {
            initial_lives: 1,
            ..hunting_rules()
        };
        let mut state = game(&["######", "#P-G.#", "######"], rules);
        state.advance(Direction::Right, &GhostMoves(vec![Direction::Left]));
        assert_eq!(state.lives(), 0);
        assert!(state.is_game_over());
        assert!(!state.is_cleared());
    }

    #[test]
    fn power_pill_turns_ghosts_edible() {
        let mut state = game(&["#######", "#Po-G.#", "#######"], hunting_rules());
        state.advance(Direction::Right, &GhostMoves(vec![Direction::Left]));
        assert_eq!(state.score(), 50);
        assert!(state.ghosts()[0].is_edible());
        state.advance(Direction::Right, &GhostMoves(vec![Direction::Left]));
        assert_eq!(state.score(), 250);
        assert_eq!(state.lives(), 3);
        assert!(!state.ghosts()[0].is_edible());
    }

    #[test]
    fn extra_life_is_granted_once() {
        let rules = GameRules {
            extra_life_score: 10,
            ..GameRules::default()
        };
        let mut state = game(&["######", "#P...#", "#G####"], rules);
        state.advance(Direction::Right, &GhostMoves::default());
        assert_eq!(state.lives(), 4);
        state.advance(Direction::Right, &GhostMoves::default());
        assert_eq!(state.score(), 20);
        assert_eq!(state.lives(), 4);
    }

    #[test]
    fn blocked_request_keeps_last_direction() {
        let mut state = game(&["######", "#P...#", "#G####"], GameRules::default());
        state.advance(Direction::Right, &GhostMoves::default());
        state.advance(Direction::Up, &GhostMoves::default());
        assert_eq!(state.last_action(), Direction::Right);
        assert_eq!(state.score(), 20);
    }

    #[test]
    fn clones_are_independent() {
        let original = GameState::new(GameRules::default()).expect("state");
        let mut copy = original.clone();
        for _ in 0..5 {
            copy.advance(Direction::Left, &GhostMoves::default());
        }
        assert_eq!(original.score(), 0);
        assert_eq!(original.total_ticks(), 0);
        assert_eq!(original.agent_position(), original.maze().agent_start());
        assert_ne!(copy.agent_position(), original.agent_position());
    }

    #[test]
    fn rules_deserialize_with_defaults() {
        let rules: GameRules = serde_json::from_str(r#"{"initial_lives": 5}"#).expect("parse");
        assert_eq!(rules.initial_lives, 5);
        assert_eq!(rules.pill_score, 10);
    }
}
