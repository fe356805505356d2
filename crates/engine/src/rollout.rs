//! Default policy: cheap forward simulation from a leaf.

use crate::{DecisionPoints, NodeId, SearchContext, SearchTree};
use mazeplay_core::{Direction, Environment, SeededRng};

/// Keeps `heading` if the corridor continues that way, otherwise takes any
/// other exit that is not a reversal, and reverses only at a dead end.
pub fn continue_direction<E: Environment>(env: &E, heading: Direction) -> Direction {
    let here = env.agent_position();
    if env.neighbor(here, heading).is_some() {
        return heading;
    }
    Direction::ALL
        .into_iter()
        .filter(|dir| *dir != heading.opposite())
        .find(|dir| env.neighbor(here, *dir).is_some())
        .unwrap_or(heading.opposite())
}

/// Rollout move generator: a fresh random choice only on decision points,
/// straight on everywhere else. Never reverses unless it has to.
#[derive(Debug, Clone, Copy)]
pub struct JunctionWalker<'a, P> {
    points: &'a DecisionPoints<P>,
}

impl<'a, P: Copy + Ord> JunctionWalker<'a, P> {
    pub fn new(points: &'a DecisionPoints<P>) -> Self {
        Self { points }
    }

    pub fn next_move<E>(&self, env: &E, rng: &mut SeededRng) -> Direction
    where
        E: Environment<Position = P>,
    {
        let here = env.agent_position();
        let heading = env.last_action();
        if !self.points.contains(&here) && env.neighbor(here, heading).is_some() {
            return heading;
        }
        let legal = env.legal_actions();
        let forward: Vec<Direction> = legal
            .iter()
            .copied()
            .filter(|dir| *dir != heading.opposite())
            .collect();
        let pool = if forward.is_empty() { &legal } else { &forward };
        rng.choose(pool).unwrap_or(heading)
    }
}

/// Reward for reaching `leaf`: the score after a bounded simulation, with
/// the life-change adjustment, minus the root's score. Leaves that already
/// cost a life return `lost_life_value` without simulating.
pub fn rollout<E: Environment>(
    tree: &SearchTree<E>,
    leaf: NodeId,
    ctx: &mut SearchContext<'_, E>,
) -> f64 {
    let config = ctx.config;
    let start = tree.get(leaf).snapshot();
    let root = tree.get(tree.root()).snapshot();
    if !start.is_alive() || start.lives() < root.lives() {
        return config.lost_life_value;
    }

    let walker = JunctionWalker::new(ctx.points);
    let mut env = start.fork();
    let lives_before = env.lives();
    let mut steps = 0u32;
    while !env.is_game_over() && steps < config.rollout_steps {
        let action = walker.next_move(&env, ctx.rng);
        let response = ctx.respond(&env);
        env.advance(action, &response);
        steps += 1;
        if env.lives() < lives_before {
            break;
        }
    }

    let mut score = env.score() as f64;
    if env.lives() > lives_before {
        score += config.new_life_value;
    } else if env.lives() < lives_before {
        score += config.lost_life_value;
    }
    score - root.score() as f64
}
