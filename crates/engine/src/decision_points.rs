//! Positions where a cheap move generator is worth asking for a new
//! direction: junctions, corners and dead ends.

use mazeplay_core::{Direction, Environment};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPoints<P> {
    level: Option<u32>,
    points: BTreeSet<P>,
}

impl<P: Copy + Ord> Default for DecisionPoints<P> {
    fn default() -> Self {
        Self {
            level: None,
            points: BTreeSet::new(),
        }
    }
}

impl<P: Copy + Ord> DecisionPoints<P> {
    pub fn build<E>(env: &E) -> Self
    where
        E: Environment<Position = P>,
    {
        let mut points: BTreeSet<P> = env.junctions().into_iter().collect();
        points.extend(
            env.positions()
                .into_iter()
                .filter(|position| is_turn_or_crossing(env, *position)),
        );
        Self {
            level: Some(env.level()),
            points,
        }
    }

    /// Rebuilds when the environment moved to another level or nothing has
    /// been built yet. Returns whether a rebuild happened.
    pub fn refresh<E>(&mut self, env: &E) -> bool
    where
        E: Environment<Position = P>,
    {
        if !self.points.is_empty() && self.level == Some(env.level()) {
            return false;
        }
        *self = Self::build(env);
        true
    }

    pub fn contains(&self, position: &P) -> bool {
        self.points.contains(position)
    }

    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.points.iter()
    }
}

fn is_turn_or_crossing<E: Environment>(env: &E, position: E::Position) -> bool {
    let open = |dir| env.neighbor(position, dir).is_some();
    let (up, down) = (open(Direction::Up), open(Direction::Down));
    let (left, right) = (open(Direction::Left), open(Direction::Right));
    up != down || left != right || (up && down && left && right)
}
