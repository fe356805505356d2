//! Collaborator interfaces the decision engine is written against.

use crate::Direction;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// A turn-stepped simulator. `Clone` must produce a fully decoupled copy:
/// advancing the clone never affects the original.
pub trait Environment: Clone {
    type Position: Copy + Eq + Ord + Hash + Debug;
    /// Joint action of every adversary for one tick.
    type Opponent: Clone + Debug;

    /// Lock-step transition: the agent's action and the adversary's
    /// response are resolved together.
    fn advance(&mut self, action: Direction, opponent: &Self::Opponent);

    fn score(&self) -> i64;
    fn lives(&self) -> u32;
    fn is_game_over(&self) -> bool;
    fn level(&self) -> u32;

    fn agent_position(&self) -> Self::Position;
    fn last_action(&self) -> Direction;

    /// Every node of the current level's navigation graph.
    fn positions(&self) -> Vec<Self::Position>;
    fn junctions(&self) -> Vec<Self::Position>;
    fn neighbor(&self, position: Self::Position, direction: Direction) -> Option<Self::Position>;

    fn legal_actions(&self) -> Vec<Direction> {
        let here = self.agent_position();
        Direction::ALL
            .into_iter()
            .filter(|dir| self.neighbor(here, *dir).is_some())
            .collect()
    }
}

/// Anything that picks an action for a state before a deadline: the
/// search engine, baseline agents and adversary strategies alike.
pub trait Controller<E> {
    type Action;

    fn decide(&mut self, state: &E, deadline: Instant) -> Self::Action;
}

impl<E, C> Controller<E> for Box<C>
where
    C: Controller<E> + ?Sized,
{
    type Action = C::Action;

    fn decide(&mut self, state: &E, deadline: Instant) -> Self::Action {
        (**self).decide(state, deadline)
    }
}
