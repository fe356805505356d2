//! Tree policy: expansion, upper-confidence child selection and the
//! one-ply safety gate used when the final move is picked.

use crate::{
    continue_direction, ExpansionBudget, NodeId, RewardBounds, SearchContext, SearchTree, Snapshot,
};
use mazeplay_core::{Direction, Environment};
use std::time::Duration;

/// Score every candidate has to beat.
pub const INITIAL_BEST_SCORE: f64 = -99_999_999.0;

/// Normalised mean reward plus the exploration bonus
/// `2c * sqrt(2 ln(parent_visits) / visits)`. `None` for unvisited nodes.
pub fn uct_score(
    total_reward: f64,
    visits: u32,
    parent_visits: u32,
    c: f64,
    bounds: RewardBounds,
) -> Option<f64> {
    if visits == 0 {
        return None;
    }
    let visits = visits as f64;
    let exploitation = bounds.normalize(total_reward / visits);
    if c == 0.0 {
        return Some(exploitation);
    }
    let parent_visits = parent_visits.max(1) as f64;
    let exploration = 2.0 * c * (2.0 * parent_visits.ln() / visits).sqrt();
    Some(exploitation + exploration)
}

/// Best child of `node` under exploration weight `c`. With `c == 0` a
/// candidate only displaces the current best if its action survives one
/// simulated adversary response. Ties keep the earlier child.
pub fn best_child<E: Environment>(
    tree: &SearchTree<E>,
    node: NodeId,
    c: f64,
    ctx: &mut SearchContext<'_, E>,
) -> Option<NodeId> {
    let parent = tree.get(node);
    let mut best = None;
    let mut best_value = INITIAL_BEST_SCORE;
    for child_id in parent.children().iter().copied() {
        let child = tree.get(child_id);
        let value = if !child.is_alive() {
            ctx.config.dead_child_score
        } else {
            match uct_score(
                child.total_reward(),
                child.visits(),
                parent.visits(),
                c,
                ctx.config.reward_bounds,
            ) {
                Some(value) => value,
                None => continue,
            }
        };
        if value > best_value
            && (c != 0.0 || passes_safety_check(parent.snapshot(), child.action(), ctx))
        {
            best = Some(child_id);
            best_value = value;
        }
    }
    best
}

/// Applies `action` from `from` against one adversary response and reports
/// whether the agent kept all its lives.
pub fn passes_safety_check<E: Environment>(
    from: &Snapshot<E>,
    action: Direction,
    ctx: &mut SearchContext<'_, E>,
) -> bool {
    let mut env = from.fork();
    let lives_before = env.lives();
    let response = ctx.respond(&env);
    env.advance(action, &response);
    env.lives() >= lives_before
}

pub fn expansion_allowed<E: Environment>(
    tree: &SearchTree<E>,
    node: NodeId,
    ctx: &SearchContext<'_, E>,
) -> bool {
    match ctx.config.expansion_budget {
        ExpansionBudget::TreeTicks { max_ticks } => tree.get(node).time() <= max_ticks,
        ExpansionBudget::Elapsed { millis } => {
            ctx.started.elapsed() <= Duration::from_millis(millis)
        }
    }
}

/// Turns one untried action of `node` into a child. The agent follows the
/// corridor it enters until it stands on a decision point, loses a life,
/// the game ends or `max_edge_ticks` ticks pass.
pub fn expand<E: Environment>(
    tree: &mut SearchTree<E>,
    node: NodeId,
    ctx: &mut SearchContext<'_, E>,
) -> Option<NodeId> {
    let slot = ctx.rng.index(tree.get(node).untried().len());
    let action = tree.take_untried(node, slot)?;

    let mut env = tree.get(node).snapshot().fork();
    let lives_before = env.lives();
    let max_ticks = ctx.config.max_edge_ticks.max(1);
    let mut heading = action;
    let mut ticks = 0u32;
    loop {
        let response = ctx.respond(&env);
        env.advance(heading, &response);
        ticks += 1;
        if env.is_game_over()
            || env.lives() < lives_before
            || ticks >= max_ticks
            || ctx.points.contains(&env.agent_position())
        {
            break;
        }
        heading = continue_direction(&env, heading);
    }

    let time = tree.get(node).time().saturating_add(ticks);
    let child = tree.add_child(node, Snapshot::after_transition(env, action, lives_before), time);
    Some(child)
}

/// Descends from the root to the node the next rollout starts from,
/// expanding the first expandable node whose budget allows it. `None` means
/// an interior node had no viable child.
pub fn select<E: Environment>(
    tree: &mut SearchTree<E>,
    ctx: &mut SearchContext<'_, E>,
) -> Option<NodeId> {
    let mut current = tree.root();
    loop {
        let node = tree.get(current);
        let (expandable, alive, has_children) = (
            node.is_expandable(),
            node.is_alive(),
            !node.children().is_empty(),
        );
        if expandable && expansion_allowed(tree, current, ctx) {
            return expand(tree, current, ctx);
        }
        if !alive || !has_children {
            return Some(current);
        }
        current = best_child(tree, current, ctx.config.exploration_c, ctx)?;
    }
}
