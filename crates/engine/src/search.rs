use crate::{best_child, rollout, select, NodeId, SearchContext, SearchTree, Snapshot};
use log::{debug, trace};
use mazeplay_core::{Direction, Environment};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How the returned action was obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Resolution {
    /// Best root child under pure exploitation that passed the safety check.
    BestChild,
    /// No root child was both viable and safe.
    Fallback,
    /// Selection found no viable child and the search stopped early.
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildSummary {
    pub action: Direction,
    pub visits: u32,
    pub mean_reward: f64,
    pub alive: bool,
    pub time: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchStats {
    pub iterations: u32,
    pub elapsed_ms: u64,
    pub tree_nodes: usize,
    pub root_visits: u32,
    pub max_depth: usize,
    pub selected_visits: u32,
    pub selected_value: f64,
    pub children: Vec<ChildSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub action: Direction,
    pub resolution: Resolution,
    pub stats: SearchStats,
}

/// Builds a fresh tree rooted at `env` and iterates select, rollout and
/// backpropagate until `ctx.deadline` (or the iteration cap), then picks the
/// root's best safe child. Always produces an action.
pub fn search<E: Environment>(env: &E, ctx: &mut SearchContext<'_, E>) -> SearchOutcome {
    let mut tree = SearchTree::new(Snapshot::root(env.clone()));
    let mut iterations = 0u32;
    let mut max_depth = 0usize;
    let mut aborted = false;

    while Instant::now() < ctx.deadline {
        if ctx.config.max_iterations.is_some_and(|cap| iterations >= cap) {
            break;
        }
        let Some(leaf) = select(&mut tree, ctx) else {
            aborted = true;
            break;
        };
        let reward = rollout(&tree, leaf, ctx);
        tree.backpropagate(leaf, reward);
        max_depth = max_depth.max(tree.depth(leaf));
        iterations += 1;
    }

    let root = tree.root();
    let (action, resolution, picked) = if aborted {
        (ctx.config.abort_action, Resolution::Aborted, None)
    } else {
        match best_child(&tree, root, 0.0, ctx) {
            Some(id) => (tree.get(id).action(), Resolution::BestChild, Some(id)),
            None => (ctx.config.fallback_action, Resolution::Fallback, None),
        }
    };

    let stats = collect_stats(&tree, picked, iterations, max_depth, ctx.started);
    debug!(
        "search: {} iterations in {}ms, {} nodes, depth {}, picked {} ({:?})",
        stats.iterations,
        stats.elapsed_ms,
        stats.tree_nodes,
        stats.max_depth,
        action,
        resolution
    );
    for child in &stats.children {
        trace!(
            "  {:>5} visits={} mean={:.1} alive={} t={}",
            child.action.label(),
            child.visits,
            child.mean_reward,
            child.alive,
            child.time
        );
    }

    SearchOutcome {
        action,
        resolution,
        stats,
    }
}

fn collect_stats<E: Environment>(
    tree: &SearchTree<E>,
    picked: Option<NodeId>,
    iterations: u32,
    max_depth: usize,
    started: Instant,
) -> SearchStats {
    let root = tree.get(tree.root());
    let children = root
        .children()
        .iter()
        .map(|id| {
            let child = tree.get(*id);
            ChildSummary {
                action: child.action(),
                visits: child.visits(),
                mean_reward: child.mean_reward().unwrap_or(0.0),
                alive: child.is_alive(),
                time: child.time(),
            }
        })
        .collect();
    let (selected_visits, selected_value) = picked
        .map(|id| {
            let node = tree.get(id);
            (node.visits(), node.mean_reward().unwrap_or(0.0))
        })
        .unwrap_or((0, 0.0));
    SearchStats {
        iterations,
        elapsed_ms: started.elapsed().as_millis() as u64,
        tree_nodes: tree.len(),
        root_visits: root.visits(),
        max_depth,
        selected_visits,
        selected_value,
        children,
    }
}
