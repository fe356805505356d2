//! Arena-backed search tree. Nodes own their snapshot; children are owned
//! by the arena and addressed by [`NodeId`], and the parent link is a plain
//! index used only for walking back to the root.

use crate::Snapshot;
use mazeplay_core::{Direction, Environment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct SearchNode<E> {
    snapshot: Snapshot<E>,
    parent: Option<NodeId>,
    visits: u32,
    total_reward: f64,
    outcomes: Vec<f64>,
    untried: Vec<Direction>,
    children: Vec<NodeId>,
    time: u32,
}

impl<E: Environment> SearchNode<E> {
    fn new(snapshot: Snapshot<E>, parent: Option<NodeId>, time: u32) -> Self {
        let env = snapshot.env();
        let untried = if snapshot.is_alive() && !env.is_game_over() {
            env.legal_actions()
        } else {
            Vec::new()
        };
        Self {
            snapshot,
            parent,
            visits: 0,
            total_reward: 0.0,
            outcomes: Vec::new(),
            untried,
            children: Vec::new(),
            time,
        }
    }

    pub fn snapshot(&self) -> &Snapshot<E> {
        &self.snapshot
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn action(&self) -> Direction {
        self.snapshot.action()
    }

    pub fn is_alive(&self) -> bool {
        self.snapshot.is_alive()
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn mean_reward(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.total_reward / self.visits as f64)
    }

    /// Every reward backed up through this node, oldest first.
    pub fn outcomes(&self) -> &[f64] {
        &self.outcomes
    }

    pub fn untried(&self) -> &[Direction] {
        &self.untried
    }

    pub fn is_expandable(&self) -> bool {
        !self.untried.is_empty()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Simulated ticks between the root and this node.
    pub fn time(&self) -> u32 {
        self.time
    }
}

#[derive(Debug, Clone)]
pub struct SearchTree<E> {
    nodes: Vec<SearchNode<E>>,
}

impl<E: Environment> SearchTree<E> {
    pub fn new(root: Snapshot<E>) -> Self {
        Self {
            nodes: vec![SearchNode::new(root, None, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &SearchNode<E> {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes and returns the untried action at `slot`.
    pub fn take_untried(&mut self, id: NodeId, slot: usize) -> Option<Direction> {
        let untried = &mut self.nodes[id.index()].untried;
        (slot < untried.len()).then(|| untried.remove(slot))
    }

    /// Attaches a child reached from `parent` by `snapshot.action()`. The
    /// action leaves the parent's untried set so each action yields at most
    /// one child.
    pub fn add_child(&mut self, parent: NodeId, snapshot: Snapshot<E>, time: u32) -> NodeId {
        let action = snapshot.action();
        let id = NodeId(self.nodes.len() as u32);
        let owner = &mut self.nodes[parent.index()];
        owner.untried.retain(|item| *item != action);
        owner.children.push(id);
        self.nodes.push(SearchNode::new(snapshot, Some(parent), time));
        id
    }

    pub fn child_for(&self, parent: NodeId, action: Direction) -> Option<NodeId> {
        self.get(parent)
            .children()
            .iter()
            .copied()
            .find(|child| self.get(*child).action() == action)
    }

    /// Adds one visit and `reward` to every node from `leaf` up to the root.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64) {
        let mut walk = Some(leaf);
        while let Some(id) = walk {
            let node = &mut self.nodes[id.index()];
            node.visits = node.visits.saturating_add(1);
            node.total_reward += reward;
            node.outcomes.push(reward);
            walk = node.parent;
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut walk = self.get(id).parent();
        while let Some(parent) = walk {
            depth += 1;
            walk = self.get(parent).parent();
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedEnv;

    fn tree() -> SearchTree<ScriptedEnv> {
        SearchTree::new(Snapshot::root(ScriptedEnv::ring(8)))
    }

    #[test]
    fn root_starts_with_every_legal_action_untried() {
        let tree = tree();
        let root = tree.get(tree.root());
        assert_eq!(root.untried(), &[Direction::Right, Direction::Left]);
        assert!(root.is_expandable());
        assert_eq!(root.parent(), None);
        assert_eq!(root.visits(), 0);
        assert_eq!(root.mean_reward(), None);
    }

    #[test]
    fn adding_a_child_consumes_its_action() {
        let mut tree = tree();
        let root = tree.root();
        let env = tree.get(root).snapshot().fork();
        let child = tree.add_child(root, Snapshot::new(env, Direction::Left, true), 3);
        assert_eq!(tree.get(root).untried(), &[Direction::Right]);
        assert_eq!(tree.get(root).children(), &[child]);
        assert_eq!(tree.get(child).parent(), Some(root));
        assert_eq!(tree.get(child).time(), 3);
        assert_eq!(tree.child_for(root, Direction::Left), Some(child));
        assert_eq!(tree.child_for(root, Direction::Right), None);
    }

    #[test]
    fn dead_children_are_not_expandable() {
        let mut tree = tree();
        let root = tree.root();
        let env = tree.get(root).snapshot().fork();
        let child = tree.add_child(root, Snapshot::new(env, Direction::Right, false), 1);
        assert!(!tree.get(child).is_expandable());
        assert!(!tree.get(child).is_alive());
    }

    #[test]
    fn backpropagation_counts_every_pass_through_each_ancestor() {
        let mut tree = tree();
        let root = tree.root();
        let env = tree.get(root).snapshot().fork();
        let left = tree.add_child(root, Snapshot::new(env.clone(), Direction::Left, true), 1);
        let right = tree.add_child(root, Snapshot::new(env.clone(), Direction::Right, true), 1);
        let deep = tree.add_child(left, Snapshot::new(env, Direction::Left, true), 2);
        assert_eq!(tree.depth(deep), 2);

        for _ in 0..3 {
            tree.backpropagate(deep, 2.0);
        }
        tree.backpropagate(left, -1.0);
        tree.backpropagate(right, 4.0);
        tree.backpropagate(right, 4.0);

        assert_eq!(tree.get(deep).visits(), 3);
        assert_eq!(tree.get(left).visits(), 4);
        assert_eq!(tree.get(right).visits(), 2);
        assert_eq!(tree.get(root).visits(), 6);
        assert_eq!(tree.get(left).total_reward(), 5.0);
        assert_eq!(tree.get(root).total_reward(), 13.0);
        assert_eq!(tree.get(left).outcomes(), &[2.0, 2.0, 2.0, -1.0]);
        assert_eq!(tree.get(right).mean_reward(), Some(4.0));
    }
}
