use mazeplay_core::{
    AggressiveGhosts, Controller, Direction, Environment, GameRules, GameState, GhostMoves, Maze,
    SeededRng, StarterGhosts,
};
use mazeplay_engine::{
    rollout, run_episode, DecisionPoints, EngineConfig, EngineError, EpisodeConfig, EpisodeStatus,
    MctsAgent, SearchContext, SearchTree, Snapshot,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Game wrapper that counts every simulator step taken through any clone.
#[derive(Debug, Clone)]
struct Counted {
    inner: GameState,
    steps: Rc<Cell<u64>>,
}

impl Counted {
    fn new(inner: GameState) -> Self {
        Self {
            inner,
            steps: Rc::new(Cell::new(0)),
        }
    }

    fn steps(&self) -> u64 {
        self.steps.get()
    }
}

impl Environment for Counted {
    type Position = usize;
    type Opponent = GhostMoves;

    fn advance(&mut self, action: Direction, opponent: &GhostMoves) {
        self.steps.set(self.steps.get() + 1);
        self.inner.advance(action, opponent);
    }

    fn score(&self) -> i64 {
        self.inner.score()
    }

    fn lives(&self) -> u32 {
        self.inner.lives()
    }

    fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }

    fn level(&self) -> u32 {
        self.inner.level()
    }

    fn agent_position(&self) -> usize {
        self.inner.agent_position()
    }

    fn last_action(&self) -> Direction {
        self.inner.last_action()
    }

    fn positions(&self) -> Vec<usize> {
        self.inner.positions()
    }

    fn junctions(&self) -> Vec<usize> {
        self.inner.junctions()
    }

    fn neighbor(&self, position: usize, direction: Direction) -> Option<usize> {
        self.inner.neighbor(position, direction)
    }
}

/// Runs a plain game adversary against the counting wrapper.
struct Lifted<C>(C);

impl<C> Controller<Counted> for Lifted<C>
where
    C: Controller<GameState, Action = GhostMoves>,
{
    type Action = GhostMoves;

    fn decide(&mut self, state: &Counted, deadline: Instant) -> GhostMoves {
        self.0.decide(&state.inner, deadline)
    }
}

fn corridor() -> GameState {
    let rules = GameRules {
        lair_ticks: 0,
        ..GameRules::default()
    };
    let maze = Maze::parse("corridor", &["#######", "#--PG.#", "#######"]).expect("parse");
    GameState::with_layouts(rules, vec![Arc::new(maze)]).expect("state")
}

#[test]
fn agent_answers_a_legal_move_close_to_the_deadline() {
    let env = Counted::new(GameState::new(GameRules::default()).expect("state"));
    let config = EngineConfig {
        search_time_ms: 0,
        ..EngineConfig::default()
    };
    let mut agent: MctsAgent<Counted> =
        MctsAgent::new(config, Box::new(Lifted(StarterGhosts::new(9))));

    let started = Instant::now();
    let deadline = started + Duration::from_millis(30);
    let action = agent.decide(&env, deadline);
    let overshoot = Instant::now().saturating_duration_since(deadline);

    assert!(env.legal_actions().contains(&action), "{action} is not legal");
    assert!(agent.last_stats().iterations > 0);
    assert!(env.steps() > 0);
    assert!(overshoot < Duration::from_millis(250), "overshot by {overshoot:?}");
    assert_eq!(env.inner.total_ticks(), 0);
}

#[test]
fn search_leaves_the_root_untouched() {
    let env = GameState::new(GameRules::default()).expect("state");
    let before = (env.score(), env.lives(), env.agent_position(), env.total_ticks());
    let config = EngineConfig {
        max_iterations: Some(50),
        search_time_ms: 0,
        ..EngineConfig::default()
    };
    let mut agent: MctsAgent<GameState> = MctsAgent::new(config, Box::new(StarterGhosts::new(1)));
    agent.search(&env, Instant::now() + Duration::from_secs(30));
    let after = (env.score(), env.lives(), env.agent_position(), env.total_ticks());
    assert_eq!(before, after);
    assert_eq!(agent.last_stats().root_visits, 50);
}

#[test]
fn leaf_that_already_lost_a_life_is_not_simulated() {
    let root = Counted::new(corridor());
    let mut wounded = root.clone();
    let lives_before = wounded.lives();
    let mut ghosts = AggressiveGhosts;
    let response = ghosts.decide(&wounded.inner, Instant::now());
    wounded.advance(Direction::Right, &response);
    assert_eq!(wounded.lives(), lives_before - 1);

    let mut tree = SearchTree::new(Snapshot::root(root.clone()));
    let leaf = tree.add_child(
        tree.root(),
        Snapshot::after_transition(wounded, Direction::Right, lives_before),
        1,
    );
    assert!(!tree.get(leaf).is_alive());

    let config = EngineConfig::default();
    let points = DecisionPoints::build(&root);
    let mut adversary = Lifted(AggressiveGhosts);
    let mut rng = SeededRng::from_seed(5);
    let mut ctx = SearchContext::new(
        &config,
        &points,
        &mut adversary,
        &mut rng,
        Instant::now() + Duration::from_secs(30),
    );
    let steps = root.steps();
    assert_eq!(rollout(&tree, leaf, &mut ctx), config.lost_life_value);
    assert_eq!(root.steps(), steps);
}

#[test]
fn agent_steps_away_from_an_adjacent_adversary() {
    let env = corridor();
    let config = EngineConfig {
        max_iterations: Some(200),
        search_time_ms: 0,
        ..EngineConfig::default()
    };
    let mut agent: MctsAgent<GameState> = MctsAgent::new(config, Box::new(AggressiveGhosts));
    let action = agent.search(&env, Instant::now() + Duration::from_secs(30));
    assert_ne!(action, Direction::Right);
}

#[test]
fn decision_points_cover_every_junction_and_are_stable() {
    let env = GameState::new(GameRules::default()).expect("state");
    let first = DecisionPoints::build(&env);
    let second = DecisionPoints::build(&env);
    assert_eq!(first, second);
    for junction in env.junctions() {
        assert!(first.contains(&junction));
    }
    assert!(first.len() > env.junctions().len());
}

#[test]
fn short_episode_against_starter_ghosts() {
    let env = GameState::new(GameRules::default()).expect("state");
    let config = EngineConfig {
        search_time_ms: 4,
        ..EngineConfig::default()
    };
    let mut agent: MctsAgent<GameState> = MctsAgent::new(config, Box::new(StarterGhosts::new(3)));
    let mut ghosts = StarterGhosts::new(4);
    let episode = EpisodeConfig {
        max_ticks: 25,
        tick_ms: 40,
    };
    let result = run_episode(env, &mut agent, &mut ghosts, &episode);
    assert_eq!(result.status, EpisodeStatus::MaxTicks);
    assert_eq!(result.summary.ticks, 25);
    assert_eq!(agent.session().decisions, 25);
    assert!(result.final_metrics.score > 0);
    assert_eq!(agent.session().index_rebuilds, 1);
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("engine.json");
    std::fs::write(&path, r#"{"seed": 11, "rollout_steps": 64}"#).expect("write");
    let config = EngineConfig::load(&path).expect("load");
    assert_eq!(config.seed, 11);
    assert_eq!(config.rollout_steps, 64);
    assert_eq!(config.search_time_ms, 30);

    std::fs::write(&path, r#"{"rollout_steps": 0}"#).expect("write");
    assert!(matches!(
        EngineConfig::load(&path),
        Err(EngineError::InvalidConfig(_))
    ));
    assert!(matches!(
        EngineConfig::load(&dir.path().join("missing.json")),
        Err(EngineError::Io(_))
    ));
}
