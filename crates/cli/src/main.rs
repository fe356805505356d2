use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use log::info;
use mazeplay_core::{
    AggressiveGhosts, Controller, GameRules, GameState, GhostMoves, RandomAgent, RandomGhosts,
    StarterGhosts,
};
use mazeplay_engine::{
    run_episode, write_json, write_text, EngineConfig, EpisodeConfig, EpisodeResult, MctsAgent,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GhostKind {
    Starter,
    Aggressive,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    Mcts,
    Random,
}

#[derive(Parser, Debug)]
#[command(name = "mazeplay")]
#[command(about = "Play one maze-chase episode with a tree-search agent")]
struct Args {
    /// Seed shared by the agent, its adversary model and the real adversaries
    #[arg(long, default_value_t = 0xC0FFEE)]
    seed: u64,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 4_000)]
    ticks: u32,

    /// Wall-clock budget per tick in milliseconds
    #[arg(long, default_value_t = 40)]
    tick_ms: u64,

    #[arg(long, value_enum, default_value_t = GhostKind::Starter)]
    ghosts: GhostKind,

    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    agent: AgentKind,

    /// Engine config JSON; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Game rules JSON; missing fields keep their defaults
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Print the episode as JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also write the episode to this file (.json for JSON, text otherwise)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(&args.log_level)?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let rules = match args.rules.as_deref() {
        Some(path) => load_rules(path)?,
        None => GameRules::default(),
    };
    let engine = match args.config.as_deref() {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load engine config {}", path.display()))?,
        None => EngineConfig {
            seed: args.seed,
            ..EngineConfig::default()
        },
    };
    let episode = EpisodeConfig {
        max_ticks: args.ticks,
        tick_ms: args.tick_ms,
    };
    let env = GameState::new(rules).context("build game")?;
    let mut ghosts = ghost_controller(args.ghosts, args.seed.wrapping_add(2));

    info!(
        "playing {:?} agent against {:?} ghosts, seed {}, {} ticks of {}ms",
        args.agent, args.ghosts, args.seed, args.ticks, args.tick_ms
    );
    let result = match args.agent {
        AgentKind::Mcts => {
            let model = ghost_controller(args.ghosts, args.seed.wrapping_add(1));
            let mut agent = MctsAgent::new(engine, model);
            let result = run_episode(env, &mut agent, ghosts.as_mut(), &episode);
            let session = agent.session();
            info!(
                "search: {} decisions, {} iterations, {} fallbacks, {} aborts, {} index rebuilds",
                session.decisions,
                session.iterations,
                session.fallbacks,
                session.aborts,
                session.index_rebuilds
            );
            result
        }
        AgentKind::Random => {
            let mut agent = RandomAgent::new(args.seed);
            run_episode(env, &mut agent, ghosts.as_mut(), &episode)
        }
    };

    if let Some(path) = args.out.as_deref() {
        write_result(path, &result)?;
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.to_text_report());
    }
    Ok(())
}

fn ghost_controller(
    kind: GhostKind,
    seed: u64,
) -> Box<dyn Controller<GameState, Action = GhostMoves>> {
    match kind {
        GhostKind::Starter => Box::new(StarterGhosts::new(seed)),
        GhostKind::Aggressive => Box::new(AggressiveGhosts),
        GhostKind::Random => Box::new(RandomGhosts::new(seed)),
    }
}

fn load_rules(path: &Path) -> Result<GameRules> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse rules {}", path.display()))
}

fn write_result(path: &Path, result: &EpisodeResult) -> Result<()> {
    let written = if path.extension().is_some_and(|ext| ext == "json") {
        write_json(path, result)
    } else {
        write_text(path, result)
    };
    written.with_context(|| format!("write {}", path.display()))
}
