//! Host-side driver: plays one game tick by tick against real deadlines and
//! keeps a serializable trace of what happened.

use crate::EngineError;
use log::{debug, info};
use mazeplay_core::{Controller, Direction, Environment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EpisodeConfig {
    pub max_ticks: u32,
    /// Wall-clock budget of one tick. The agent's deadline is the end of it.
    pub tick_ms: u64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_ticks: 4_000,
            tick_ms: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EpisodeStatus {
    GameOver,
    Cleared,
    MaxTicks,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickRecord {
    pub tick: u32,
    pub level: u32,
    pub action: Direction,
    /// Move the agent asked for. Differs from `action` only on overrun.
    pub requested: Direction,
    pub score_before: i64,
    pub score_after: i64,
    pub lives_before: u32,
    pub lives_after: u32,
    pub decision_ms: u64,
    pub overran: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalMetrics {
    pub score: i64,
    pub lives: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeSummary {
    pub ticks: u32,
    pub lives_lost: u32,
    pub overruns: u32,
    pub max_decision_ms: u64,
    pub wall_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeResult {
    pub status: EpisodeStatus,
    pub final_metrics: FinalMetrics,
    pub ticks: Vec<TickRecord>,
    pub summary: EpisodeSummary,
}

/// Plays `env` until the game ends or `max_ticks` ticks have run. Each tick
/// the agent gets until the end of the tick to answer; a late answer is
/// replaced with the agent's previous move.
pub fn run_episode<E, A, O>(
    mut env: E,
    agent: &mut A,
    adversary: &mut O,
    config: &EpisodeConfig,
) -> EpisodeResult
where
    E: Environment,
    A: Controller<E, Action = Direction> + ?Sized,
    O: Controller<E, Action = E::Opponent> + ?Sized,
{
    let started_at = Instant::now();
    let tick_budget = Duration::from_millis(config.tick_ms);
    let mut records = Vec::new();
    let mut status = EpisodeStatus::MaxTicks;

    for tick in 0..config.max_ticks {
        if env.is_game_over() {
            status = finished_status(&env);
            break;
        }
        let tick_started = Instant::now();
        let deadline = tick_started + tick_budget;
        let level = env.level();
        let score_before = env.score();
        let lives_before = env.lives();

        let requested = agent.decide(&env, deadline);
        let decided_at = Instant::now();
        let overran = decided_at > deadline;
        let action = if overran { env.last_action() } else { requested };
        let response = adversary.decide(&env, deadline);
        env.advance(action, &response);

        if env.level() != level {
            info!("level {} finished at tick {} with score {}", level, tick, env.score());
        }
        if env.lives() < lives_before {
            debug!("life lost at tick {}, {} left", tick, env.lives());
        }
        records.push(TickRecord {
            tick,
            level,
            action,
            requested,
            score_before,
            score_after: env.score(),
            lives_before,
            lives_after: env.lives(),
            decision_ms: decided_at.duration_since(tick_started).as_millis() as u64,
            overran,
        });
    }
    if env.is_game_over() {
        status = finished_status(&env);
    }

    let summary = EpisodeSummary {
        ticks: records.len() as u32,
        lives_lost: records
            .iter()
            .filter(|record| record.lives_after < record.lives_before)
            .count() as u32,
        overruns: records.iter().filter(|record| record.overran).count() as u32,
        max_decision_ms: records
            .iter()
            .map(|record| record.decision_ms)
            .max()
            .unwrap_or(0),
        wall_time_ms: started_at.elapsed().as_millis() as u64,
    };
    info!(
        "episode ended {:?} after {} ticks with score {}",
        status,
        summary.ticks,
        env.score()
    );
    EpisodeResult {
        status,
        final_metrics: FinalMetrics {
            score: env.score(),
            lives: env.lives(),
            level: env.level(),
        },
        ticks: records,
        summary,
    }
}

fn finished_status<E: Environment>(env: &E) -> EpisodeStatus {
    if env.lives() > 0 {
        EpisodeStatus::Cleared
    } else {
        EpisodeStatus::GameOver
    }
}

impl EpisodeResult {
    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            format!("status: {}", status_label(self.status)),
            format!(
                "final: score={} lives={} level={}",
                self.final_metrics.score, self.final_metrics.lives, self.final_metrics.level
            ),
            format!(
                "summary: ticks={} lives_lost={} overruns={} max_decision_ms={} wall_ms={}",
                self.summary.ticks,
                self.summary.lives_lost,
                self.summary.overruns,
                self.summary.max_decision_ms,
                self.summary.wall_time_ms
            ),
            String::new(),
            "events:".to_string(),
        ];
        let mut quiet = true;
        for record in &self.ticks {
            if record.lives_after < record.lives_before {
                lines.push(format!(
                    "  tick {:>5} | level {} | life lost ({} -> {}) at score {}",
                    record.tick,
                    record.level,
                    record.lives_before,
                    record.lives_after,
                    record.score_after
                ));
                quiet = false;
            }
            if record.overran {
                lines.push(format!(
                    "  tick {:>5} | level {} | overran: {}ms, asked {} played {}",
                    record.tick, record.level, record.decision_ms, record.requested, record.action
                ));
                quiet = false;
            }
        }
        if quiet {
            lines.push("  (none)".to_string());
        }
        lines.join("\n")
    }
}

fn status_label(status: EpisodeStatus) -> &'static str {
    match status {
        EpisodeStatus::GameOver => "GameOver",
        EpisodeStatus::Cleared => "Cleared",
        EpisodeStatus::MaxTicks => "MaxTicks",
    }
}

pub fn write_json(path: &Path, result: &EpisodeResult) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(result)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, result: &EpisodeResult) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, result.to_text_report())?;
    Ok(())
}
