use crate::EngineError;
use mazeplay_core::Direction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// When the tree may still grow. Once the budget is spent, selection only
/// descends through nodes that already exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpansionBudget {
    /// A node may expand while its simulated time from the root, in ticks,
    /// is at most `max_ticks`.
    TreeTicks { max_ticks: u32 },
    /// Any node may expand while the search has run for at most `millis`.
    Elapsed { millis: u64 },
}

impl Default for ExpansionBudget {
    fn default() -> Self {
        Self::TreeTicks { max_ticks: 45 }
    }
}

/// Calibration range mapping raw mean rewards onto roughly `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RewardBounds {
    pub floor: f64,
    pub ceiling: f64,
}

impl RewardBounds {
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.floor) / (self.ceiling - self.floor)
    }
}

impl Default for RewardBounds {
    fn default() -> Self {
        Self {
            floor: -30_000.0,
            ceiling: 2_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    /// Own search window per decision; the host deadline still wins when it
    /// is earlier. Zero searches right up to the host deadline.
    pub search_time_ms: u64,
    pub max_iterations: Option<u32>,
    pub exploration_c: f64,
    pub expansion_budget: ExpansionBudget,
    /// Longest corridor walk simulated by a single expansion.
    pub max_edge_ticks: u32,
    pub rollout_steps: u32,
    pub lost_life_value: f64,
    pub new_life_value: f64,
    pub reward_bounds: RewardBounds,
    pub dead_child_score: f64,
    /// Returned when no root child survives the safety check.
    pub fallback_action: Direction,
    /// Returned when selection finds no viable child mid-search.
    pub abort_action: Direction,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            search_time_ms: 30,
            max_iterations: None,
            exploration_c: std::f64::consts::FRAC_1_SQRT_2,
            expansion_budget: ExpansionBudget::default(),
            max_edge_ticks: 30,
            rollout_steps: 100,
            lost_life_value: -500.0,
            new_life_value: 0.0,
            reward_bounds: RewardBounds::default(),
            dead_child_score: -99_999.0,
            fallback_action: Direction::Up,
            abort_action: Direction::Down,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.exploration_c.is_finite() || self.exploration_c < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "exploration_c must be finite and non-negative, got {}",
                self.exploration_c
            )));
        }
        if !(self.reward_bounds.ceiling > self.reward_bounds.floor) {
            return Err(EngineError::InvalidConfig(format!(
                "reward ceiling {} must exceed floor {}",
                self.reward_bounds.ceiling, self.reward_bounds.floor
            )));
        }
        if self.rollout_steps == 0 {
            return Err(EngineError::InvalidConfig(
                "rollout_steps must be positive".to_string(),
            ));
        }
        if self.max_edge_ticks == 0 {
            return Err(EngineError::InvalidConfig(
                "max_edge_ticks must be positive".to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(EngineError::InvalidConfig(
                "max_iterations must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
