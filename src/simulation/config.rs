//! Validated simulation configuration.
//!
//! Every engine is built from one of these structs after [`SimulationConfig::validate`]
//! has passed. The structs deserialize from JSON with defaults for missing fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::simulation::error::MazeError;
use crate::simulation::geometry::Bounds;
use crate::simulation::params::{
    round_to, DEFAULT_COLS, DEFAULT_DISCOUNT, DEFAULT_INITIAL_TEMP, DEFAULT_LEARNING_RATE,
    DEFAULT_MEMORY_QUALITY, DEFAULT_ROWS, DEFAULT_SEED, DEFAULT_TEMP_DECAY, INITIAL_TEMP_RANGE,
    MEMORY_QUALITY_RANGE, MIN_SIDE,
};

fn check_range(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), MazeError> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(MazeError::invalid(format!(
            "{name} must be between {lo} and {hi} (inclusive), got {value}"
        )));
    }
    Ok(())
}

/// Grid size and placement rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub rows: usize,
    pub cols: usize,
    /// Start each trial in a random corner instead of rotating through them.
    pub random_start: bool,
    /// Fix the platform at the centre cell. Otherwise it hides in a random corner.
    pub platform_centered: bool,
    /// Count quadrant visits on every move and allow the platform to be removed.
    pub removal_probe: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            random_start: false,
            platform_centered: true,
            removal_probe: false,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), MazeError> {
        if self.rows < MIN_SIDE || self.cols < MIN_SIDE {
            return Err(MazeError::invalid(format!(
                "grid must be at least {MIN_SIDE}x{MIN_SIDE}, got {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.rows, self.cols)
    }
}

/// Parameters of the direction-shifting mouse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Quality of spatial memory, 0 to 100 percent.
    pub memory_quality: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            memory_quality: DEFAULT_MEMORY_QUALITY,
        }
    }
}

impl HeuristicConfig {
    pub fn validate(&self) -> Result<(), MazeError> {
        check_range("memory quality", self.memory_quality, MEMORY_QUALITY_RANGE)
    }

    /// Memory quality as a fraction in `[0, 1]`, rounded to the working precision.
    #[must_use]
    pub fn learning_fraction(&self) -> f64 {
        round_to(self.memory_quality / 100.0)
    }
}

/// Parameters of the softmax Q-learning mouse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after each trial.
    pub temperature_decay: f64,
    pub discount_factor: f64,
    pub learning_rate: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            initial_temperature: DEFAULT_INITIAL_TEMP,
            temperature_decay: DEFAULT_TEMP_DECAY,
            discount_factor: DEFAULT_DISCOUNT,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl QLearningConfig {
    pub fn validate(&self) -> Result<(), MazeError> {
        check_range(
            "initial temperature",
            self.initial_temperature,
            INITIAL_TEMP_RANGE,
        )?;
        check_range("temperature decay", self.temperature_decay, (0.0, 1.0))?;
        check_range("discount factor", self.discount_factor, (0.0, 1.0))?;
        check_range("learning rate", self.learning_rate, (0.0, 1.0))
    }

    /// Copy with every parameter rounded to the working precision.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            initial_temperature: round_to(self.initial_temperature),
            temperature_decay: round_to(self.temperature_decay),
            discount_factor: round_to(self.discount_factor),
            learning_rate: round_to(self.learning_rate),
        }
    }
}

/// Which learning model drives the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Heuristic(HeuristicConfig),
    QLearning(QLearningConfig),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::QLearning(QLearningConfig::default())
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), MazeError> {
        match self {
            Self::Heuristic(cfg) => cfg.validate(),
            Self::QLearning(cfg) => cfg.validate(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Heuristic(_) => "heuristic",
            Self::QLearning(_) => "q-learning",
        }
    }
}

/// Complete configuration for one simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub policy: PolicyConfig,
    /// Base RNG seed. Batch iteration `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            policy: PolicyConfig::default(),
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), MazeError> {
        self.arena.validate()?;
        self.policy.validate()
    }

    #[must_use]
    pub fn seed_or_default(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, MazeError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| MazeError::invalid(format!("malformed configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, MazeError> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            MazeError::invalid(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json(&text)
    }
}
