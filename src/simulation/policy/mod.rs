//! Movement decision engines.
//!
//! This module provides:
//! - A shared weighted sampler over the eight directions
//! - The direction-shifting heuristic mouse and its symmetry tables
//! - The softmax Q-learning mouse

mod heuristic;
mod q_learning;
pub mod sampling;
pub mod tables;

pub use heuristic::HeuristicPolicy;
pub use q_learning::QLearningPolicy;
pub use sampling::{decide_direction, sample_direction, DirectionWeights};
pub use tables::{ProbabilityTables, SymmetryClass, SymmetryTable};

use rand::rngs::SmallRng;

use crate::simulation::config::PolicyConfig;
use crate::simulation::error::MazeError;
use crate::simulation::geometry::{Bounds, Direction, Position};

/// Random source handed to the policies. Seeded per session.
pub type MazeRng = SmallRng;

/// A learning mouse. Each instance owns all of its tables and counters.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Places the mouse at `start` for a new trial.
    fn begin_trial(&mut self, start: Position);

    /// Picks the next direction and advances the mouse's own position.
    fn next_direction(&mut self, rng: &mut MazeRng) -> Result<Direction, MazeError>;

    /// Learns from the trial that just found the platform.
    fn end_trial(&mut self) -> Result<(), MazeError>;

    /// Tells the mouse where the platform now is. Only mice that remember the
    /// platform's direction use this; `None` means it was removed.
    fn platform_changed(&mut self, _platform: Option<Position>) -> Result<(), MazeError> {
        Ok(())
    }

    /// Forgets everything learned, for an independent repetition.
    fn reset(&mut self);

    /// One-line state summary for the console.
    fn describe(&self) -> String;
}

/// Builds the policy named by `config` for a grid with the given platform.
pub fn build_policy(
    config: &PolicyConfig,
    bounds: Bounds,
    platform: Position,
) -> Result<Box<dyn Policy>, MazeError> {
    config.validate()?;
    Ok(match config {
        PolicyConfig::Heuristic(cfg) => Box::new(HeuristicPolicy::new(*cfg, bounds, platform)?),
        PolicyConfig::QLearning(cfg) => Box::new(QLearningPolicy::new(*cfg, bounds)?),
    })
}
