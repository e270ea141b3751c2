//! Softmax Q-learning mouse.
//!
//! Movement is a Boltzmann choice over the values of the eight neighbouring
//! cells. The temperature starts high (near-uniform exploration) and decays
//! after every trial toward [`LOWEST_TEMP`]. When the platform is found the
//! goal cell receives the running goal value and the trial's path is swept
//! backwards with a temporal-difference update.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::simulation::config::QLearningConfig;
use crate::simulation::error::MazeError;
use crate::simulation::geometry::{Bounds, Direction, Position, NUM_DIRS};
use crate::simulation::memory::ValueGrid;
use crate::simulation::params::{
    round_to, LOWEST_TEMP, MOVES_TEMP_RESET_FRACTION, TRIAL_TEMP_RESET_THRESHOLD,
};
use crate::simulation::policy::sampling::{sample_direction, DirectionWeights, UNIT};
use crate::simulation::policy::{MazeRng, Policy};

#[derive(Clone, Debug)]
pub struct QLearningPolicy {
    config: QLearningConfig,
    bounds: Bounds,
    values: ValueGrid,
    temperature: f64,
    /// Value written to the goal cell when a trial ends.
    goal_value: f64,
    /// Temperature at or below which a long search triggers a reset.
    reset_threshold: f64,
    /// Moves within one trial that count as a long search.
    move_limit: usize,
    platform_moved: bool,
    temperature_resets: u32,
    trials_completed: u32,
    moves: usize,
    /// Cells occupied before each move of the current trial.
    path: Vec<Position>,
    position: Position,
}

impl QLearningPolicy {
    pub fn new(config: QLearningConfig, bounds: Bounds) -> Result<Self, MazeError> {
        config.validate()?;
        let config = config.rounded();
        let decayed = config
            .temperature_decay
            .powi(TRIAL_TEMP_RESET_THRESHOLD);
        let reset_threshold = round_to(config.initial_temperature * decayed);
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )] // Grid sizes are small and the product is non-negative
        let move_limit = (bounds.cell_count() as f64 * MOVES_TEMP_RESET_FRACTION).floor() as usize;

        Ok(Self {
            config,
            bounds,
            values: ValueGrid::new(bounds),
            temperature: config.initial_temperature,
            goal_value: config.initial_temperature,
            reset_threshold,
            move_limit,
            platform_moved: false,
            temperature_resets: 0,
            trials_completed: 0,
            moves: 0,
            path: Vec::new(),
            position: Position::new(0, 0),
        })
    }

    /// Softmax over the neighbour values of `pos` at the current temperature.
    /// Off-grid directions are `None`; probabilities are rounded.
    pub fn move_probabilities(&self, pos: Position) -> Result<DirectionWeights, MazeError> {
        let neighbours = self.values.neighbor_values(pos)?;
        let peak = neighbours
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let mut exps = [None; NUM_DIRS];
        let mut total = 0.0;
        for (slot, value) in exps.iter_mut().zip(neighbours) {
            if let Some(v) = value {
                let e = ((v - peak) / self.temperature).exp();
                *slot = Some(e);
                total += e;
            }
        }
        Ok(exps.map(|e| e.map(|e| round_to(e / total))))
    }

    /// Whether a search this long at this temperature means the platform moved.
    fn long_search(&self) -> bool {
        self.moves >= self.move_limit && self.temperature <= self.reset_threshold
    }

    /// Applies the end-of-trial update with `goal` as the cell where the
    /// platform was found.
    pub fn backpropagate(&mut self, path: &[Position], goal: Position) -> Result<(), MazeError> {
        self.values.set(goal, self.goal_value)?;
        let mut updated = HashSet::with_capacity(path.len());
        for &cell in path.iter().rev() {
            if cell == goal || !updated.insert(cell) {
                continue;
            }
            self.values
                .update(cell, self.config.learning_rate, self.config.discount_factor)?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub const fn reset_threshold(&self) -> f64 {
        self.reset_threshold
    }

    #[must_use]
    pub const fn move_limit(&self) -> usize {
        self.move_limit
    }

    #[must_use]
    pub const fn goal_value(&self) -> f64 {
        self.goal_value
    }

    #[must_use]
    pub const fn values(&self) -> &ValueGrid {
        &self.values
    }

    #[must_use]
    pub const fn trials_completed(&self) -> u32 {
        self.trials_completed
    }

    #[must_use]
    pub const fn temperature_resets(&self) -> u32 {
        self.temperature_resets
    }

    #[must_use]
    pub const fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn config(&self) -> &QLearningConfig {
        &self.config
    }
}

impl Policy for QLearningPolicy {
    fn name(&self) -> &'static str {
        "q-learning"
    }

    fn begin_trial(&mut self, start: Position) {
        self.position = start;
        self.moves = 0;
        self.path.clear();
    }

    fn next_direction(&mut self, rng: &mut MazeRng) -> Result<Direction, MazeError> {
        if self.long_search() {
            warn!(
                moves = self.moves,
                temperature = self.temperature,
                "long search at low temperature; assuming the platform moved"
            );
            self.temperature = self.config.initial_temperature;
            self.platform_moved = true;
            self.temperature_resets += 1;
        }

        let probs = self.move_probabilities(self.position)?;
        let direction = sample_direction(&probs, UNIT, rng)
            .ok_or(MazeError::illegal("choose direction", "every direction is masked"))?;
        let next = self.bounds.step(self.position, direction)?;
        self.path.push(self.position);
        self.position = next;
        self.moves += 1;
        trace!(%direction, position = %next, temperature = self.temperature, "q-learning move");
        Ok(direction)
    }

    fn end_trial(&mut self) -> Result<(), MazeError> {
        self.temperature =
            round_to(self.temperature * self.config.temperature_decay).max(LOWEST_TEMP);
        self.trials_completed += 1;
        if self.platform_moved {
            self.goal_value *= 2.0;
            self.platform_moved = false;
        }

        let path = std::mem::take(&mut self.path);
        self.backpropagate(&path, self.position)?;
        debug!(
            trial = self.trials_completed,
            moves = self.moves,
            temperature = self.temperature,
            goal_value = self.goal_value,
            best_value = self.values.max(),
            "value grid updated"
        );
        self.moves = 0;
        Ok(())
    }

    fn reset(&mut self) {
        self.values.reset();
        self.temperature = self.config.initial_temperature;
        self.goal_value = self.config.initial_temperature;
        self.platform_moved = false;
        self.temperature_resets = 0;
        self.trials_completed = 0;
        self.moves = 0;
        self.path.clear();
        self.position = Position::new(0, 0);
    }

    fn describe(&self) -> String {
        format!(
            "temperature {:.3} | goal value {:.3} | resets {}",
            self.temperature, self.goal_value, self.temperature_resets
        )
    }
}
