//! Direction-shifting heuristic mouse.
//!
//! The mouse remembers, for every cell, the compass direction toward the
//! platform. At each step it looks up the probability table for its region
//! and the remembered direction's symmetry class, spreads that table over the
//! absolute directions, and samples one. After each trial all tables shift
//! mass toward the remembered direction in proportion to memory quality.

use tracing::trace;

use crate::simulation::config::HeuristicConfig;
use crate::simulation::error::MazeError;
use crate::simulation::geometry::{
    classify_position, direction_toward, Bounds, Direction, Position,
};
use crate::simulation::policy::sampling::{sample_direction, DirectionWeights, PERCENT};
use crate::simulation::policy::tables::{uniform_weights, ProbabilityTables, SymmetryClass};
use crate::simulation::policy::{MazeRng, Policy};

#[derive(Clone, Debug)]
pub struct HeuristicPolicy {
    config: HeuristicConfig,
    /// Memory quality as a fraction in `[0, 1]`.
    fraction: f64,
    bounds: Bounds,
    tables: ProbabilityTables,
    /// Direction toward the platform for each cell, row-major.
    remembered: Vec<Option<Direction>>,
    position: Position,
}

impl HeuristicPolicy {
    pub fn new(
        config: HeuristicConfig,
        bounds: Bounds,
        platform: Position,
    ) -> Result<Self, MazeError> {
        config.validate()?;
        let mut policy = Self {
            config,
            fraction: config.learning_fraction(),
            bounds,
            tables: ProbabilityTables::new(),
            remembered: Vec::new(),
            position: Position::new(0, 0),
        };
        policy.remember_platform(platform)?;
        Ok(policy)
    }

    /// Precomputes the direction toward `platform` from every cell.
    fn remember_platform(&mut self, platform: Position) -> Result<(), MazeError> {
        let platform = self.bounds.check(platform)?;
        self.remembered = self
            .bounds
            .cells()
            .map(|cell| direction_toward(cell, platform))
            .collect();
        Ok(())
    }

    /// Remembered direction at `pos`; `None` on the platform cell itself.
    pub fn remembered_direction(&self, pos: Position) -> Result<Option<Direction>, MazeError> {
        let pos = self.bounds.check(pos)?;
        Ok(self.remembered[self.bounds.index(pos)])
    }

    /// Probability of each absolute direction from `pos`, as percentages.
    /// Directions that leave the grid are `None`.
    pub fn move_probabilities(&self, pos: Position) -> Result<DirectionWeights, MazeError> {
        let region = classify_position(pos, self.bounds)?;
        let weights = self
            .remembered_direction(pos)?
            .and_then(|target| {
                SymmetryClass::for_region(region, target)
                    .map(|class| self.tables.get(class).remap(region, target))
            })
            .unwrap_or_else(|| uniform_weights(region));
        Ok(weights)
    }

    /// Shifts every table toward the remembered direction by memory quality.
    pub fn reinforce(&mut self) {
        self.tables.reinforce(self.fraction);
    }

    #[must_use]
    pub const fn tables(&self) -> &ProbabilityTables {
        &self.tables
    }

    #[must_use]
    pub const fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn begin_trial(&mut self, start: Position) {
        self.position = start;
    }

    fn next_direction(&mut self, rng: &mut MazeRng) -> Result<Direction, MazeError> {
        let probs = self.move_probabilities(self.position)?;
        let direction = sample_direction(&probs, PERCENT, rng)
            .ok_or(MazeError::illegal("choose direction", "every direction is masked"))?;
        self.position = self.bounds.step(self.position, direction)?;
        trace!(%direction, position = %self.position, "heuristic move");
        Ok(direction)
    }

    fn end_trial(&mut self) -> Result<(), MazeError> {
        self.reinforce();
        Ok(())
    }

    fn platform_changed(&mut self, platform: Option<Position>) -> Result<(), MazeError> {
        // A removed platform keeps its remembered location.
        match platform {
            Some(platform) => self.remember_platform(platform),
            None => Ok(()),
        }
    }

    fn reset(&mut self) {
        self.tables.reset();
        self.position = Position::new(0, 0);
    }

    fn describe(&self) -> String {
        format!(
            "memory {:.1}% | toward-target (open) {:.3}%",
            self.config.memory_quality,
            self.tables.get(SymmetryClass::Open).get(0)
        )
    }
}
