//! The water maze (arena): grid bounds, platform, mouse placement and the
//! per-trial state machine `Idle -> InProgress -> Found -> InProgress ...`.

use rand::Rng;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::simulation::config::ArenaConfig;
use crate::simulation::error::MazeError;
use crate::simulation::geometry::{Bounds, Direction, Position};
use crate::simulation::params::RELOCATION_WINDOW;

/// Lifecycle of the current trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TrialPhase {
    Idle,
    InProgress,
    Found,
}

impl TrialPhase {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in progress",
            Self::Found => "found",
        }
    }
}

/// Result of a single legal move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Position),
    FoundPlatform(Position),
}

impl MoveOutcome {
    #[must_use]
    pub const fn position(self) -> Position {
        match self {
            Self::Moved(p) | Self::FoundPlatform(p) => p,
        }
    }

    #[must_use]
    pub const fn found(self) -> bool {
        matches!(self, Self::FoundPlatform(_))
    }
}

/// One quarter of the grid, clockwise from the top-left. Cells on the
/// centre row or column belong to none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthEast,
        Quadrant::SouthWest,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Quadrant containing `pos`, or `None` on the centre row/column.
    #[must_use]
    pub fn of(pos: Position, bounds: Bounds) -> Option<Self> {
        let center = bounds.center();
        let north = pos.row < center.row;
        let south = pos.row > center.row;
        let west = pos.col < center.col;
        let east = pos.col > center.col;
        match (north, south, west, east) {
            (true, _, true, _) => Some(Self::NorthWest),
            (true, _, _, true) => Some(Self::NorthEast),
            (_, true, _, true) => Some(Self::SouthEast),
            (_, true, true, _) => Some(Self::SouthWest),
            _ => None,
        }
    }
}

/// A quadrant's position relative to the quadrant that held the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum QuadrantRelation {
    Target,
    AdjacentRight,
    Opposite,
    AdjacentLeft,
}

impl QuadrantRelation {
    /// Relation of `quadrant` to `target`, counting clockwise quarter turns.
    #[must_use]
    pub const fn between(quadrant: Quadrant, target: Quadrant) -> Self {
        match (quadrant.index() + 4 - target.index()) % 4 {
            0 => Self::Target,
            1 => Self::AdjacentRight,
            2 => Self::Opposite,
            _ => Self::AdjacentLeft,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Target => "TR",
            Self::AdjacentRight => "A/R",
            Self::Opposite => "OP",
            Self::AdjacentLeft => "A/L",
        }
    }
}

/// Content of a single grid cell in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Cell {
    Empty,
    Mouse,
    Platform,
    Found,
}

impl Cell {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Mouse => 'M',
            Self::Platform => 'P',
            Self::Found => 'F',
        }
    }
}

/// Immutable picture of the arena after a move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridSnapshot {
    pub bounds: Bounds,
    pub cells: Vec<Cell>,
    pub phase: TrialPhase,
    pub moves_in_trial: usize,
}

impl GridSnapshot {
    #[must_use]
    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[self.bounds.index(pos)]
    }

    /// Rows of the bordered ASCII board, including the `+---+` frame.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let border = format!("+ {} +", vec!["-"; self.bounds.cols].join(" "));
        let mut out = Vec::with_capacity(self.bounds.rows + 2);
        out.push(border.clone());
        for row in self.cells.chunks(self.bounds.cols) {
            let body: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            out.push(format!("| {} |", body.join(" ")));
        }
        out.push(border);
        out
    }
}

impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// The water maze.
///
/// Owns the platform and the mouse's position. Policies never touch this
/// state directly; they only supply directions through [`Arena::move_mouse`].
#[derive(Clone, Debug)]
pub struct Arena {
    config: ArenaConfig,
    bounds: Bounds,
    platform: Position,
    platform_removed: bool,
    starts: Vec<Position>,
    mouse: Option<Position>,
    phase: TrialPhase,
    trials_started: u32,
    trials_since_relocation: u32,
    moves_in_trial: usize,
    quadrant_counts: [u32; 4],
}

impl Arena {
    /// Builds an arena and hides the platform according to `config`.
    pub fn new<R: Rng + ?Sized>(config: ArenaConfig, rng: &mut R) -> Result<Self, MazeError> {
        config.validate()?;
        let bounds = config.bounds();
        let mut arena = Self {
            config,
            bounds,
            platform: bounds.center(),
            platform_removed: false,
            starts: Vec::new(),
            mouse: None,
            phase: TrialPhase::Idle,
            trials_started: 0,
            trials_since_relocation: 0,
            moves_in_trial: 0,
            quadrant_counts: [0; 4],
        };
        arena.place_platform(rng, false);
        Ok(arena)
    }

    /// Picks the platform cell and the start corners that remain.
    fn place_platform<R: Rng + ?Sized>(&mut self, rng: &mut R, avoid_current: bool) {
        let corners = self.bounds.corners();
        if self.config.platform_centered {
            self.platform = self.bounds.center();
            self.starts = corners.to_vec();
            return;
        }

        let choices: Vec<Position> = corners
            .iter()
            .copied()
            .filter(|&c| !avoid_current || c != self.platform)
            .collect();
        self.platform = choices[rng.random_range(0..choices.len())];
        self.starts = corners
            .iter()
            .copied()
            .filter(|&c| c != self.platform)
            .collect();
    }

    /// Begins a trial and returns the mouse's start cell.
    pub fn start_trial<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Position, MazeError> {
        if self.phase == TrialPhase::InProgress {
            return Err(MazeError::illegal("start trial", "a trial is in progress"));
        }
        self.trials_started += 1;
        self.trials_since_relocation += 1;
        self.platform_removed = false;
        self.quadrant_counts = [0; 4];
        self.moves_in_trial = 0;

        let start = if self.config.random_start {
            self.starts[rng.random_range(0..self.starts.len())]
        } else {
            self.starts[(self.trials_started as usize - 1) % self.starts.len()]
        };
        self.mouse = Some(start);
        self.phase = TrialPhase::InProgress;
        debug!(trial = self.trials_started, start = %start, platform = %self.platform, "trial started");
        Ok(start)
    }

    #[must_use]
    pub fn can_move(&self) -> bool {
        self.phase == TrialPhase::InProgress
    }

    /// Moves the mouse one cell. Reports whether it landed on the platform.
    pub fn move_mouse(&mut self, direction: Direction) -> Result<MoveOutcome, MazeError> {
        let current = match (self.phase, self.mouse) {
            (TrialPhase::InProgress, Some(pos)) => pos,
            _ => return Err(MazeError::illegal("move mouse", "no trial in progress")),
        };
        let next = self.bounds.step(current, direction)?;
        if self.config.removal_probe {
            if let Some(q) = Quadrant::of(current, self.bounds) {
                self.quadrant_counts[q.index()] += 1;
            }
        }
        self.mouse = Some(next);
        self.moves_in_trial += 1;

        if !self.platform_removed && next == self.platform {
            self.phase = TrialPhase::Found;
            debug!(moves = self.moves_in_trial, "platform found");
            Ok(MoveOutcome::FoundPlatform(next))
        } else {
            Ok(MoveOutcome::Moved(next))
        }
    }

    /// Moves the platform to a different corner.
    ///
    /// Refused when the platform is fixed at the centre, during a trial, or
    /// before the relocation window has passed since the last move.
    pub fn relocate_platform<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Position, MazeError> {
        const ACTION: &str = "relocate platform";
        if self.config.platform_centered {
            return Err(MazeError::illegal(ACTION, "platform is fixed at the center"));
        }
        if self.phase == TrialPhase::InProgress {
            return Err(MazeError::illegal(ACTION, "a trial is in progress"));
        }
        if self.trials_since_relocation <= RELOCATION_WINDOW {
            return Err(MazeError::illegal(
                ACTION,
                "too few trials since the last relocation",
            ));
        }
        self.place_platform(rng, true);
        self.trials_since_relocation = 0;
        debug!(platform = %self.platform, "platform relocated");
        Ok(self.platform)
    }

    /// Takes the platform out of the pool for the rest of the current trial.
    pub fn remove_platform(&mut self) -> Result<(), MazeError> {
        const ACTION: &str = "remove platform";
        if !self.config.removal_probe {
            return Err(MazeError::illegal(ACTION, "removal probe is not enabled"));
        }
        if self.phase != TrialPhase::InProgress {
            return Err(MazeError::illegal(ACTION, "no trial in progress"));
        }
        self.platform_removed = true;
        Ok(())
    }

    /// Ends a trial without the platform being found and takes the mouse out.
    pub fn abandon_trial(&mut self) -> Result<(), MazeError> {
        if self.phase != TrialPhase::InProgress {
            return Err(MazeError::illegal("abandon trial", "no trial in progress"));
        }
        self.phase = TrialPhase::Idle;
        self.mouse = None;
        Ok(())
    }

    /// Returns the arena to a fresh board: new platform draw, counters cleared.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.platform_removed = false;
        self.mouse = None;
        self.phase = TrialPhase::Idle;
        self.trials_started = 0;
        self.trials_since_relocation = 0;
        self.moves_in_trial = 0;
        self.quadrant_counts = [0; 4];
        self.place_platform(rng, false);
    }

    /// Quadrant visits indexed by [`Quadrant::index`].
    #[must_use]
    pub const fn quadrant_counts(&self) -> [u32; 4] {
        self.quadrant_counts
    }

    /// Relation of each quadrant to the platform's quadrant, or `None` when
    /// the platform sits on a centre line.
    #[must_use]
    pub fn quadrant_relations(&self) -> Option<[QuadrantRelation; 4]> {
        let target = Quadrant::of(self.platform, self.bounds)?;
        Some(Quadrant::ALL.map(|q| QuadrantRelation::between(q, target)))
    }

    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        let mut cells = vec![Cell::Empty; self.bounds.cell_count()];
        if !self.platform_removed {
            cells[self.bounds.index(self.platform)] = Cell::Platform;
        }
        if let Some(mouse) = self.mouse {
            let idx = self.bounds.index(mouse);
            cells[idx] = if self.phase == TrialPhase::Found {
                Cell::Found
            } else {
                Cell::Mouse
            };
        }
        GridSnapshot {
            bounds: self.bounds,
            cells,
            phase: self.phase,
            moves_in_trial: self.moves_in_trial,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The platform cell, or `None` while removed for a probe.
    #[must_use]
    pub const fn platform(&self) -> Option<Position> {
        if self.platform_removed {
            None
        } else {
            Some(self.platform)
        }
    }

    /// Where the platform is hidden, including while it is removed.
    #[must_use]
    pub const fn platform_cell(&self) -> Position {
        self.platform
    }

    #[must_use]
    pub fn start_positions(&self) -> &[Position] {
        &self.starts
    }

    #[must_use]
    pub const fn mouse(&self) -> Option<Position> {
        self.mouse
    }

    #[must_use]
    pub const fn phase(&self) -> TrialPhase {
        self.phase
    }

    #[must_use]
    pub const fn trials_started(&self) -> u32 {
        self.trials_started
    }

    #[must_use]
    pub const fn moves_in_trial(&self) -> usize {
        self.moves_in_trial
    }
}
