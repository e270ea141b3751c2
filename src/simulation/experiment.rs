//! Trial driver and batch experiments.
//!
//! A [`Session`] ties one arena, one policy and one random generator
//! together and exposes the step-level operations a console needs. The
//! experiment functions build many independent sessions and run them in
//! parallel with rayon, one seed per iteration.

use std::iter::FusedIterator;

use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::simulation::config::SimulationConfig;
use crate::simulation::environment::{Arena, GridSnapshot};
use crate::simulation::error::MazeError;
use crate::simulation::params::RELOCATION_WINDOW;
use crate::simulation::policy::{build_policy, MazeRng, Policy};
use crate::simulation::statistics::{mean_series, BatchReport, QuadrantReport};

/// Maps a refused state transition to `Ok(false)`; anything else is an error.
fn recoverable<T>(result: Result<T, MazeError>) -> Result<Option<T>, MazeError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable() => {
            debug!(%err, "request refused");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// One mouse in one maze.
pub struct Session {
    arena: Arena,
    policy: Box<dyn Policy>,
    rng: MazeRng,
    moves_per_trial: Vec<usize>,
}

impl Session {
    /// Builds a session seeded from the configuration.
    pub fn new(config: &SimulationConfig) -> Result<Self, MazeError> {
        Self::with_seed(config, config.seed_or_default())
    }

    pub fn with_seed(config: &SimulationConfig, seed: u64) -> Result<Self, MazeError> {
        config.validate()?;
        let mut rng = MazeRng::seed_from_u64(seed);
        let arena = Arena::new(config.arena, &mut rng)?;
        let policy = build_policy(&config.policy, arena.bounds(), arena.platform_cell())?;
        Ok(Self {
            arena,
            policy,
            rng,
            moves_per_trial: Vec::new(),
        })
    }

    /// Starts a trial. `false` if one is already in progress.
    pub fn start_trial(&mut self) -> bool {
        match self.arena.start_trial(&mut self.rng) {
            Ok(start) => {
                self.policy.begin_trial(start);
                true
            }
            Err(err) => {
                debug!(%err, "trial not started");
                false
            }
        }
    }

    /// Makes one move. `Ok(false)` if no trial is in progress.
    pub fn step_move(&mut self) -> Result<bool, MazeError> {
        if !self.arena.can_move() {
            return Ok(false);
        }
        let direction = self.policy.next_direction(&mut self.rng)?;
        let outcome = self.arena.move_mouse(direction)?;
        if outcome.found() {
            self.policy.end_trial()?;
            self.moves_per_trial.push(self.arena.moves_in_trial());
        }
        Ok(true)
    }

    /// Lazily plays the current trial, yielding the board after every move.
    ///
    /// Ends when the platform is found. Yields nothing if no trial is in
    /// progress or the platform has been removed.
    pub fn run_full_trial(&mut self) -> TrialRun<'_> {
        TrialRun {
            session: self,
            done: false,
        }
    }

    /// Starts a trial and plays it to the platform. Returns the move count.
    pub fn run_trial(&mut self) -> Result<usize, MazeError> {
        if !self.start_trial() {
            return Err(MazeError::illegal("run trial", "a trial is in progress"));
        }
        while self.arena.can_move() {
            self.step_move()?;
        }
        Ok(self.arena.moves_in_trial())
    }

    /// Moves the platform to another corner and tells the mouse.
    /// `false` if the arena refuses.
    pub fn relocate_platform(&mut self) -> Result<bool, MazeError> {
        let moved = recoverable(self.arena.relocate_platform(&mut self.rng))?;
        if let Some(platform) = moved {
            info!(%platform, "platform relocated");
            self.policy.platform_changed(Some(platform))?;
        }
        Ok(moved.is_some())
    }

    /// Removes the platform for a probe trial. `false` if the arena refuses.
    pub fn remove_platform(&mut self) -> Result<bool, MazeError> {
        let removed = recoverable(self.arena.remove_platform())?.is_some();
        if removed {
            self.policy.platform_changed(None)?;
        }
        Ok(removed)
    }

    /// Ends the current trial without a find. `false` if none is running.
    pub fn abandon_trial(&mut self) -> Result<bool, MazeError> {
        Ok(recoverable(self.arena.abandon_trial())?.is_some())
    }

    /// Fresh board and an untrained mouse.
    pub fn reset(&mut self) -> Result<(), MazeError> {
        self.arena.reset(&mut self.rng);
        self.policy.reset();
        self.moves_per_trial.clear();
        self.policy.platform_changed(self.arena.platform())
    }

    #[must_use]
    pub fn trials_completed(&self) -> usize {
        self.moves_per_trial.len()
    }

    #[must_use]
    pub fn moves_per_trial(&self) -> &[usize] {
        &self.moves_per_trial
    }

    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        self.arena.snapshot()
    }

    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }
}

/// Iterator returned by [`Session::run_full_trial`].
pub struct TrialRun<'a> {
    session: &'a mut Session,
    done: bool,
}

impl Iterator for TrialRun<'_> {
    type Item = Result<GridSnapshot, MazeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || !self.session.arena.can_move() || self.session.arena.platform().is_none()
        {
            self.done = true;
            return None;
        }
        match self.session.step_move() {
            Ok(_) => Some(Ok(self.session.snapshot())),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for TrialRun<'_> {}

fn check_counts(num_trials: usize, num_iterations: usize) -> Result<(), MazeError> {
    if num_trials == 0 || num_iterations == 0 {
        return Err(MazeError::invalid(
            "trial and iteration counts must be positive",
        ));
    }
    Ok(())
}

/// Seeds one session per iteration and collects what `run` returns.
fn run_iterations<T, F>(
    config: &SimulationConfig,
    num_iterations: usize,
    run: F,
) -> Result<Vec<T>, MazeError>
where
    T: Send,
    F: Fn(&mut Session) -> Result<T, MazeError> + Sync,
{
    let seed = config.seed_or_default();
    (0..num_iterations)
        .into_par_iter()
        .map(|i| {
            let mut session = Session::with_seed(config, seed.wrapping_add(i as u64))?;
            run(&mut session)
        })
        .collect()
}

/// Runs `num_trials` trials in each of `num_iterations` independent sessions
/// and averages the moves per trial.
pub fn run_batch(
    config: &SimulationConfig,
    num_trials: usize,
    num_iterations: usize,
) -> Result<BatchReport, MazeError> {
    check_counts(num_trials, num_iterations)?;
    info!(
        policy = config.policy.name(),
        num_trials, num_iterations, "batch started"
    );
    let runs = run_iterations(config, num_iterations, |session| {
        for _ in 0..num_trials {
            session.run_trial()?;
        }
        Ok(session.moves_per_trial().to_vec())
    })?;
    let report = BatchReport::new(config.policy.name(), num_iterations, mean_series(&runs));
    info!(slope = ?report.slope, "batch finished");
    Ok(report)
}

/// Trains for `num_trials`, moves the platform to another corner and runs
/// `num_trials` more. The platform starts in a corner regardless of the
/// arena configuration.
pub fn run_relocation_experiment(
    config: &SimulationConfig,
    num_trials: usize,
    num_iterations: usize,
) -> Result<BatchReport, MazeError> {
    check_counts(num_trials, num_iterations)?;
    if num_trials <= RELOCATION_WINDOW as usize {
        return Err(MazeError::invalid(format!(
            "relocation needs more than {RELOCATION_WINDOW} trials before the move, got {num_trials}"
        )));
    }
    let mut config = *config;
    config.arena.platform_centered = false;
    info!(
        policy = config.policy.name(),
        num_trials, num_iterations, "relocation experiment started"
    );

    let runs = run_iterations(&config, num_iterations, |session| {
        for _ in 0..num_trials {
            session.run_trial()?;
        }
        if !session.relocate_platform()? {
            return Err(MazeError::illegal(
                "relocate platform",
                "arena refused the relocation",
            ));
        }
        for _ in 0..num_trials {
            session.run_trial()?;
        }
        Ok(session.moves_per_trial().to_vec())
    })?;
    let report = BatchReport::new(config.policy.name(), num_iterations, mean_series(&runs))
        .with_relocation(num_trials);
    info!(slope = ?report.slope, "relocation experiment finished");
    Ok(report)
}

/// Trains for `num_trials`, then removes the platform and lets the mouse
/// swim `num_moves` moves while quadrant visits are counted. Visits are
/// averaged over iterations and reported relative to the platform's quadrant.
pub fn run_removal_probe(
    config: &SimulationConfig,
    num_trials: usize,
    num_iterations: usize,
    num_moves: usize,
) -> Result<QuadrantReport, MazeError> {
    check_counts(num_trials, num_iterations)?;
    if num_moves == 0 {
        return Err(MazeError::invalid("probe needs at least one move"));
    }
    let mut config = *config;
    config.arena.platform_centered = false;
    config.arena.removal_probe = true;
    info!(
        policy = config.policy.name(),
        num_trials, num_iterations, num_moves, "removal probe started"
    );

    let reports = run_iterations(&config, num_iterations, |session| {
        for _ in 0..num_trials {
            session.run_trial()?;
        }
        if !session.start_trial() || !session.remove_platform()? {
            return Err(MazeError::illegal("run probe", "probe trial refused"));
        }
        for _ in 0..num_moves {
            session.step_move()?;
        }
        let arena = session.arena();
        let relations = arena.quadrant_relations().ok_or_else(|| MazeError::illegal(
            "run probe",
            "platform is not inside a quadrant",
        ))?;
        let report = QuadrantReport::from_counts(arena.quadrant_counts(), relations);
        session.abandon_trial()?;
        Ok(report)
    })?;

    #[allow(clippy::cast_precision_loss)] // Iteration counts are small
    let scale = 1.0 / num_iterations as f64;
    let report = reports
        .into_iter()
        .fold(QuadrantReport::default(), QuadrantReport::combined)
        .scaled(scale);
    info!(%report, "removal probe finished");
    Ok(report)
}
