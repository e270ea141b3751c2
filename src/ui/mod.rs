//! Interactive step-through console.
//!
//! [`ShellState`] holds everything the dashboard shows and turns key presses
//! into session calls. It never touches the terminal, so the binary owns the
//! draw loop and tests can drive the shell directly.

pub mod board;
pub mod render;

use std::time::Duration;

use crate::simulation::environment::TrialPhase;
use crate::simulation::error::MazeError;
use crate::simulation::experiment::Session;

/// Pause between animated moves while the mouse has not yet learned anything.
pub const FIRST_TRIAL_DELAY: Duration = Duration::from_millis(100);
/// Pause between animated moves once at least one trial has been completed.
pub const TRIAL_DELAY: Duration = Duration::from_millis(500);

/// Menu actions of the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    NewTrial,
    Move,
    Simulate,
    Relocate,
    Reset,
    Quit,
}

impl Command {
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'n' => Some(Self::NewTrial),
            'm' => Some(Self::Move),
            's' => Some(Self::Simulate),
            'r' => Some(Self::Relocate),
            'x' => Some(Self::Reset),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

pub struct ShellState {
    session: Session,
    status: String,
    simulating: bool,
}

impl ShellState {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            status: String::from("press n to start a trial"),
            simulating: false,
        }
    }

    /// Applies a menu action. Returns `false` when the shell should exit.
    pub fn apply(&mut self, command: Command) -> Result<bool, MazeError> {
        match command {
            Command::NewTrial => {
                self.status = if self.session.start_trial() {
                    format!("trial {} started", self.session.arena().trials_started())
                } else {
                    "a trial is already in progress".to_owned()
                };
            }
            Command::Move => {
                if self.session.step_move()? {
                    self.status = self.after_move();
                } else {
                    self.status = "start a trial first".to_owned();
                }
            }
            Command::Simulate => {
                if self.session.arena().can_move() {
                    self.simulating = true;
                    self.status = "simulating...".to_owned();
                } else {
                    self.status = "start a trial first".to_owned();
                }
            }
            Command::Relocate => {
                self.status = if self.session.relocate_platform()? {
                    "platform moved".to_owned()
                } else {
                    "platform cannot be moved now".to_owned()
                };
            }
            Command::Reset => {
                self.session.reset()?;
                self.simulating = false;
                self.status = "board reset".to_owned();
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Advances an animated trial by one move.
    pub fn tick(&mut self) -> Result<(), MazeError> {
        if !self.simulating {
            return Ok(());
        }
        if self.session.step_move()? {
            self.status = self.after_move();
        }
        if !self.session.arena().can_move() {
            self.simulating = false;
        }
        Ok(())
    }

    fn after_move(&self) -> String {
        let arena = self.session.arena();
        if arena.phase() == TrialPhase::Found {
            format!("found the platform in {} moves", arena.moves_in_trial())
        } else {
            format!("move {}", arena.moves_in_trial())
        }
    }

    /// Delay before the next animated move.
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        if self.session.trials_completed() == 0 {
            FIRST_TRIAL_DELAY
        } else {
            TRIAL_DELAY
        }
    }

    #[must_use]
    pub fn hud(&self) -> String {
        let last = self
            .session
            .moves_per_trial()
            .last()
            .map_or_else(|| "-".to_owned(), ToString::to_string);
        format!(
            "{} | trials {} | last {} | {} | {}",
            self.session.policy().name(),
            self.session.trials_completed(),
            last,
            self.session.arena().phase().label(),
            self.session.policy().describe()
        )
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub const fn is_simulating(&self) -> bool {
        self.simulating
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}
