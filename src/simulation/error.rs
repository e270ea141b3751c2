//! Error taxonomy for the water-maze engine.

use thiserror::Error;

/// Errors produced by the arena, the policies and the experiment runner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MazeError {
    /// A parameter is outside its accepted range. Raised before any engine is built.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An operation was attempted in a state that does not allow it.
    #[error("cannot {action}: {reason}")]
    IllegalStateTransition {
        action: &'static str,
        reason: &'static str,
    },
    /// A coordinate fell outside the grid. Indicates a geometry bug.
    #[error("position ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },
}

impl MazeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) const fn illegal(action: &'static str, reason: &'static str) -> Self {
        Self::IllegalStateTransition { action, reason }
    }

    /// True for errors the shell may recover from by asking again.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::IllegalStateTransition { .. })
    }
}
