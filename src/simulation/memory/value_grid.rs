//! Per-cell value table for the Q-learning mouse.
//!
//! Values start at zero and only change through [`ValueGrid::set`] (the goal
//! cell) and [`ValueGrid::update`] (temporal-difference step along a path).

use crate::simulation::error::MazeError;
use crate::simulation::geometry::{Bounds, Direction, Position, NUM_DIRS};

/// A learned value for every cell, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueGrid {
    bounds: Bounds,
    values: Vec<f64>,
}

impl ValueGrid {
    /// Creates a grid of zeros covering `bounds`.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            values: vec![0.0; bounds.cell_count()],
        }
    }

    /// Value at `pos`.
    pub fn get(&self, pos: Position) -> Result<f64, MazeError> {
        let pos = self.bounds.check(pos)?;
        Ok(self.values[self.bounds.index(pos)])
    }

    pub fn set(&mut self, pos: Position, value: f64) -> Result<(), MazeError> {
        let pos = self.bounds.check(pos)?;
        let idx = self.bounds.index(pos);
        self.values[idx] = value;
        Ok(())
    }

    /// Values of the eight neighbours of `pos`, indexed by direction.
    /// Neighbours off the grid are `None`.
    pub fn neighbor_values(&self, pos: Position) -> Result<[Option<f64>; NUM_DIRS], MazeError> {
        let pos = self.bounds.check(pos)?;
        Ok(Direction::ALL.map(|d| {
            self.bounds
                .neighbor(pos, d)
                .map(|n| self.values[self.bounds.index(n)])
        }))
    }

    /// Largest value among the in-bounds neighbours of `pos`, never below zero.
    pub fn max_neighbor(&self, pos: Position) -> Result<f64, MazeError> {
        Ok(self
            .neighbor_values(pos)?
            .into_iter()
            .flatten()
            .fold(0.0, f64::max))
    }

    /// Moves the value at `pos` toward the discounted best neighbour:
    /// `v ← v + α(γ·max_neighbour − v)`. Returns the new value.
    pub fn update(&mut self, pos: Position, alpha: f64, gamma: f64) -> Result<f64, MazeError> {
        let best = self.max_neighbor(pos)?;
        let idx = self.bounds.index(pos);
        let current = self.values[idx];
        let next = current + alpha * (gamma * best - current);
        self.values[idx] = next;
        Ok(next)
    }

    /// Largest value anywhere on the grid.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let grid = ValueGrid::new(Bounds::new(4, 5));
        assert_eq!(grid.max(), 0.0);
        assert_eq!(grid.get(Position::new(3, 4)).unwrap(), 0.0);
        assert!(grid.get(Position::new(4, 0)).is_err());
    }

    #[test]
    fn test_corner_has_three_neighbours() {
        let mut grid = ValueGrid::new(Bounds::new(3, 3));
        grid.set(Position::new(1, 1), 4.0).unwrap();
        let values = grid.neighbor_values(Position::new(0, 0)).unwrap();
        assert_eq!(values.iter().flatten().count(), 3);
        assert_eq!(values[Direction::SE.index()], Some(4.0));
        assert_eq!(values[Direction::N.index()], None);
    }

    #[test]
    fn test_max_neighbor_excludes_self() {
        let mut grid = ValueGrid::new(Bounds::new(3, 3));
        grid.set(Position::new(1, 1), 9.0).unwrap();
        grid.set(Position::new(0, 1), 2.0).unwrap();
        assert_eq!(grid.max_neighbor(Position::new(1, 1)).unwrap(), 2.0);
    }

    #[test]
    fn test_update_moves_toward_discounted_best() {
        let mut grid = ValueGrid::new(Bounds::new(3, 3));
        grid.set(Position::new(0, 2), 80.0).unwrap();
        let v = grid.update(Position::new(0, 1), 0.5, 0.9).unwrap();
        assert!((v - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_is_reported() {
        let grid = ValueGrid::new(Bounds::new(3, 3));
        assert!(matches!(
            grid.get(Position::new(3, 0)),
            Err(MazeError::OutOfBounds { row: 3, col: 0, .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut grid = ValueGrid::new(Bounds::new(3, 3));
        grid.set(Position::new(2, 2), 1.5).unwrap();
        grid.reset();
        assert_eq!(grid.max(), 0.0);
    }
}
