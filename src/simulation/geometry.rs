//! Grid coordinates, compass directions and region classification.
//!
//! Rows grow southward and columns grow eastward, so north is `(-1, 0)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::simulation::error::MazeError;

pub const NUM_DIRS: usize = 8;

/// One of the eight compass directions, ordered clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; NUM_DIRS] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Position of the direction in clockwise order, N = 0.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Direction::index`], wrapping modulo 8.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % NUM_DIRS]
    }

    /// Unit (row, col) step for this direction.
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::N => (-1, 0),
            Self::NE => (-1, 1),
            Self::E => (0, 1),
            Self::SE => (1, 1),
            Self::S => (1, 0),
            Self::SW => (1, -1),
            Self::W => (0, -1),
            Self::NW => (-1, -1),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row/col delta for a direction.
#[must_use]
pub const fn direction_to_delta(direction: Direction) -> (isize, isize) {
    direction.delta()
}

/// Shortest distance around the 8-direction ring, in `0..=4`.
#[must_use]
pub const fn angular_distance(a: Direction, b: Direction) -> usize {
    let diff = a.index().abs_diff(b.index());
    if diff > NUM_DIRS / 2 {
        NUM_DIRS - diff
    } else {
        diff
    }
}

/// A cell on the grid, zero-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance, the fewest 8-connected moves between cells.
    #[must_use]
    pub const fn chebyshev(self, other: Position) -> usize {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        if dr > dc {
            dr
        } else {
            dc
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangular grid extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub rows: usize,
    pub cols: usize,
}

impl Bounds {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.rows * self.cols
    }

    #[must_use]
    pub const fn contains(self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Row-major index of `pos`.
    #[must_use]
    pub const fn index(self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Fails with [`MazeError::OutOfBounds`] if `pos` is not on the grid.
    pub fn check(self, pos: Position) -> Result<Position, MazeError> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(self.out_of_bounds(pos.row as isize, pos.col as isize))
        }
    }

    /// The neighbour of `pos` one step in `direction`, if it is on the grid.
    #[must_use]
    pub fn neighbor(self, pos: Position, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Like [`Bounds::neighbor`] but reports the offending coordinate.
    pub fn step(self, pos: Position, direction: Direction) -> Result<Position, MazeError> {
        self.neighbor(pos, direction).ok_or_else(|| {
            let (dr, dc) = direction.delta();
            self.out_of_bounds(pos.row as isize + dr, pos.col as isize + dc)
        })
    }

    /// Directions that keep `pos` on the grid.
    pub fn available_directions(self, pos: Position) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |&d| self.neighbor(pos, d).is_some())
    }

    /// The four corners, clockwise from the top-left.
    #[must_use]
    pub const fn corners(self) -> [Position; 4] {
        [
            Position::new(0, 0),
            Position::new(0, self.cols - 1),
            Position::new(self.rows - 1, self.cols - 1),
            Position::new(self.rows - 1, 0),
        ]
    }

    /// The central cell (upper-left of the centre block for even sides).
    #[must_use]
    pub const fn center(self) -> Position {
        Position::new((self.rows - 1) / 2, (self.cols - 1) / 2)
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Position> {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Position::new(r, c)))
    }

    fn out_of_bounds(self, row: isize, col: isize) -> MazeError {
        MazeError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

/// Where a cell sits on the grid. Corners and edges carry the inward direction
/// they open toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Corner(Direction),
    Edge(Direction),
    Open,
}

/// Classifies `pos` as corner, edge or open interior.
pub fn classify_position(pos: Position, bounds: Bounds) -> Result<Region, MazeError> {
    let pos = bounds.check(pos)?;
    let last_row = bounds.rows - 1;
    let last_col = bounds.cols - 1;

    let region = match (pos.row, pos.col) {
        (0, 0) => Region::Corner(Direction::SE),
        (0, c) if c == last_col => Region::Corner(Direction::SW),
        (r, c) if r == last_row && c == last_col => Region::Corner(Direction::NW),
        (r, 0) if r == last_row => Region::Corner(Direction::NE),
        (0, _) => Region::Edge(Direction::S),
        (_, c) if c == last_col => Region::Edge(Direction::W),
        (r, _) if r == last_row => Region::Edge(Direction::N),
        (_, 0) => Region::Edge(Direction::E),
        _ => Region::Open,
    };
    Ok(region)
}

/// Compass direction from `from` straight toward `to`; `None` when they coincide.
#[must_use]
pub fn direction_toward(from: Position, to: Position) -> Option<Direction> {
    use std::cmp::Ordering::{Equal, Greater, Less};

    match (to.row.cmp(&from.row), to.col.cmp(&from.col)) {
        (Less, Less) => Some(Direction::NW),
        (Less, Equal) => Some(Direction::N),
        (Less, Greater) => Some(Direction::NE),
        (Equal, Less) => Some(Direction::W),
        (Equal, Equal) => None,
        (Equal, Greater) => Some(Direction::E),
        (Greater, Less) => Some(Direction::SW),
        (Greater, Equal) => Some(Direction::S),
        (Greater, Greater) => Some(Direction::SE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deltas_are_unit_steps() {
        for d in Direction::ALL {
            let (dr, dc) = direction_to_delta(d);
            assert!(dr.abs() <= 1 && dc.abs() <= 1);
            assert!((dr, dc) != (0, 0));
            assert_eq!(d.index() % 2 == 1, dr != 0 && dc != 0);
        }
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert_eq!(angular_distance(Direction::N, Direction::N), 0);
        assert_eq!(angular_distance(Direction::N, Direction::NW), 1);
        assert_eq!(angular_distance(Direction::NE, Direction::W), 3);
        assert_eq!(angular_distance(Direction::N, Direction::S), 4);
        assert_eq!(angular_distance(Direction::W, Direction::N), 2);
    }

    #[test]
    fn test_corner_facing_points_inward() {
        let b = Bounds::new(7, 7);
        assert_eq!(
            classify_position(Position::new(0, 0), b),
            Ok(Region::Corner(Direction::SE))
        );
        assert_eq!(
            classify_position(Position::new(6, 6), b),
            Ok(Region::Corner(Direction::NW))
        );
        assert_eq!(
            classify_position(Position::new(3, 6), b),
            Ok(Region::Edge(Direction::W))
        );
        assert_eq!(classify_position(Position::new(3, 3), b), Ok(Region::Open));
    }

    #[test]
    fn test_classify_out_of_bounds() {
        let b = Bounds::new(3, 4);
        assert!(matches!(
            classify_position(Position::new(3, 0), b),
            Err(MazeError::OutOfBounds { row: 3, .. })
        ));
    }

    #[test]
    fn test_direction_toward() {
        let c = Position::new(3, 3);
        assert_eq!(direction_toward(Position::new(0, 0), c), Some(Direction::SE));
        assert_eq!(direction_toward(Position::new(6, 3), c), Some(Direction::N));
        assert_eq!(direction_toward(c, c), None);
    }

    #[test]
    fn test_neighbor_respects_bounds() {
        let b = Bounds::new(3, 3);
        assert_eq!(b.neighbor(Position::new(0, 0), Direction::N), None);
        assert_eq!(
            b.neighbor(Position::new(0, 0), Direction::SE),
            Some(Position::new(1, 1))
        );
        assert_eq!(b.available_directions(Position::new(0, 0)).count(), 3);
        assert_eq!(b.available_directions(Position::new(1, 1)).count(), 8);
        assert!(b.step(Position::new(2, 2), Direction::E).is_err());
    }
}
