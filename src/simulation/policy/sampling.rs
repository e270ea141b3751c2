//! Weighted direction sampling shared by both mice.

use rand::Rng;

use crate::simulation::geometry::{Direction, NUM_DIRS};
use crate::simulation::params::round_to;

/// Probability per absolute direction, indexed by [`Direction::index`].
/// `None` marks a direction that is not applicable (it would leave the grid),
/// which is distinct from a very small probability.
pub type DirectionWeights = [Option<f64>; NUM_DIRS];

/// Weights on a percentage scale (heuristic tables).
pub const PERCENT: f64 = 100.0;
/// Weights on a unit scale (softmax probabilities).
pub const UNIT: f64 = 1.0;

/// Walks the weights N→NW accumulating applicable mass and returns the first
/// direction whose running sum reaches `draw`.
///
/// If rounding leaves mass unconsumed, the last applicable direction (NW
/// whenever NW is applicable) is returned. Returns `None` only when every
/// direction is masked.
#[must_use]
pub fn decide_direction(weights: &DirectionWeights, draw: f64) -> Option<Direction> {
    let mut running = 0.0;
    let mut last = None;
    for (idx, weight) in weights.iter().enumerate() {
        let Some(w) = weight else { continue };
        running += w;
        let dir = Direction::from_index(idx);
        if draw <= running {
            return Some(dir);
        }
        last = Some(dir);
    }
    last
}

/// Draws a uniform value in `[0, scale]`, rounded to the working precision,
/// and resolves it with [`decide_direction`].
pub fn sample_direction<R: Rng + ?Sized>(
    weights: &DirectionWeights,
    scale: f64,
    rng: &mut R,
) -> Option<Direction> {
    let draw = round_to(rng.random_range(0.0..=scale));
    decide_direction(weights, draw)
}
