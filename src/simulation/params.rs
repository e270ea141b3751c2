//! Fixed simulation constants.

/// Decimal places kept for probabilities, temperatures and user parameters.
pub const ROUND_TO: i32 = 3;

/// Default arena dimensions (rows × cols).
pub const DEFAULT_ROWS: usize = 7;
pub const DEFAULT_COLS: usize = 7;

/// Smallest grid side that still has corners, edges and an interior.
pub const MIN_SIDE: usize = 3;

/// Lowest computational temperature reachable through decay.
pub const LOWEST_TEMP: f64 = 0.3;
/// Trials of decay after which a long search may reset the temperature.
pub const TRIAL_TEMP_RESET_THRESHOLD: i32 = 3;
/// Fraction of the cell count that counts as an unusually long search.
pub const MOVES_TEMP_RESET_FRACTION: f64 = 0.75;

/// Trials that must start after a relocation before the platform can move again.
pub const RELOCATION_WINDOW: u32 = 3;

/// Heuristic memory-quality range, in percent.
pub const MEMORY_QUALITY_RANGE: (f64, f64) = (0.0, 100.0);
/// Accepted initial temperature range for the value-learning mouse.
pub const INITIAL_TEMP_RANGE: (f64, f64) = (50.0, 100.0);

pub const DEFAULT_MEMORY_QUALITY: f64 = 50.0;
pub const DEFAULT_INITIAL_TEMP: f64 = 80.0;
pub const DEFAULT_TEMP_DECAY: f64 = 0.9;
pub const DEFAULT_DISCOUNT: f64 = 0.9;
pub const DEFAULT_LEARNING_RATE: f64 = 0.5;

pub const DEFAULT_SEED: u64 = 0x5EED_0F_3A2E;

/// Rounds `value` to [`ROUND_TO`] decimal places.
#[must_use]
pub fn round_to(value: f64) -> f64 {
    let factor = 10f64.powi(ROUND_TO);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_three_places() {
        assert_eq!(round_to(33.333_333), 33.333);
        assert_eq!(round_to(0.123_56), 0.124);
        assert_eq!(round_to(-1.0), -1.0);
    }
}
