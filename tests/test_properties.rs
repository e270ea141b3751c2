//! Property-based tests for the movement engines.

use proptest::prelude::*;

use watermaze_rust::simulation::config::QLearningConfig;
use watermaze_rust::simulation::geometry::{classify_position, Bounds, Position, Region};
use watermaze_rust::simulation::params::{round_to, LOWEST_TEMP};
use watermaze_rust::simulation::policy::tables::{ProbabilityTables, SymmetryClass};
use watermaze_rust::simulation::policy::{
    decide_direction, DirectionWeights, Policy, QLearningPolicy,
};

/// Strategy: learning fractions at the working precision.
fn fraction_strategy() -> impl Strategy<Value = f64> {
    (0u32..=1000).prop_map(|n| f64::from(n) / 1000.0)
}

/// Strategy: weights with at least one applicable direction.
fn weights_strategy() -> impl Strategy<Value = DirectionWeights> {
    prop::array::uniform8(prop::option::of(0.0..40.0f64))
        .prop_filter("at least one direction", |w| w.iter().any(Option::is_some))
}

fn path_strategy() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec((0usize..5, 0usize..5), 0..40)
        .prop_map(|cells| cells.into_iter().map(|(r, c)| Position::new(r, c)).collect())
}

proptest! {
    // 1. Tables keep full mass through any sequence of updates
    #[test]
    fn tables_conserve_mass(fractions in prop::collection::vec(fraction_strategy(), 0..30)) {
        let mut tables = ProbabilityTables::new();
        for f in fractions {
            tables.reinforce(f);
        }
        for class in SymmetryClass::ALL {
            let table = tables.get(class);
            prop_assert!((table.total() - 100.0).abs() < 1e-6, "{class:?}: {}", table.total());
            prop_assert!(table.entries().iter().all(|&e| e >= 0.0));
        }
    }

    // 2. Regions partition the grid
    #[test]
    fn regions_partition_grid(rows in 3usize..20, cols in 3usize..20) {
        let bounds = Bounds::new(rows, cols);
        let (mut corners, mut edges, mut open) = (0, 0, 0);
        for pos in bounds.cells() {
            match classify_position(pos, bounds).unwrap() {
                Region::Corner(_) => corners += 1,
                Region::Edge(_) => edges += 1,
                Region::Open => open += 1,
            }
        }
        prop_assert_eq!(corners, 4);
        prop_assert_eq!(edges, 2 * (rows - 2) + 2 * (cols - 2));
        prop_assert_eq!(open, (rows - 2) * (cols - 2));
    }

    // 3. Sampling never picks a masked direction
    #[test]
    fn decision_is_applicable(weights in weights_strategy(), draw in 0.0..=100.0f64) {
        let chosen = decide_direction(&weights, round_to(draw));
        prop_assert!(chosen.is_some());
        let d = chosen.unwrap();
        prop_assert!(weights[d.index()].is_some());
    }

    // 4. Temperature decays monotonically to the floor
    #[test]
    fn temperature_respects_floor(
        initial in 50.0..=100.0f64,
        decay in 0.0..=1.0f64,
        trials in 1usize..80,
    ) {
        let config = QLearningConfig {
            initial_temperature: initial,
            temperature_decay: decay,
            ..QLearningConfig::default()
        };
        let mut policy = QLearningPolicy::new(config, Bounds::new(5, 5)).unwrap();
        let mut last = policy.temperature();
        for _ in 0..trials {
            policy.begin_trial(Position::new(0, 0));
            policy.end_trial().unwrap();
            prop_assert!(policy.temperature() <= last);
            prop_assert!(policy.temperature() >= LOWEST_TEMP);
            last = policy.temperature();
        }
    }

    // 5. Each visited cell is updated once, from its latest visit
    #[test]
    fn backprop_updates_each_cell_once(path in path_strategy()) {
        let goal = Position::new(4, 4);
        let path: Vec<Position> = path.into_iter().filter(|&p| p != goal).collect();

        let mut latest_only = Vec::new();
        for (i, &cell) in path.iter().enumerate() {
            if !path[i + 1..].contains(&cell) {
                latest_only.push(cell);
            }
        }

        let mut full = QLearningPolicy::new(QLearningConfig::default(), Bounds::new(5, 5)).unwrap();
        let mut deduped = full.clone();
        full.backpropagate(&path, goal).unwrap();
        deduped.backpropagate(&latest_only, goal).unwrap();
        prop_assert_eq!(full.values(), deduped.values());
    }
}
