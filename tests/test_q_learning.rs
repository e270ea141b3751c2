use rand::SeedableRng;
use watermaze_rust::simulation::config::QLearningConfig;
use watermaze_rust::simulation::error::MazeError;
use watermaze_rust::simulation::geometry::{Bounds, Direction, Position};
use watermaze_rust::simulation::memory::ValueGrid;
use watermaze_rust::simulation::params::LOWEST_TEMP;
use watermaze_rust::simulation::policy::{MazeRng, Policy, QLearningPolicy};

fn policy(bounds: Bounds) -> QLearningPolicy {
    QLearningPolicy::new(QLearningConfig::default(), bounds).unwrap()
}

// ============== Value Grid Tests ==============

#[test]
fn test_value_grid_update_uses_current_neighbours() {
    let mut grid = ValueGrid::new(Bounds::new(3, 3));
    grid.set(Position::new(2, 2), 10.0).unwrap();
    grid.update(Position::new(1, 1), 0.5, 1.0).unwrap();
    // (1,1) now holds 5.0 and becomes the best neighbour of (0,0).
    let v = grid.update(Position::new(0, 0), 1.0, 1.0).unwrap();
    assert!((v - 5.0).abs() < 1e-12);
}

// ============== Backpropagation Tests ==============

#[test]
fn test_backprop_most_recent_first() {
    let mut p = policy(Bounds::new(3, 3));
    let path = [
        Position::new(0, 0),
        Position::new(0, 1),
        Position::new(0, 0),
        Position::new(0, 1),
    ];
    p.backpropagate(&path, Position::new(0, 2)).unwrap();
    let v = |r, c| p.values().get(Position::new(r, c)).unwrap();
    assert!((v(0, 2) - 80.0).abs() < 1e-9);
    assert!((v(0, 1) - 36.0).abs() < 1e-9);
    assert!((v(0, 0) - 16.2).abs() < 1e-9);
    // Cells off the path are untouched.
    assert_eq!(v(2, 2), 0.0);
}

#[test]
fn test_repeated_cells_update_once() {
    let mut once = policy(Bounds::new(3, 3));
    let mut repeated = policy(Bounds::new(3, 3));
    let goal = Position::new(2, 2);
    once.backpropagate(&[Position::new(1, 1)], goal).unwrap();
    repeated
        .backpropagate(&[Position::new(1, 1); 5], goal)
        .unwrap();
    assert_eq!(once.values(), repeated.values());
}

// ============== Softmax Tests ==============

#[test]
fn test_softmax_prefers_higher_values() {
    let mut p = policy(Bounds::new(5, 5));
    p.backpropagate(&[], Position::new(1, 2)).unwrap();
    let probs = p.move_probabilities(Position::new(2, 2)).unwrap();
    let north = probs[Direction::N.index()].unwrap();
    let south = probs[Direction::S.index()].unwrap();
    assert!(north > south);
    let total: f64 = probs.iter().flatten().sum();
    assert!((total - 1.0).abs() < 0.01);
}

#[test]
fn test_softmax_is_greedy_when_cold() {
    let mut p = policy(Bounds::new(3, 3));
    for _ in 0..60 {
        p.begin_trial(Position::new(0, 0));
        p.end_trial().unwrap();
    }
    assert_eq!(p.temperature(), LOWEST_TEMP);
    let probs = p.move_probabilities(Position::new(1, 1)).unwrap();
    assert!(probs.iter().flatten().all(|w| w.is_finite()));
    assert_eq!(probs[Direction::NW.index()], Some(1.0));
    assert_eq!(probs[Direction::SE.index()], Some(0.0));
}

#[test]
fn test_end_trial_reports_goal_outside_grid() {
    let mut p = policy(Bounds::new(5, 5));
    p.begin_trial(Position::new(5, 1));
    let err = p.end_trial().unwrap_err();
    assert!(matches!(err, MazeError::OutOfBounds { row: 5, col: 1, .. }));
}

// ============== Temperature Tests ==============

#[test]
fn test_temperature_non_increasing_without_reset() {
    let mut p = policy(Bounds::new(7, 7));
    let mut rng = MazeRng::seed_from_u64(21);
    let mut last = p.temperature();
    for _ in 0..60 {
        p.begin_trial(Position::new(0, 0));
        // Short trials never trigger a reset.
        for _ in 0..5 {
            p.next_direction(&mut rng).unwrap();
        }
        p.end_trial().unwrap();
        assert!(p.temperature() <= last);
        assert!(p.temperature() >= LOWEST_TEMP);
        last = p.temperature();
    }
    assert_eq!(p.temperature_resets(), 0);
    assert_eq!(last, LOWEST_TEMP);
}

#[test]
fn test_no_reset_while_still_hot() {
    let mut p = policy(Bounds::new(7, 7));
    let mut rng = MazeRng::seed_from_u64(4);
    p.begin_trial(Position::new(0, 0));
    for _ in 0..200 {
        p.next_direction(&mut rng).unwrap();
    }
    assert_eq!(p.temperature_resets(), 0);
    assert_eq!(p.temperature(), 80.0);
    assert_eq!(p.path().len(), 200);
}

#[test]
fn test_describe_reports_state() {
    let p = policy(Bounds::new(7, 7));
    assert_eq!(p.name(), "q-learning");
    assert!(p.describe().contains("temperature 80.000"));
}
