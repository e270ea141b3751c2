use rand::SeedableRng;
use watermaze_rust::simulation::config::HeuristicConfig;
use watermaze_rust::simulation::error::MazeError;
use watermaze_rust::simulation::geometry::{Bounds, Direction, Position, Region};
use watermaze_rust::simulation::policy::tables::{uniform_weights, SymmetryClass, SymmetryTable};
use watermaze_rust::simulation::policy::{
    DirectionWeights, HeuristicPolicy, MazeRng, Policy,
};

const TOL: f64 = 1e-9;

fn expect(pairs: &[(Direction, f64)]) -> DirectionWeights {
    let mut w: DirectionWeights = [None; 8];
    for &(d, p) in pairs {
        w[d.index()] = Some(p);
    }
    w
}

fn mass(weights: &DirectionWeights) -> f64 {
    weights.iter().flatten().sum()
}

// ============== Remap Tables Per Symmetry Class ==============

#[test]
fn test_table_length_must_match_class() {
    let err = SymmetryTable::from_entries(SymmetryClass::CornerSymmetric, vec![50.0, 25.0, 25.0])
        .unwrap_err();
    assert!(matches!(err, MazeError::InvalidConfiguration(_)));
}

#[test]
fn test_open_remap_toward_north() {
    use Direction::*;
    let t = SymmetryTable::from_entries(SymmetryClass::Open, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    assert_eq!(
        t.remap(Region::Open, N),
        expect(&[(N, 1.0), (NE, 2.0), (E, 3.0), (SE, 4.0), (S, 5.0), (SW, 4.0), (W, 3.0), (NW, 2.0)])
    );
}

#[test]
fn test_open_remap_wraps_around_north() {
    use Direction::*;
    let t = SymmetryTable::from_entries(SymmetryClass::Open, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    assert_eq!(
        t.remap(Region::Open, NW),
        expect(&[(NW, 1.0), (N, 2.0), (W, 2.0), (NE, 3.0), (SW, 3.0), (E, 4.0), (S, 4.0), (SE, 5.0)])
    );
}

#[test]
fn test_corner_symmetric_remap() {
    use Direction::*;
    let t = SymmetryTable::from_entries(SymmetryClass::CornerSymmetric, vec![7.0, 3.0]).unwrap();
    // Top-left corner opens to the south-east.
    assert_eq!(
        t.remap(Region::Corner(SE), SE),
        expect(&[(SE, 7.0), (E, 3.0), (S, 3.0)])
    );
}

#[test]
fn test_corner_asymmetric_remap() {
    use Direction::*;
    let t = SymmetryTable::from_entries(SymmetryClass::CornerAsymmetric, vec![6.0, 3.0, 1.0]).unwrap();
    assert_eq!(
        t.remap(Region::Corner(SE), E),
        expect(&[(E, 6.0), (SE, 3.0), (S, 1.0)])
    );
    // Bottom-right corner, target straight north: the shared north entry is
    // only counted once.
    assert_eq!(
        t.remap(Region::Corner(NW), N),
        expect(&[(N, 6.0), (NW, 3.0), (W, 1.0)])
    );
    assert_eq!(
        t.remap(Region::Corner(NW), W),
        expect(&[(W, 6.0), (NW, 3.0), (N, 1.0)])
    );
}

#[test]
fn test_edge_symmetric_remap() {
    use Direction::*;
    let t = SymmetryTable::from_entries(SymmetryClass::EdgeSymmetric, vec![5.0, 2.0, 1.0]).unwrap();
    // Top edge opens to the south.
    assert_eq!(
        t.remap(Region::Edge(S), S),
        expect(&[(S, 5.0), (SE, 2.0), (SW, 2.0), (E, 1.0), (W, 1.0)])
    );
}

#[test]
fn test_edge_semi_asymmetric_remap() {
    use Direction::*;
    let t =
        SymmetryTable::from_entries(SymmetryClass::EdgeSemiAsymmetric, vec![5.0, 3.0, 2.0, 1.0]).unwrap();
    assert_eq!(
        t.remap(Region::Edge(S), SE),
        expect(&[(SE, 5.0), (E, 3.0), (S, 3.0), (SW, 2.0), (W, 1.0)])
    );
    // Left edge opens to the east; target north-east.
    assert_eq!(
        t.remap(Region::Edge(E), NE),
        expect(&[(NE, 5.0), (N, 3.0), (E, 3.0), (SE, 2.0), (S, 1.0)])
    );
}

#[test]
fn test_edge_asymmetric_remap() {
    use Direction::*;
    let t = SymmetryTable::from_entries(
        SymmetryClass::EdgeAsymmetric,
        vec![5.0, 4.0, 3.0, 2.0, 1.0],
    ).unwrap();
    assert_eq!(
        t.remap(Region::Edge(S), E),
        expect(&[(E, 5.0), (SE, 4.0), (S, 3.0), (SW, 2.0), (W, 1.0)])
    );
    // Bottom edge opens to the north; target west runs along the wall.
    assert_eq!(
        t.remap(Region::Edge(N), W),
        expect(&[(W, 5.0), (NW, 4.0), (N, 3.0), (NE, 2.0), (E, 1.0)])
    );
}

#[test]
fn test_uniform_weights_per_region() {
    assert_eq!(mass(&uniform_weights(Region::Open)), 100.0);
    let corner = uniform_weights(Region::Corner(Direction::SW));
    assert_eq!(corner.iter().flatten().count(), 3);
    assert_eq!(corner[Direction::N.index()], None);
    assert_eq!(uniform_weights(Region::Edge(Direction::N)).iter().flatten().count(), 5);
}

// ============== Policy Behaviour ==============

fn centre_policy(memory: f64) -> HeuristicPolicy {
    HeuristicPolicy::new(
        HeuristicConfig {
            memory_quality: memory,
        },
        Bounds::new(7, 7),
        Position::new(3, 3),
    )
    .unwrap()
}

#[test]
fn test_probabilities_mask_off_grid_directions() {
    let policy = centre_policy(50.0);
    for pos in Bounds::new(7, 7).cells() {
        let probs = policy.move_probabilities(pos).unwrap();
        for d in Direction::ALL {
            let on_grid = Bounds::new(7, 7).neighbor(pos, d).is_some();
            assert_eq!(probs[d.index()].is_some(), on_grid, "{pos} {d}");
        }
        assert!((mass(&probs) - 100.0).abs() < 0.01, "{pos}");
    }
}

#[test]
fn test_reinforcement_favours_platform_direction() {
    let mut policy = centre_policy(50.0);
    let before = policy.move_probabilities(Position::new(1, 1)).unwrap();
    policy.end_trial().unwrap();
    let after = policy.move_probabilities(Position::new(1, 1)).unwrap();
    let se = Direction::SE.index();
    let nw = Direction::NW.index();
    assert!(after[se] > before[se]);
    assert!(after[nw] < before[nw]);
    assert!((mass(&after) - 100.0).abs() < TOL);
}

#[test]
fn test_zero_memory_never_learns() {
    let mut policy = centre_policy(0.0);
    let before = policy.tables().clone();
    for _ in 0..10 {
        policy.end_trial().unwrap();
    }
    assert_eq!(policy.tables(), &before);
}

#[test]
fn test_platform_change_redirects_memory() {
    let mut policy = centre_policy(100.0);
    policy.platform_changed(Some(Position::new(0, 6))).unwrap();
    assert_eq!(
        policy.remembered_direction(Position::new(6, 0)).unwrap(),
        Some(Direction::NE)
    );
    policy.platform_changed(None).unwrap();
    assert_eq!(
        policy.remembered_direction(Position::new(6, 0)).unwrap(),
        Some(Direction::NE)
    );
}

#[test]
fn test_platform_outside_grid_is_an_error() {
    let mut policy = centre_policy(100.0);
    let err = policy
        .platform_changed(Some(Position::new(9, 2)))
        .unwrap_err();
    assert!(matches!(err, MazeError::OutOfBounds { row: 9, col: 2, .. }));
    assert_eq!(
        policy.remembered_direction(Position::new(0, 0)).unwrap(),
        Some(Direction::SE)
    );
}

#[test]
fn test_walks_never_leave_grid() {
    let mut policy = centre_policy(30.0);
    let bounds = Bounds::new(7, 7);
    let mut rng = MazeRng::seed_from_u64(77);
    policy.begin_trial(Position::new(6, 6));
    for _ in 0..500 {
        policy.next_direction(&mut rng).unwrap();
        assert!(bounds.contains(policy.position()));
    }
}
