//! Symmetry-class probability tables for the heuristic mouse.
//!
//! A table stores one percentage per angular distance from the remembered
//! direction (index 0 = toward the platform). Several absolute directions can
//! share a distance, so each class carries a multiplicity profile: how many
//! of the available directions sit at each distance. The table's mass is
//! `Σ multiplicity[i] * entry[i]`, which is kept at exactly 100.

use crate::simulation::error::MazeError;
use crate::simulation::geometry::{angular_distance, Direction, Region, NUM_DIRS};
use crate::simulation::params::round_to;
use crate::simulation::policy::sampling::{DirectionWeights, PERCENT};

/// Shape of the probability table that applies to a cell, given where the
/// remembered direction points relative to the region's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymmetryClass {
    /// Interior cell, all eight directions available.
    Open,
    /// Edge cell, remembered direction equals the facing.
    EdgeSymmetric,
    /// Edge cell, remembered direction one step off the facing.
    EdgeSemiAsymmetric,
    /// Edge cell, remembered direction runs along the wall.
    EdgeAsymmetric,
    /// Corner cell, remembered direction is the diagonal facing.
    CornerSymmetric,
    /// Corner cell, remembered direction runs along a wall.
    CornerAsymmetric,
}

impl SymmetryClass {
    pub const ALL: [SymmetryClass; 6] = [
        SymmetryClass::Open,
        SymmetryClass::EdgeSymmetric,
        SymmetryClass::EdgeSemiAsymmetric,
        SymmetryClass::EdgeAsymmetric,
        SymmetryClass::CornerSymmetric,
        SymmetryClass::CornerAsymmetric,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Directions available at each angular distance from the remembered direction.
    #[must_use]
    pub const fn multiplicity(self) -> &'static [u8] {
        match self {
            Self::Open => &[1, 2, 2, 2, 1],
            Self::EdgeSymmetric => &[1, 2, 2],
            Self::EdgeSemiAsymmetric => &[1, 2, 1, 1],
            Self::EdgeAsymmetric => &[1, 1, 1, 1, 1],
            Self::CornerSymmetric => &[1, 2],
            Self::CornerAsymmetric => &[1, 1, 1],
        }
    }

    #[must_use]
    pub const fn entry_count(self) -> usize {
        self.multiplicity().len()
    }

    /// Number of absolute directions the class spreads over.
    #[must_use]
    pub fn direction_count(self) -> u32 {
        self.multiplicity().iter().map(|&m| u32::from(m)).sum()
    }

    /// Class for a region whose remembered direction is `target`.
    ///
    /// `None` if `target` points out of the grid, which a platform inside the
    /// grid never produces.
    #[must_use]
    pub const fn for_region(region: Region, target: Direction) -> Option<Self> {
        match region {
            Region::Open => Some(Self::Open),
            Region::Edge(facing) => match angular_distance(target, facing) {
                0 => Some(Self::EdgeSymmetric),
                1 => Some(Self::EdgeSemiAsymmetric),
                2 => Some(Self::EdgeAsymmetric),
                _ => None,
            },
            Region::Corner(facing) => match angular_distance(target, facing) {
                0 => Some(Self::CornerSymmetric),
                1 => Some(Self::CornerAsymmetric),
                _ => None,
            },
        }
    }
}

/// Whether `direction` can be taken from a cell in `region`.
#[must_use]
pub const fn region_allows(region: Region, direction: Direction) -> bool {
    match region {
        Region::Open => true,
        Region::Edge(facing) => angular_distance(direction, facing) <= 2,
        Region::Corner(facing) => angular_distance(direction, facing) <= 1,
    }
}

/// One symmetry class's percentages by angular distance.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryTable {
    class: SymmetryClass,
    entries: Vec<f64>,
}

impl SymmetryTable {
    /// Equal probability for every available direction.
    #[must_use]
    pub fn uniform(class: SymmetryClass) -> Self {
        let each = round_to(PERCENT / f64::from(class.direction_count()));
        let mut table = Self {
            class,
            entries: vec![each; class.entry_count()],
        };
        table.absorb_residual();
        table
    }

    /// Builds a table from explicit entries, one per angular distance the
    /// class distinguishes.
    pub fn from_entries(class: SymmetryClass, entries: Vec<f64>) -> Result<Self, MazeError> {
        if entries.len() != class.entry_count() {
            return Err(MazeError::invalid(format!(
                "{class:?} table needs {} entries, got {}",
                class.entry_count(),
                entries.len()
            )));
        }
        Ok(Self { class, entries })
    }

    #[must_use]
    pub const fn class(&self) -> SymmetryClass {
        self.class
    }

    #[must_use]
    pub fn entries(&self) -> &[f64] {
        &self.entries
    }

    /// Percentage for a single direction at `distance` from the remembered direction.
    #[must_use]
    pub fn get(&self, distance: usize) -> f64 {
        self.entries[distance]
    }

    /// Probability mass over all absolute directions.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries
            .iter()
            .zip(self.class.multiplicity())
            .map(|(e, &m)| e * f64::from(m))
            .sum()
    }

    /// Shifts mass toward index 0 by `fraction` (0 = no learning, 1 = all of it).
    ///
    /// Walks from the far end inward. At each index the carried transfer is
    /// added, `fraction` of the result moves on and the rest stays. The
    /// per-direction transfer is rescaled by the ratio of direction counts
    /// between the two indices, which halves it where the table crosses its
    /// line of symmetry and doubles it when two sides merge into index 0.
    pub fn reinforce(&mut self, fraction: f64) {
        let mult = self.class.multiplicity();
        let mut carry = 0.0;
        for i in (1..self.entries.len()).rev() {
            let current = round_to(self.entries[i] + carry);
            let moved = round_to(current * fraction);
            self.entries[i] = round_to(current - moved);
            carry = moved * f64::from(mult[i]) / f64::from(mult[i - 1]);
        }
        self.absorb_residual();
    }

    /// Sets index 0 to whatever mass the other entries leave, so the total is 100.
    fn absorb_residual(&mut self) {
        let mult = self.class.multiplicity();
        let rest: f64 = self.entries[1..]
            .iter()
            .zip(&mult[1..])
            .map(|(e, &m)| e * f64::from(m))
            .sum();
        self.entries[0] = round_to((PERCENT - rest) / f64::from(mult[0]));
    }

    /// Places the table onto absolute directions for a cell in `region`
    /// whose remembered direction is `target`. Directions that leave the
    /// grid are `None`.
    #[must_use]
    pub fn remap(&self, region: Region, target: Direction) -> DirectionWeights {
        let mut weights: DirectionWeights = [None; NUM_DIRS];
        for d in Direction::ALL {
            if region_allows(region, d) {
                let distance = angular_distance(target, d);
                weights[d.index()] = self.entries.get(distance).copied();
            }
        }
        weights
    }
}

/// Uniform spread over the directions `region` allows.
#[must_use]
pub fn uniform_weights(region: Region) -> DirectionWeights {
    let mut weights: DirectionWeights = [None; NUM_DIRS];
    let available: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| region_allows(region, d))
        .collect();
    let each = round_to(PERCENT / available.len() as f64);
    for d in available {
        weights[d.index()] = Some(each);
    }
    weights
}

/// The full set of tables owned by one heuristic mouse.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityTables {
    tables: Vec<SymmetryTable>,
}

impl Default for ProbabilityTables {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbabilityTables {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: SymmetryClass::ALL
                .iter()
                .map(|&c| SymmetryTable::uniform(c))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, class: SymmetryClass) -> &SymmetryTable {
        &self.tables[class.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymmetryTable> {
        self.tables.iter()
    }

    /// Reinforces every table by the same fraction.
    pub fn reinforce(&mut self, fraction: f64) {
        for table in &mut self.tables {
            table.reinforce(fraction);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
