//! Aggregation of experiment results.

use std::fmt;

use serde::Serialize;

use crate::simulation::environment::QuadrantRelation;

/// Element-wise mean of equally long series.
///
/// Shorter series are treated as zero-padded; an empty input gives an empty
/// result.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Move counts and iteration counts are small
pub fn mean_series(series: &[Vec<usize>]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    let len = series.iter().map(Vec::len).max().unwrap_or(0);
    let mut totals = vec![0.0; len];
    for run in series {
        for (total, &moves) in totals.iter_mut().zip(run) {
            *total += moves as f64;
        }
    }
    let n = series.len() as f64;
    totals.into_iter().map(|t| t / n).collect()
}

/// Least-squares slope of `ys` against `1..=len`. `None` for fewer than two points.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn regression_slope(ys: &[f64]) -> Option<f64> {
    if ys.len() < 2 {
        return None;
    }
    let n = ys.len() as f64;
    let mean_x = (n + 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (num, den) = ys
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &y)| {
            let dx = (i + 1) as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });
    Some(num / den)
}

/// Averaged moves per trial over many independent iterations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchReport {
    pub policy: &'static str,
    pub iterations: usize,
    pub mean_moves: Vec<f64>,
    pub slope: Option<f64>,
    /// Trial number (1-based) after which the platform was relocated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocated_after: Option<usize>,
}

impl BatchReport {
    #[must_use]
    pub fn new(policy: &'static str, iterations: usize, mean_moves: Vec<f64>) -> Self {
        let slope = regression_slope(&mean_moves);
        Self {
            policy,
            iterations,
            mean_moves,
            slope,
            relocated_after: None,
        }
    }

    #[must_use]
    pub fn with_relocation(mut self, after: usize) -> Self {
        self.relocated_after = Some(after);
        self
    }

    #[must_use]
    pub fn trials(&self) -> usize {
        self.mean_moves.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} mouse, {} trials averaged over {} iterations",
            self.policy,
            self.trials(),
            self.iterations
        )?;
        for (i, moves) in self.mean_moves.iter().enumerate() {
            let marker = if self.relocated_after == Some(i) {
                "  <- platform moved"
            } else {
                ""
            };
            writeln!(f, "trial {:>4}: {moves:>9.3}{marker}", i + 1)?;
        }
        match self.slope {
            Some(slope) => write!(f, "trend: {slope:+.4} moves per trial"),
            None => write!(f, "trend: n/a"),
        }
    }
}

/// Average probe-trial visits per quadrant, relative to the platform's quadrant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct QuadrantReport {
    pub adjacent_left: f64,
    pub target: f64,
    pub adjacent_right: f64,
    pub opposite: f64,
}

impl QuadrantReport {
    /// Files raw per-quadrant counts under their relation to the target.
    #[must_use]
    pub fn from_counts(counts: [u32; 4], relations: [QuadrantRelation; 4]) -> Self {
        let mut report = Self::default();
        for (count, relation) in counts.into_iter().zip(relations) {
            *report.slot(relation) += f64::from(count);
        }
        report
    }

    fn slot(&mut self, relation: QuadrantRelation) -> &mut f64 {
        match relation {
            QuadrantRelation::AdjacentLeft => &mut self.adjacent_left,
            QuadrantRelation::Target => &mut self.target,
            QuadrantRelation::AdjacentRight => &mut self.adjacent_right,
            QuadrantRelation::Opposite => &mut self.opposite,
        }
    }

    #[must_use]
    pub fn get(&self, relation: QuadrantRelation) -> f64 {
        match relation {
            QuadrantRelation::AdjacentLeft => self.adjacent_left,
            QuadrantRelation::Target => self.target,
            QuadrantRelation::AdjacentRight => self.adjacent_right,
            QuadrantRelation::Opposite => self.opposite,
        }
    }

    /// Values in report order: A/L, TR, A/R, OP.
    #[must_use]
    pub const fn ordered(&self) -> [(QuadrantRelation, f64); 4] {
        [
            (QuadrantRelation::AdjacentLeft, self.adjacent_left),
            (QuadrantRelation::Target, self.target),
            (QuadrantRelation::AdjacentRight, self.adjacent_right),
            (QuadrantRelation::Opposite, self.opposite),
        ]
    }

    #[must_use]
    pub fn combined(self, other: Self) -> Self {
        Self {
            adjacent_left: self.adjacent_left + other.adjacent_left,
            target: self.target + other.target,
            adjacent_right: self.adjacent_right + other.adjacent_right,
            opposite: self.opposite + other.opposite,
        }
    }

    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            adjacent_left: self.adjacent_left * factor,
            target: self.target * factor,
            adjacent_right: self.adjacent_right * factor,
            opposite: self.opposite * factor,
        }
    }
}

impl fmt::Display for QuadrantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self
            .ordered()
            .iter()
            .map(|(relation, value)| format!("{} {value:.3}", relation.label()))
            .collect();
        write!(f, "{}", cells.join(" | "))
    }
}
