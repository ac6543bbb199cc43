use crate::libs::correlation::Correlation;
use crate::libs::trait_data::AlignedVector;
use serde::{Deserialize, Serialize};

/// Square matrix of `1 - r` distances between traits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceMatrix {
    rows: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Wrap rows that are already known to form a square matrix
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// `true` if every row has `size()` entries
    pub fn is_square(&self) -> bool {
        let n = self.size();
        self.rows.iter().all(|row| row.len() == n)
    }

    /// `true` if `d[i][j] == d[j][i]` for all pairs
    pub fn is_symmetric(&self) -> bool {
        let n = self.size();
        (0..n).all(|i| (i + 1..n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Relaxed PHYLIP: a size line, then one named row per trait.
    pub fn to_phylip(&self, names: &[String]) -> String {
        let mut out = format!("{}\n", self.size());
        for (name, row) in names.iter().zip(self.rows.iter()) {
            let cells: Vec<String> = row.iter().map(|d| format!("{}", d)).collect();
            out += &format!("{}\t{}\n", name, cells.join("\t"));
        }
        out
    }
}

/// `1 - r`, floored at zero so coefficients a hair above 1 do not go negative.
///
/// No ceiling is applied: a coefficient below -1 yields a distance above 2.
pub fn corr_to_distance(coefficient: f64) -> f64 {
    let distance = 1.0 - coefficient;
    if distance < 0.0 {
        0.0
    } else {
        distance
    }
}

/// Compute the distance between every ordered pair of traits.
///
/// Both `(i, j)` and `(j, i)` are evaluated, so the result is symmetric only
/// when `corr` is.
pub fn build_distance_matrix<C: Correlation + ?Sized>(
    vectors: &[AlignedVector],
    corr: &C,
) -> DistanceMatrix {
    let rows = vectors
        .iter()
        .enumerate()
        .map(|(i, vi)| {
            vectors
                .iter()
                .enumerate()
                .map(|(j, vj)| {
                    if i == j {
                        0.0
                    } else {
                        corr_to_distance(corr.correlate(vi, vj).coefficient)
                    }
                })
                .collect()
        })
        .collect();

    DistanceMatrix { rows }
}
