use crate::error::{ConversionError, Result};

// ---------------------------------------------------------------------------
// Column layout of a Graphab links table
// ---------------------------------------------------------------------------

/// Number of fields in every links-table row: `id_a, id_b, cost, distance`.
pub const LINK_COLUMNS: usize = 4;
/// Position of the cumulative cost column.
pub const COST_COLUMN: usize = 2;
/// Position of the Euclidean distance column.
pub const DISTANCE_COLUMN: usize = 3;

// ---------------------------------------------------------------------------
// SampleSet – paired (distance, cost) observations of one linkset
// ---------------------------------------------------------------------------

/// Paired observations taken from a links table, in file order.
///
/// `distance[i]` and `cost[i]` always describe the same link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    /// Euclidean distance between the two patches (`DistM`).
    distance: Vec<f64>,
    /// Cumulative least-cost path cost (`Dist`).
    cost: Vec<f64>,
}

impl SampleSet {
    /// Build a sample set from two equally long, non-negative columns.
    pub fn new(distance: Vec<f64>, cost: Vec<f64>) -> Result<Self> {
        if distance.len() != cost.len() {
            return Err(ConversionError::DataFormat(format!(
                "distance has {} values but cost has {}",
                distance.len(),
                cost.len()
            )));
        }
        for (i, (&d, &c)) in distance.iter().zip(&cost).enumerate() {
            check_value(d, i, "distance")?;
            check_value(c, i, "cost")?;
        }
        Ok(SampleSet { distance, cost })
    }

    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    /// Whether the set holds no links.
    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    /// Keep only the rows whose index is in `indices`, preserving order.
    pub fn select(&self, indices: &[usize]) -> SampleSet {
        SampleSet {
            distance: indices.iter().map(|&i| self.distance[i]).collect(),
            cost: indices.iter().map(|&i| self.cost[i]).collect(),
        }
    }
}

fn check_value(v: f64, row: usize, col: &str) -> Result<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(ConversionError::DataFormat(format!(
            "row {row}: {col} must be a finite non-negative number, got {v}"
        )));
    }
    Ok(())
}
