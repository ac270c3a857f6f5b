use serde::{Deserialize, Serialize};

use super::model::SampleSet;
use crate::error::{ConversionError, Result};

// ---------------------------------------------------------------------------
// Filter bounds on the Euclidean distance column
// ---------------------------------------------------------------------------

/// Optional closed interval applied to the distance column before fitting.
///
/// A missing bound means "no constraint on that side". Both bounds are
/// finite and non-negative, and `lower <= upper` when both are set.
/// Deserialization goes through [`FilterBounds::new`] and checks the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct FilterBounds {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl FilterBounds {
    /// No bounds: every sample is selected.
    pub const NONE: FilterBounds = FilterBounds {
        lower: None,
        upper: None,
    };

    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Result<Self> {
        if let Some(l) = lower {
            check_bound(l, "lower")?;
        }
        if let Some(u) = upper {
            check_bound(u, "upper")?;
        }
        if let (Some(l), Some(u)) = (lower, upper) {
            if l > u {
                return Err(ConversionError::InvalidArgument(format!(
                    "lower limit {l} is greater than upper limit {u}"
                )));
            }
        }
        Ok(FilterBounds { lower, upper })
    }

    /// Parse bounds typed as text. Blank or missing text means no bound.
    pub fn parse(lower: Option<&str>, upper: Option<&str>) -> Result<Self> {
        Self::new(parse_bound(lower, "lower")?, parse_bound(upper, "upper")?)
    }

    pub fn lower(&self) -> Option<f64> {
        self.lower
    }

    pub fn upper(&self) -> Option<f64> {
        self.upper
    }

    /// Whether `distance` lies within the bounds.
    pub fn contains(&self, distance: f64) -> bool {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => distance >= l && distance <= u,
            (Some(l), None) => distance >= l,
            (None, Some(u)) => distance <= u,
            (None, None) => true,
        }
    }
}

/// Unchecked wire form of [`FilterBounds`].
#[derive(Deserialize)]
struct RawBounds {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl TryFrom<RawBounds> for FilterBounds {
    type Error = ConversionError;

    fn try_from(raw: RawBounds) -> Result<Self> {
        FilterBounds::new(raw.lower, raw.upper)
    }
}

fn check_bound(v: f64, which: &str) -> Result<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(ConversionError::InvalidArgument(format!(
            "{which} limit must be a finite non-negative number, got {v}"
        )));
    }
    Ok(())
}

fn parse_bound(text: Option<&str>, which: &str) -> Result<Option<f64>> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    text.parse::<f64>().map(Some).map_err(|_| {
        ConversionError::InvalidArgument(format!("{which} limit '{text}' is not a number"))
    })
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Return indices of samples whose distance passes the bounds, in order.
pub fn selected_indices(samples: &SampleSet, bounds: &FilterBounds) -> Vec<usize> {
    samples
        .distance()
        .iter()
        .enumerate()
        .filter(|&(_, &d)| bounds.contains(d))
        .map(|(i, _)| i)
        .collect()
}

/// Apply the bounds to both columns. Fails when nothing survives.
pub fn apply_bounds(samples: &SampleSet, bounds: &FilterBounds) -> Result<SampleSet> {
    let indices = selected_indices(samples, bounds);
    if indices.is_empty() {
        return Err(ConversionError::DataFormat(format!(
            "no samples left after filtering {} links with {bounds:?}",
            samples.len()
        )));
    }
    Ok(samples.select(&indices))
}
