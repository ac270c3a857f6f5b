use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::SeriesColors;
use crate::data::filter::{apply_bounds, FilterBounds};
use crate::data::loader::load_links;
use crate::data::model::SampleSet;
use crate::error::{ConversionError, Result};
use crate::export::{render_plot, PlotOptions};
use crate::regression::RegressionKind;

// ---------------------------------------------------------------------------
// FittedModel – immutable fit parameters
// ---------------------------------------------------------------------------

/// Parameters of one fit. Never mutated; a new fit replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: RegressionKind,
    pub slope: f64,
    pub intercept: f64,
    pub bounds: FilterBounds,
    pub n_samples: usize,
    pub r_squared: f64,
}

impl FittedModel {
    /// Predict the cumulative cost for Euclidean distance `x`.
    ///
    /// Distances outside the fitted range are extrapolated without warning.
    pub fn predict(&self, x: f64) -> Result<f64> {
        if x.is_nan() || x < 0.0 {
            return Err(ConversionError::InvalidArgument(format!(
                "distance must be non-negative, got {x}"
            )));
        }
        let y = match self.kind {
            RegressionKind::LinearThroughOrigin => self.slope * x,
            RegressionKind::Linear => self.slope * x + self.intercept,
            RegressionKind::LogLog if x == 0.0 => x.powf(self.slope) * self.intercept.exp(),
            RegressionKind::LogLog => (self.slope * x.ln() + self.intercept).exp(),
        };
        Ok(y)
    }

    /// Pretty JSON, as written by the viewer's model export.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConversionError::DataFormat(format!("serializing model: {e}")))
    }
}

// ---------------------------------------------------------------------------
// DistanceConverter
// ---------------------------------------------------------------------------

/// A regression between Euclidean distance and cumulative cost, fit on the
/// links of one linkset.
///
/// Keeps the filtered samples in the fitted space (log space for
/// [`RegressionKind::LogLog`]) for plotting.
#[derive(Debug, Clone)]
pub struct DistanceConverter {
    model: FittedModel,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl DistanceConverter {
    /// Load a links table and fit it.
    pub fn from_path(path: &Path, kind: RegressionKind, bounds: FilterBounds) -> Result<Self> {
        let samples = load_links(path)?;
        Self::fit(&samples, kind, bounds)
    }

    /// Filter `samples` by `bounds` on distance, transform and fit.
    pub fn fit(samples: &SampleSet, kind: RegressionKind, bounds: FilterBounds) -> Result<Self> {
        let filtered = apply_bounds(samples, &bounds)?;
        let (x, y) = kind.transform(filtered.distance(), filtered.cost())?;
        let line = kind.fit(&x, &y)?;

        let model = FittedModel {
            kind,
            slope: line.slope,
            intercept: line.intercept,
            bounds,
            n_samples: x.len(),
            r_squared: line.r_squared,
        };
        log::info!(
            "Fitted {kind} on {}/{} links: slope={:.6} intercept={:.6} r2={:.4}",
            model.n_samples,
            samples.len(),
            model.slope,
            model.intercept,
            model.r_squared
        );
        Ok(DistanceConverter { model, x, y })
    }

    /// Cumulative cost predicted for Euclidean distance `x`.
    pub fn predict_cost(&self, x: f64) -> Result<f64> {
        self.model.predict(x)
    }

    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    pub fn kind(&self) -> RegressionKind {
        self.model.kind
    }

    pub fn bounds(&self) -> FilterBounds {
        self.model.bounds
    }

    pub fn slope(&self) -> f64 {
        self.model.slope
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept
    }

    /// Filtered samples in the fitted space.
    pub fn samples(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// Fitted line evaluated at the smallest and largest sample, in the
    /// fitted space.
    pub fn fitted_line(&self) -> [[f64; 2]; 2] {
        let min = self.x.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let at = |x: f64| self.model.slope * x + self.model.intercept;
        [[min, at(min)], [max, at(max)]]
    }

    /// `(x, y)` axis labels matching [`Self::samples`].
    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self.model.kind {
            RegressionKind::LogLog => ("log DistM", "log Dist"),
            _ => ("DistM", "Dist"),
        }
    }

    /// Write a PNG scatter of the samples with the fitted line.
    pub fn save_plot(&self, path: &Path, options: &PlotOptions) -> Result<()> {
        let colors = SeriesColors::for_kind(self.model.kind);
        let img = render_plot(&self.x, &self.y, self.fitted_line(), colors, options);
        img.save(path).map_err(|source| ConversionError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved {} plot to {}", self.model.kind, path.display());
        Ok(())
    }
}
