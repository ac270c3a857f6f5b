use std::path::Path;

use anyhow::{Context, Result};
use graphab_distance::project::linkset_name;
use graphab_distance::{DistanceConverter, FilterBounds, PlotOptions, Project, RegressionKind};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Opened project (None until user opens a file).
    pub project: Option<Project>,

    /// Linkset shown in the plot.
    pub linkset: Option<String>,

    /// Regression kind used for fitting and prediction.
    pub kind: RegressionKind,

    /// Bound text fields, parsed on Fit / Predict.
    pub lower_text: String,
    pub upper_text: String,

    /// Distance typed into the prediction field.
    pub distance_text: String,

    /// Last predicted `(distance, cost)`.
    pub prediction: Option<(f64, f64)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Open the project owning `path` (a project file or a links table).
    pub fn open(&mut self, path: &Path) {
        match Project::discover(path) {
            Ok(project) => {
                log::info!(
                    "Opened project '{}' with linksets {:?}",
                    project.name(),
                    project.linksets()
                );
                self.linkset = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(linkset_name)
                    .filter(|n| project.linksets().iter().any(|l| l.as_str() == *n))
                    .map(str::to_string)
                    .or_else(|| project.linksets().first().cloned());
                self.status_message = if project.linksets().is_empty() {
                    Some("No <linkset>-links.csv/.parquet files next to the project".into())
                } else {
                    None
                };
                self.prediction = None;
                self.project = Some(project);
            }
            Err(e) => self.report(e.into()),
        }
    }

    /// Converter currently on screen.
    pub fn current_converter(&self) -> Option<&DistanceConverter> {
        let project = self.project.as_ref()?;
        project.converter(self.linkset.as_deref()?, self.kind)
    }

    fn bounds(&self) -> Result<FilterBounds> {
        Ok(FilterBounds::parse(
            Some(self.lower_text.as_str()),
            Some(self.upper_text.as_str()),
        )?)
    }

    /// Fit the selected linkset and kind with the typed bounds.
    pub fn fit(&mut self) {
        let result = self.try_fit();
        self.settle(result);
    }

    fn try_fit(&mut self) -> Result<()> {
        let bounds = self.bounds()?;
        let kind = self.kind;
        let linkset = self.linkset.clone().context("no linkset selected")?;
        let project = self.project.as_mut().context("no project open")?;
        project.enable_distance_conversion(&linkset, kind, bounds)?;
        self.prediction = None;
        Ok(())
    }

    /// Predict the cost of the typed distance, refitting when bounds changed.
    pub fn predict(&mut self) {
        let result = self.try_predict();
        self.settle(result);
    }

    fn try_predict(&mut self) -> Result<()> {
        let bounds = self.bounds()?;
        let x: f64 = self
            .distance_text
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a distance", self.distance_text.trim()))?;
        let kind = self.kind;
        let linkset = self.linkset.clone();
        let project = self.project.as_mut().context("no project open")?;
        let cost = project.convert_distance(x, linkset.as_deref(), kind, bounds)?;
        self.prediction = Some((x, cost));
        Ok(())
    }

    /// Write the on-screen fit as PNG.
    pub fn save_plot(&mut self, path: &Path) {
        let result = self
            .current_converter()
            .context("nothing fitted yet")
            .and_then(|conv| Ok(conv.save_plot(path, &PlotOptions::default())?));
        self.settle(result);
    }

    /// Write the on-screen model as JSON.
    pub fn export_model(&mut self, path: &Path) {
        let result = self
            .current_converter()
            .context("nothing fitted yet")
            .and_then(|conv| Ok(conv.model().to_json()?))
            .and_then(|json| {
                std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
            });
        self.settle(result);
    }

    fn settle(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, e: anyhow::Error) {
        log::error!("{e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }
}
