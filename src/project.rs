use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::converter::DistanceConverter;
use crate::data::filter::FilterBounds;
use crate::data::loader::load_links;
use crate::data::model::SampleSet;
use crate::error::{ConversionError, Result};
use crate::regression::RegressionKind;

/// File name suffixes of links tables, in lookup order.
const LINKS_SUFFIXES: [&str; 3] = ["-links.csv", "-links.parquet", "-links.pq"];

/// Linkset name of a links table file name, e.g. `lcp` for `lcp-links.csv`.
pub fn linkset_name(file_name: &str) -> Option<&str> {
    LINKS_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
}

// ---------------------------------------------------------------------------
// Links table source
// ---------------------------------------------------------------------------

/// Where a project reads the links table of a linkset from.
pub trait LinksetSource {
    fn load(&self, linkset: &str) -> Result<SampleSet>;
}

/// Reads `<linkset>-links.csv` (or `.parquet` / `.pq`) from one directory, the way
/// Graphab lays them out beside the project file.
#[derive(Debug, Clone)]
pub struct LinkFileSource {
    dir: PathBuf,
}

impl LinkFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Source for the directory containing `project_file`.
    pub fn beside(project_file: &Path) -> Self {
        let dir = project_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(dir)
    }

    /// Path of the links table for `linkset`. Prefers CSV when both exist.
    pub fn path_for(&self, linkset: &str) -> PathBuf {
        LINKS_SUFFIXES
            .iter()
            .map(|suffix| self.dir.join(format!("{linkset}{suffix}")))
            .find(|p| p.is_file())
            .unwrap_or_else(|| self.dir.join(format!("{linkset}{}", LINKS_SUFFIXES[0])))
    }

    /// Linkset names with a links table in the directory, sorted.
    pub fn discover(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| ConversionError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                linkset_name(&file_name).map(str::to_string)
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

impl LinksetSource for LinkFileSource {
    fn load(&self, linkset: &str) -> Result<SampleSet> {
        load_links(&self.path_for(linkset))
    }
}

// ---------------------------------------------------------------------------
// Project – linksets and the conversion cache
// ---------------------------------------------------------------------------

/// A Graphab project as far as distance conversion is concerned: its
/// linksets and one fitted converter per `(linkset, regression kind)`.
pub struct Project<S = LinkFileSource> {
    name: String,
    project_file: PathBuf,
    linksets: Vec<String>,
    source: S,
    converters: HashMap<String, HashMap<RegressionKind, DistanceConverter>>,
    fits: usize,
}

impl Project<LinkFileSource> {
    /// Project with the given linksets, read from beside `project_file`.
    pub fn new(project_file: impl Into<PathBuf>, linksets: Vec<String>) -> Self {
        let project_file = project_file.into();
        let source = LinkFileSource::beside(&project_file);
        Self::with_source(project_file, linksets, source)
    }

    /// Project whose linksets are the links tables found beside `project_file`.
    pub fn discover(project_file: impl Into<PathBuf>) -> Result<Self> {
        let project_file = project_file.into();
        let source = LinkFileSource::beside(&project_file);
        let linksets = source.discover()?;
        log::info!(
            "Found {} linkset(s) beside {}: {:?}",
            linksets.len(),
            project_file.display(),
            linksets
        );
        Ok(Self::with_source(project_file, linksets, source))
    }
}

impl<S: LinksetSource> Project<S> {
    pub fn with_source(project_file: impl Into<PathBuf>, linksets: Vec<String>, source: S) -> Self {
        let project_file = project_file.into();
        let name = project_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("project")
            .to_string();
        Project {
            name,
            project_file,
            linksets,
            source,
            converters: HashMap::new(),
            fits: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    pub fn linksets(&self) -> &[String] {
        &self.linksets
    }

    /// Number of fits performed since the project was opened.
    pub fn fit_count(&self) -> usize {
        self.fits
    }

    /// The cached converter for `(linkset, kind)`, if one has been fit.
    pub fn converter(&self, linkset: &str, kind: RegressionKind) -> Option<&DistanceConverter> {
        self.converters.get(linkset)?.get(&kind)
    }

    /// Named linkset, or the first one when `linkset` is `None`.
    pub fn resolve_linkset(&self, linkset: Option<&str>) -> Result<String> {
        match linkset {
            None => self.linksets.first().cloned().ok_or_else(|| {
                ConversionError::NotFound(format!("project '{}' has no linksets", self.name))
            }),
            Some(name) if self.linksets.iter().any(|l| l == name) => Ok(name.to_string()),
            Some(name) => Err(ConversionError::NotFound(format!(
                "linkset '{name}' is not part of project '{}' (known: {:?})",
                self.name, self.linksets
            ))),
        }
    }

    /// Fit a converter for `(linkset, kind)` and store it, replacing any
    /// previous one for that key.
    pub fn enable_distance_conversion(
        &mut self,
        linkset: &str,
        kind: RegressionKind,
        bounds: FilterBounds,
    ) -> Result<&DistanceConverter> {
        let linkset = self.resolve_linkset(Some(linkset))?;
        let samples = self.source.load(&linkset)?;
        let converter = DistanceConverter::fit(&samples, kind, bounds)?;
        self.fits += 1;

        let slot = self.converters.entry(linkset).or_default();
        slot.insert(kind, converter);
        Ok(&slot[&kind])
    }

    /// Convert a Euclidean distance to a cumulative cost.
    ///
    /// Refits when no converter is cached for `(linkset, kind)` or when the
    /// cached one was fit with different bounds. Omitted bounds mean no bound.
    pub fn convert_distance(
        &mut self,
        x: f64,
        linkset: Option<&str>,
        kind: RegressionKind,
        bounds: FilterBounds,
    ) -> Result<f64> {
        if x.is_nan() || x < 0.0 {
            return Err(ConversionError::InvalidArgument(format!(
                "distance must be non-negative, got {x}"
            )));
        }
        let linkset = self.resolve_linkset(linkset)?;

        match self.converter(&linkset, kind) {
            Some(conv) if conv.bounds() == bounds => {
                log::debug!("Reusing {kind} converter for linkset '{linkset}'");
                return conv.predict_cost(x);
            }
            Some(conv) => log::info!(
                "Bounds for '{linkset}' ({kind}) changed from {:?} to {bounds:?}, refitting",
                conv.bounds()
            ),
            None => log::debug!("No {kind} converter for linkset '{linkset}' yet"),
        }

        self.enable_distance_conversion(&linkset, kind, bounds)?
            .predict_cost(x)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use approx::assert_relative_eq;

    use super::*;

    /// In-memory source counting how often each table is read.
    struct CountingSource {
        loads: Cell<usize>,
    }

    impl LinksetSource for CountingSource {
        fn load(&self, linkset: &str) -> Result<SampleSet> {
            self.loads.set(self.loads.get() + 1);
            match linkset {
                "lcp" => SampleSet::new(vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]),
                "euclid" => SampleSet::new(vec![1.0, 2.0, 3.0], vec![3.0, 5.0, 7.0]),
                other => Err(ConversionError::NotFound(other.to_string())),
            }
        }
    }

    fn project() -> Project<CountingSource> {
        Project::with_source(
            "/data/site.xml",
            vec!["lcp".into(), "euclid".into()],
            CountingSource {
                loads: Cell::new(0),
            },
        )
    }

    #[test]
    fn linkset_name_strips_every_table_suffix() {
        assert_eq!(linkset_name("lcp-links.csv"), Some("lcp"));
        assert_eq!(linkset_name("lcp-links.parquet"), Some("lcp"));
        assert_eq!(linkset_name("lcp-links.pq"), Some("lcp"));
        assert_eq!(linkset_name("-links.csv"), None);
        assert_eq!(linkset_name("site.xml"), None);
    }

    #[test]
    fn discover_lists_pq_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alt-links.pq"), b"").unwrap();
        std::fs::write(dir.path().join("lcp-links.csv"), b"").unwrap();
        std::fs::write(dir.path().join("lcp-links.parquet"), b"").unwrap();
        let source = LinkFileSource::new(dir.path());
        assert_eq!(source.discover().unwrap(), vec!["alt", "lcp"]);
        assert_eq!(source.path_for("alt"), dir.path().join("alt-links.pq"));
        assert_eq!(source.path_for("lcp"), dir.path().join("lcp-links.csv"));
    }

    #[test]
    fn bare_project_file_reads_from_current_dir() {
        let source = LinkFileSource::beside(Path::new("site.xml"));
        assert_eq!(source.path_for("lcp"), Path::new(".").join("lcp-links.csv"));
    }

    #[test]
    fn project_name_from_file_stem() {
        let p = project();
        assert_eq!(p.name(), "site");
        assert_eq!(p.project_file(), Path::new("/data/site.xml"));
    }

    #[test]
    fn identical_calls_fit_once() {
        let mut p = project();
        let a = p
            .convert_distance(5.0, Some("lcp"), RegressionKind::LinearThroughOrigin, FilterBounds::NONE)
            .unwrap();
        let b = p
            .convert_distance(5.0, Some("lcp"), RegressionKind::LinearThroughOrigin, FilterBounds::NONE)
            .unwrap();
        assert_relative_eq!(a, 10.0, epsilon = 1e-12);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(p.fit_count(), 1);
        assert_eq!(p.source.loads.get(), 1);
    }

    #[test]
    fn changed_upper_limit_refits_once() {
        let mut p = project();
        let kind = RegressionKind::LinearThroughOrigin;
        let first = FilterBounds::new(None, Some(3.0)).unwrap();
        let second = FilterBounds::new(None, Some(4.0)).unwrap();

        p.convert_distance(1.0, Some("lcp"), kind, first).unwrap();
        p.convert_distance(1.0, Some("lcp"), kind, first).unwrap();
        assert_eq!(p.fit_count(), 1);

        p.convert_distance(1.0, Some("lcp"), kind, second).unwrap();
        assert_eq!(p.fit_count(), 2);
        assert_eq!(p.converter("lcp", kind).unwrap().bounds(), second);

        p.convert_distance(1.0, Some("lcp"), kind, second).unwrap();
        assert_eq!(p.fit_count(), 2);
    }

    #[test]
    fn dropping_bounds_refits() {
        let mut p = project();
        let kind = RegressionKind::Linear;
        let bounded = FilterBounds::new(Some(1.0), Some(3.0)).unwrap();
        p.convert_distance(1.0, Some("euclid"), kind, bounded).unwrap();
        p.convert_distance(1.0, Some("euclid"), kind, FilterBounds::NONE).unwrap();
        assert_eq!(p.fit_count(), 2);
    }

    #[test]
    fn kinds_are_cached_separately() {
        let mut p = project();
        p.convert_distance(1.0, Some("euclid"), RegressionKind::Linear, FilterBounds::NONE)
            .unwrap();
        p.convert_distance(1.0, Some("euclid"), RegressionKind::LogLog, FilterBounds::NONE)
            .unwrap();
        assert_eq!(p.fit_count(), 2);
        assert!(p.converter("euclid", RegressionKind::Linear).is_some());
        assert!(p.converter("euclid", RegressionKind::LogLog).is_some());
        assert!(p.converter("lcp", RegressionKind::Linear).is_none());
    }

    #[test]
    fn omitted_linkset_uses_first() {
        let mut p = project();
        let y = p
            .convert_distance(5.0, None, RegressionKind::LinearThroughOrigin, FilterBounds::NONE)
            .unwrap();
        assert_relative_eq!(y, 10.0, epsilon = 1e-12);
        assert!(p.converter("lcp", RegressionKind::LinearThroughOrigin).is_some());
    }

    #[test]
    fn unknown_linkset_is_not_found() {
        let mut p = project();
        let err = p
            .convert_distance(1.0, Some("missing"), RegressionKind::Linear, FilterBounds::NONE)
            .unwrap_err();
        assert!(matches!(err, ConversionError::NotFound(_)));
        assert_eq!(p.fit_count(), 0);

        let mut empty = Project::with_source(
            "x.xml",
            Vec::new(),
            CountingSource {
                loads: Cell::new(0),
            },
        );
        let err = empty
            .convert_distance(1.0, None, RegressionKind::Linear, FilterBounds::NONE)
            .unwrap_err();
        assert!(matches!(err, ConversionError::NotFound(_)));
    }

    #[test]
    fn negative_distance_fails_before_fitting() {
        let mut p = project();
        let err = p
            .convert_distance(-1.0, Some("lcp"), RegressionKind::Linear, FilterBounds::NONE)
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidArgument(_)));
        assert_eq!(p.fit_count(), 0);
    }

    #[test]
    fn failed_refit_keeps_previous_converter() {
        let mut p = project();
        let kind = RegressionKind::LinearThroughOrigin;
        p.enable_distance_conversion("lcp", kind, FilterBounds::NONE)
            .unwrap();
        let empty = FilterBounds::new(Some(100.0), None).unwrap();
        let err = p.convert_distance(1.0, Some("lcp"), kind, empty).unwrap_err();
        assert!(matches!(err, ConversionError::DataFormat(_)));
        assert_eq!(p.converter("lcp", kind).unwrap().bounds(), FilterBounds::NONE);
        assert_eq!(p.fit_count(), 1);
    }
}
