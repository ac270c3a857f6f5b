//! Euclidean to cost distance conversion for Graphab linksets.
//!
//! Graphab writes one `<linkset>-links.csv` per linkset next to the project
//! file, with the Euclidean distance and the cumulative cost of every link.
//! This crate fits a regression between the two columns and predicts the
//! cost of new distances:
//!
//! ```no_run
//! use graphab_distance::{FilterBounds, Project, RegressionKind};
//!
//! let mut project = Project::discover("landscape/landscape.xml")?;
//! let cost = project.convert_distance(
//!     1500.0,
//!     None,
//!     RegressionKind::LogLog,
//!     FilterBounds::new(None, Some(5000.0))?,
//! )?;
//! println!("{cost}");
//! # Ok::<(), graphab_distance::ConversionError>(())
//! ```

pub mod color;
pub mod converter;
pub mod data;
pub mod error;
pub mod export;
pub mod project;
pub mod regression;

pub use converter::{DistanceConverter, FittedModel};
pub use data::filter::FilterBounds;
pub use data::model::SampleSet;
pub use error::ConversionError;
pub use export::PlotOptions;
pub use project::{LinkFileSource, LinksetSource, Project};
pub use regression::RegressionKind;
