/// Data layer: links tables, samples and distance filtering.
///
/// Architecture:
/// ```text
///  <linkset>-links.csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SampleSet
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ SampleSet │  distance[], cost[]
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterBounds on distance → selected rows
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
