use std::path::Path;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{SampleSet, COST_COLUMN, DISTANCE_COLUMN, LINK_COLUMNS};
use crate::error::{ConversionError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a links table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – Graphab export: `id_a, id_b, cost, distance`, header first
/// * `.parquet` – same column positions, numeric columns cast to `Float64`
pub fn load_links(path: &Path) -> Result<SampleSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let samples = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => {
            return Err(ConversionError::DataFormat(format!(
                "unsupported links table extension: .{other}"
            )))
        }
    };
    log::debug!("Loaded {} links from {}", samples.len(), path.display());
    Ok(samples)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout as written by Graphab:
///
/// ```text
/// ID,Patches,Dist,DistM
/// 1,1-2,1520.4,830.0
/// ```
///
/// The first row is always a header. Link ids are read but ignored.
fn load_csv(path: &Path) -> Result<SampleSet> {
    let file = std::fs::File::open(path).map_err(|source| ConversionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Parse a links table from any reader.
pub fn read_csv<R: std::io::Read>(input: R) -> Result<SampleSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut distance = Vec::new();
    let mut cost = Vec::new();

    for (i, result) in reader.records().enumerate() {
        // Row numbers in messages count the header as row 1.
        let row_no = i + 2;
        let record = result
            .map_err(|e| ConversionError::DataFormat(format!("CSV row {row_no}: {e}")))?;

        if record.len() != LINK_COLUMNS {
            return Err(ConversionError::DataFormat(format!(
                "CSV row {row_no}: expected {LINK_COLUMNS} fields, found {}",
                record.len()
            )));
        }

        cost.push(parse_field(&record[COST_COLUMN], row_no, "cost")?);
        distance.push(parse_field(&record[DISTANCE_COLUMN], row_no, "distance")?);
    }

    SampleSet::new(distance, cost)
}

fn parse_field(s: &str, row: usize, col: &str) -> Result<f64> {
    s.trim().parse::<f64>().map_err(|_| {
        ConversionError::DataFormat(format!("CSV row {row}, {col}: '{s}' is not a number"))
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a links table stored as Parquet.
///
/// Column names are not interpreted; only positions matter, as in the CSV
/// export. Integer or float columns are accepted.
fn load_parquet(path: &Path) -> Result<SampleSet> {
    let file = std::fs::File::open(path).map_err(|source| ConversionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parquet_error(path, "reading parquet metadata", e))?;
    let reader = builder
        .build()
        .map_err(|e| parquet_error(path, "building parquet reader", e))?;

    let mut distance = Vec::new();
    let mut cost = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_error(path, "reading record batch", e))?;

        if batch.num_columns() != LINK_COLUMNS {
            return Err(ConversionError::DataFormat(format!(
                "{}: expected {LINK_COLUMNS} columns, found {}",
                path.display(),
                batch.num_columns()
            )));
        }

        let offset = cost.len();
        extend_f64(&mut cost, batch.column(COST_COLUMN), offset, "cost")?;
        extend_f64(&mut distance, batch.column(DISTANCE_COLUMN), offset, "distance")?;
    }

    SampleSet::new(distance, cost)
}

// -- Parquet / Arrow helpers --

/// Append a numeric column to `out`, casting to `Float64`.
fn extend_f64(out: &mut Vec<f64>, col: &ArrayRef, offset: usize, name: &str) -> Result<()> {
    let casted = cast(col, &DataType::Float64).map_err(|e| {
        ConversionError::DataFormat(format!(
            "{name} column of type {:?} is not numeric: {e}",
            col.data_type()
        ))
    })?;
    let values = casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ConversionError::DataFormat(format!("{name} column did not cast to f64")))?;

    for row in 0..values.len() {
        if values.is_null(row) {
            return Err(ConversionError::DataFormat(format!(
                "row {}: null value in {name} column",
                offset + row
            )));
        }
        out.push(values.value(row));
    }
    Ok(())
}

fn parquet_error(path: &Path, what: &str, e: impl std::fmt::Display) -> ConversionError {
    ConversionError::DataFormat(format!("{}: {what}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_graphab_layout() {
        let text = "ID,Patches,Dist,DistM\n1,1-2,20.5,10.0\n2,1-3,41.0,20.0\n";
        let samples = read_csv(text.as_bytes()).unwrap();
        assert_eq!(samples.distance(), &[10.0, 20.0]);
        assert_eq!(samples.cost(), &[20.5, 41.0]);
    }

    #[test]
    fn header_is_never_data() {
        let text = "0,0,1.0,1.0\n1,1-2,2.0,3.0\n";
        let samples = read_csv(text.as_bytes()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.distance(), &[3.0]);
    }

    #[test]
    fn wrong_arity_is_a_format_error() {
        let text = "ID,Patches,Dist,DistM\n1,1-2,20.5\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ConversionError::DataFormat(ref m) if m.contains("row 2")));
    }

    #[test]
    fn non_numeric_field_is_a_format_error() {
        let text = "ID,Patches,Dist,DistM\n1,1-2,20.5,ten\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ConversionError::DataFormat(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_links(Path::new("links.txt")).unwrap_err();
        assert!(matches!(err, ConversionError::DataFormat(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_links(&dir.path().join("nope-links.csv")).unwrap_err();
        assert!(matches!(err, ConversionError::Io { .. }));
    }
}
