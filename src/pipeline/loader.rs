//! Dataset loader for CSV and Parquet claim files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Load a claim batch from a file (CSV or Parquet based on extension).
///
/// # Arguments
/// * `path` - Input file path
/// * `infer_schema_length` - Rows used for CSV type inference; 0 scans the whole file
/// * `placeholders` - CSV tokens read as null, so a late `?` in a numeric
///   column does not break type inference
pub fn load_dataset(
    path: &Path,
    infer_schema_length: usize,
    placeholders: &[String],
) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let null_values = if placeholders.is_empty() {
        None
    } else {
        Some(NullValues::AllColumns(
            placeholders.iter().map(|p| p.as_str().into()).collect(),
        ))
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .with_null_values(null_values)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Write the `Predictions` column as CSV.
pub fn save_predictions(labels: &[&str], path: &Path) -> Result<()> {
    let mut df = df! { "Predictions" => labels }
        .context("Failed to build predictions table")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    Ok(())
}
