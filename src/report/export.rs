//! JSON export of prediction runs

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::PredictionReport;

/// Metadata about the prediction run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Claimsense version
    pub claimsense_version: String,
    /// Models root the artifacts were loaded from
    pub models_root: String,
    /// Number of clusters in the grouping model
    pub clusters: usize,
}

#[derive(Serialize)]
pub struct PredictionExport<'a> {
    pub metadata: RunMetadata,
    #[serde(flatten)]
    pub report: &'a PredictionReport,
}

/// Export a prediction report with run metadata to a JSON file
pub fn export_prediction_report(
    report: &PredictionReport,
    models_root: &Path,
    clusters: usize,
    output_path: &Path,
) -> Result<()> {
    let export = PredictionExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            claimsense_version: env!("CARGO_PKG_VERSION").to_string(),
            models_root: models_root.display().to_string(),
            clusters,
        },
        report,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize prediction report")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write report: {}", output_path.display()))?;

    Ok(())
}
