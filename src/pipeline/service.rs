//! File-level prediction entry point for front ends

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::batch::RowId;
use super::ensemble::{EnsemblePredictor, PredictionOutcome};
use super::loader::{load_dataset, save_predictions};

/// What a front end needs after scoring an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub total_rows: usize,
    pub scored_rows: usize,
    pub fraud_count: usize,
    pub valid_count: usize,
    /// Input rows left unscored because values were still missing
    pub dropped_rows: Vec<RowId>,
}

impl PredictionReport {
    pub fn from_outcome(input: &Path, output: &Path, outcome: &PredictionOutcome) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            total_rows: outcome.total_rows(),
            scored_rows: outcome.predictions.len(),
            fraud_count: outcome.fraud_count(),
            valid_count: outcome.valid_count(),
            dropped_rows: outcome.dropped.clone(),
        }
    }
}

/// Load `input`, predict every row and write the `Predictions` CSV to
/// `output`. Nothing is written if the batch aborts.
pub fn predict_file(
    predictor: &EnsemblePredictor,
    input: &Path,
    output: &Path,
    infer_schema_length: usize,
) -> Result<PredictionReport> {
    let df = load_dataset(input, infer_schema_length, &predictor.config().placeholders)?;
    let outcome = predictor
        .predict(&df)
        .with_context(|| format!("Prediction failed for {}", input.display()))?;

    save_predictions(&outcome.labels(), output)?;
    Ok(PredictionReport::from_outcome(input, output, &outcome))
}
