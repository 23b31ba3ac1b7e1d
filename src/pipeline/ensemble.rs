//! Cluster-routed ensemble prediction
//!
//! Runs the preprocessing stages once per batch, routes rows to clusters,
//! classifies each cluster's partition with its own model and reassembles
//! the labels in original row order.

use std::fmt;
use std::sync::Arc;

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::batch::{Batch, RowId};
use super::cleaner::clean;
use super::config::PipelineConfig;
use super::encoder::encode;
use super::features::FeatureMatrix;
use super::missing::{detect_missing, impute_with};
use super::router::assign;
use super::scaler::scale_with;
use crate::error::{PipelineAborted, PipelineError, PipelineStage};
use crate::models::{ClusterId, ModelRepository};

/// Binary fraud label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Prediction {
    Fraud,
    NotFraud,
}

impl Prediction {
    /// Output label: `Y` for fraud, `N` otherwise.
    pub fn label(self) -> &'static str {
        match self {
            Prediction::Fraud => "Y",
            Prediction::NotFraud => "N",
        }
    }

    pub fn is_fraud(self) -> bool {
        self == Prediction::Fraud
    }
}

impl From<bool> for Prediction {
    fn from(fraud: bool) -> Self {
        if fraud {
            Prediction::Fraud
        } else {
            Prediction::NotFraud
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Labels for every scored row, in original order, plus the rows that were
/// dropped for still-missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionOutcome {
    pub predictions: Vec<(RowId, Prediction)>,
    pub dropped: Vec<RowId>,
}

impl PredictionOutcome {
    pub fn total_rows(&self) -> usize {
        self.predictions.len() + self.dropped.len()
    }

    pub fn fraud_count(&self) -> usize {
        self.predictions.iter().filter(|(_, p)| p.is_fraud()).count()
    }

    pub fn valid_count(&self) -> usize {
        self.predictions.len() - self.fraud_count()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.predictions.iter().map(|(_, p)| p.label()).collect()
    }
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, PipelineAborted>;
}

impl<T> AtStage<T> for Result<T, PipelineError> {
    fn at(self, stage: PipelineStage) -> Result<T, PipelineAborted> {
        self.map_err(|source| PipelineAborted::new(stage, source))
    }
}

/// Orchestrates the full pipeline over a shared [`ModelRepository`].
#[derive(Debug, Clone)]
pub struct EnsemblePredictor {
    repository: Arc<ModelRepository>,
    config: PipelineConfig,
}

impl EnsemblePredictor {
    pub fn new(repository: Arc<ModelRepository>, config: PipelineConfig) -> Self {
        Self { repository, config }
    }

    /// Predictor using the repository's `schema.json` when present, the
    /// built-in claim schema otherwise.
    pub fn from_repository(repository: Arc<ModelRepository>) -> Result<Self, PipelineError> {
        let config = match repository.load_schema()? {
            Some(schema) => PipelineConfig::with_schema(schema),
            None => PipelineConfig::default(),
        };
        Ok(Self::new(repository, config))
    }

    pub fn repository(&self) -> &ModelRepository {
        &self.repository
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Predict a raw batch whose rows are identified by position.
    pub fn predict(&self, raw: &DataFrame) -> Result<PredictionOutcome, PipelineAborted> {
        self.predict_batch(&Batch::new(raw.clone()))
    }

    /// Predict a batch, carrying its row ids through every stage.
    ///
    /// Any stage failure aborts the whole batch; no partial labels are
    /// returned.
    pub fn predict_batch(&self, raw: &Batch) -> Result<PredictionOutcome, PipelineAborted> {
        let config = &self.config;
        let cluster_model = self
            .repository
            .load_cluster_model()
            .at(PipelineStage::LoadArtifact)?;
        let trained = cluster_model.statistics.as_ref();

        let cleaned = clean(raw, &config.drop_fields, &config.placeholders, &config.schema)
            .at(PipelineStage::Clean)?;

        let (any_missing, affected) = detect_missing(&cleaned);
        let imputed = if any_missing {
            debug!(fields = ?affected, "imputing missing values");
            impute_with(&cleaned, &affected, trained).at(PipelineStage::Impute)?
        } else {
            cleaned
        };

        let encoded = encode(&imputed, &config.schema).at(PipelineStage::Encode)?;

        let (complete, dropped) = encoded
            .retain_rows(&encoded.complete_rows())
            .at(PipelineStage::Encode)?;
        if !dropped.is_empty() {
            warn!(
                dropped = dropped.len(),
                rows = ?dropped,
                "dropped rows with missing values after imputation"
            );
        }

        if complete.is_empty() {
            info!(rows = raw.height(), scored = 0, "batch has no scorable rows");
            return Ok(PredictionOutcome {
                predictions: Vec::new(),
                dropped,
            });
        }

        let scaled = scale_with(&complete, trained).at(PipelineStage::Scale)?;
        let matrix = FeatureMatrix::from_batch(&scaled).at(PipelineStage::Scale)?;
        let assignment = assign(&matrix, &cluster_model).at(PipelineStage::Route)?;

        let partitions: Vec<(ClusterId, Vec<usize>)> =
            assignment.partitions().into_iter().collect();
        let labeled = partitions
            .par_iter()
            .map(|(cluster_id, positions)| {
                self.classify_partition(&matrix, *cluster_id, positions)
            })
            .collect::<Result<Vec<_>, PipelineAborted>>()?;

        let predictions = reassemble(labeled);
        debug_assert_eq!(predictions.len(), complete.height());

        info!(
            rows = raw.height(),
            scored = predictions.len(),
            dropped = dropped.len(),
            clusters = partitions.len(),
            "batch predicted"
        );

        Ok(PredictionOutcome {
            predictions,
            dropped,
        })
    }

    fn classify_partition(
        &self,
        matrix: &FeatureMatrix,
        cluster_id: ClusterId,
        positions: &[usize],
    ) -> Result<Vec<(RowId, Prediction)>, PipelineAborted> {
        let classifier = self
            .repository
            .load_classifier(cluster_id)
            .at(PipelineStage::LoadArtifact)?;

        let partition = matrix.select_rows(positions);
        let artifact = format!("cluster_{} classifier", cluster_id);
        let decisions = classifier
            .predict(&partition, &artifact)
            .at(PipelineStage::Classify)?;

        debug!(cluster_id, rows = positions.len(), "classified partition");
        Ok(partition
            .row_ids()
            .iter()
            .zip(decisions)
            .map(|(&row_id, fraud)| (row_id, Prediction::from(fraud)))
            .collect())
    }
}

/// Merge per-cluster labels back into original row order.
pub fn reassemble(partitions: Vec<Vec<(RowId, Prediction)>>) -> Vec<(RowId, Prediction)> {
    let mut merged: Vec<(RowId, Prediction)> = partitions.into_iter().flatten().collect();
    merged.sort_unstable_by_key(|(row_id, _)| *row_id);
    merged
}
