//! Error types for the prediction pipeline.
//!
//! Every stage fails fast with a [`PipelineError`]. The ensemble predictor
//! wraps the first failure in [`PipelineAborted`], tagging the stage that
//! produced it, and nothing from the batch is returned.

use std::fmt;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Failures raised by individual pipeline stages and the model repository.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The field set does not match expectations after cleaning or encoding.
    #[error("schema error: {0}")]
    Schema(String),

    /// A field cannot be imputed (e.g. every value is missing).
    #[error("data quality error in field '{field}': {message}")]
    DataQuality { field: String, message: String },

    /// Feature vector dimensionality disagrees with a model artifact.
    #[error("shape mismatch for {artifact}: expected {expected} features, found {found}")]
    ShapeMismatch {
        artifact: String,
        expected: usize,
        found: usize,
    },

    /// No artifact exists at the resolved path.
    #[error("artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// The artifact exists but cannot be read, parsed or validated.
    #[error("corrupt artifact {}: {message}", path.display())]
    ArtifactCorrupt { path: PathBuf, message: String },

    /// Underlying DataFrame operation failed.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        PipelineError::Schema(message.into())
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        PipelineError::ArtifactCorrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Pipeline stage in which a batch was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Clean,
    Impute,
    Encode,
    Scale,
    Route,
    LoadArtifact,
    Classify,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Clean => "clean",
            PipelineStage::Impute => "impute",
            PipelineStage::Encode => "encode",
            PipelineStage::Scale => "scale",
            PipelineStage::Route => "route",
            PipelineStage::LoadArtifact => "load-artifact",
            PipelineStage::Classify => "classify",
        };
        f.write_str(name)
    }
}

/// Terminal error for a batch: the whole batch is unscored.
#[derive(Debug, Error)]
#[error("pipeline aborted during {stage}: {source}")]
pub struct PipelineAborted {
    pub stage: PipelineStage,
    #[source]
    pub source: PipelineError,
}

impl PipelineAborted {
    pub fn new(stage: PipelineStage, source: PipelineError) -> Self {
        Self { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
