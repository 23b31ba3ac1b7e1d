//! Claimsense: Fraud Classification Library
//!
//! Cleans, imputes, encodes and scales tabular claim records, routes each
//! record to a cluster with a k-means grouping model, and labels it with the
//! classifier trained for that cluster.

pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{PipelineAborted, PipelineError, PipelineStage};
pub use models::ModelRepository;
pub use pipeline::{EnsemblePredictor, PipelineConfig, Prediction, PredictionOutcome};
