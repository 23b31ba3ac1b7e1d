//! Shared test utilities and fixture generators

#![allow(dead_code)]

use claimsense::models::{
    Classifier, ClusterModel, DecisionFunction, DecisionTree, TreeNode, CLASSIFIER_FILE,
    CLUSTERING_DIR, CLUSTER_MODEL_FILE,
};
use claimsense::pipeline::{FieldSpec, PipelineConfig, Schema};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Five claim rows with a dropped identifier, a numeric field with one gap,
/// a constant numeric field and two categorical fields.
///
/// With [`two_cluster_models`] the rows route to clusters `[0, 1, 0, 1, 0]`.
pub fn create_claims_dataframe() -> DataFrame {
    df! {
        "policy_number" => ["P-1", "P-2", "P-3", "P-4", "P-5"],
        "vehicle_claim" => [Some(-10.0f64), Some(10.0), None, Some(11.0), Some(-20.0)],
        "witnesses" => [2.0f64, 2.0, 2.0, 2.0, 2.0],
        "police_report_available" => ["YES", " NO", "?", "YES ", "NO"],
        "incident_severity" => [
            "Minor Damage",
            "Total Loss",
            "Minor Damage",
            "Major Damage",
            "Total Loss",
        ],
    }
    .unwrap()
}

/// Schema for the fixture: identifier dropped, two declared numeric fields,
/// categorical rules inferred from the data.
pub fn test_schema() -> Schema {
    Schema {
        fields: vec![
            FieldSpec::dropped("policy_number"),
            FieldSpec::numeric("vehicle_claim"),
            FieldSpec::numeric("witnesses"),
        ],
    }
}

pub fn test_config() -> PipelineConfig {
    PipelineConfig::with_schema(test_schema())
}

/// Classifier that labels every row the same way.
pub fn constant_classifier(fraud: bool) -> Classifier {
    Classifier {
        features: vec![],
        decision: DecisionFunction::Tree(DecisionTree {
            nodes: vec![TreeNode::Leaf { fraud }],
        }),
    }
}

/// Grouping model over `vehicle_claim` only: negative scaled values go to
/// cluster 0, large positive ones to cluster 1.
pub fn two_cluster_model() -> ClusterModel {
    ClusterModel {
        features: vec!["vehicle_claim".to_string()],
        centroids: vec![vec![-0.5], vec![1.5]],
        statistics: None,
    }
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

pub fn cluster_model_path(root: &Path) -> PathBuf {
    root.join(CLUSTERING_DIR).join(CLUSTER_MODEL_FILE)
}

pub fn classifier_path(root: &Path, cluster_id: usize) -> PathBuf {
    root.join(CLUSTERING_DIR)
        .join(format!("cluster_{}", cluster_id))
        .join(CLASSIFIER_FILE)
}

/// Write a models root with the given grouping model and classifiers.
pub fn write_models_root(model: &ClusterModel, classifiers: &[(usize, Classifier)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_json(&cluster_model_path(temp_dir.path()), model);
    for (cluster_id, clf) in classifiers {
        write_json(&classifier_path(temp_dir.path(), *cluster_id), clf);
    }
    temp_dir
}

/// Two clusters: cluster 0 labels everything valid, cluster 1 fraud.
pub fn two_cluster_models() -> TempDir {
    write_models_root(
        &two_cluster_model(),
        &[
            (0, constant_classifier(false)),
            (1, constant_classifier(true)),
        ],
    )
}

/// Write a CSV file into a fresh temporary directory.
pub fn create_temp_csv(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("claims.csv");
    std::fs::write(&csv_path, contents).unwrap();
    (temp_dir, csv_path)
}

/// CSV equivalent of [`create_claims_dataframe`].
pub const CLAIMS_CSV: &str = "\
policy_number,vehicle_claim,witnesses,police_report_available,incident_severity
P-1,-10,2,YES,Minor Damage
P-2,10,2, NO,Total Loss
P-3,?,2,?,Minor Damage
P-4,11,2,YES ,Major Damage
P-5,-20,2,NO,Total Loss
";

/// Assert the batch exposes exactly these field names, in order.
pub fn assert_fields(names: &[String], expected: &[&str]) {
    let actual: Vec<&str> = names.iter().map(String::as_str).collect();
    assert_eq!(actual, expected, "field names mismatch");
}
