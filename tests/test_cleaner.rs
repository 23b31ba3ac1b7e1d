//! Tests for field cleaning

use claimsense::pipeline::{clean, Batch, FieldSpec, Schema};
use claimsense::PipelineError;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn placeholders() -> Vec<String> {
    vec!["?".to_string()]
}

#[test]
fn test_clean_drops_trims_and_normalizes() {
    let batch = Batch::new(create_claims_dataframe());
    let schema = test_schema();

    let cleaned = clean(&batch, &schema.drop_fields(), &placeholders(), &schema).unwrap();

    assert_fields(
        &cleaned.field_names(),
        &[
            "vehicle_claim",
            "witnesses",
            "police_report_available",
            "incident_severity",
        ],
    );

    let report = cleaned.frame().column("police_report_available").unwrap();
    let values: Vec<Option<&str>> = report
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        values,
        vec![Some("YES"), Some("NO"), None, Some("YES"), Some("NO")]
    );
    assert_eq!(cleaned.row_ids(), &[0, 1, 2, 3, 4]);
}

#[test]
fn test_clean_does_not_mutate_input() {
    let batch = Batch::new(create_claims_dataframe());
    let schema = test_schema();

    let _ = clean(&batch, &schema.drop_fields(), &placeholders(), &schema).unwrap();

    assert_eq!(batch.width(), 5);
    let raw = batch.frame().column("police_report_available").unwrap();
    assert_eq!(raw.as_materialized_series().str().unwrap().get(1), Some(" NO"));
}

#[test]
fn test_absent_drop_fields_are_ignored() {
    let batch = Batch::new(df! { "a" => [1.0f64, 2.0] }.unwrap());
    let drop = vec!["not_there".to_string()];

    let cleaned = clean(&batch, &drop, &placeholders(), &Schema::empty()).unwrap();

    assert_eq!(cleaned.width(), 1);
}

#[test]
fn test_no_fields_left_is_schema_error() {
    let batch = Batch::new(df! { "policy_number" => ["P-1", "P-2"] }.unwrap());
    let drop = vec!["policy_number".to_string()];

    let err = clean(&batch, &drop, &placeholders(), &Schema::empty()).unwrap_err();

    assert!(matches!(err, PipelineError::Schema(_)));
}

#[test]
fn test_numeric_text_field_is_parsed() {
    let batch = Batch::new(df! { "umbrella_limit" => [" 0", "?", "5000000"] }.unwrap());
    let schema = Schema {
        fields: vec![FieldSpec::numeric("umbrella_limit")],
    };

    let cleaned = clean(&batch, &[], &placeholders(), &schema).unwrap();

    let col = cleaned.frame().column("umbrella_limit").unwrap();
    assert_eq!(col.dtype(), &DataType::Float64);
    let values: Vec<Option<f64>> = col.f64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(0.0), None, Some(5_000_000.0)]);
}

#[test]
fn test_numeric_field_with_text_is_schema_error() {
    let batch = Batch::new(df! { "witnesses" => ["1", "two"] }.unwrap());
    let schema = Schema {
        fields: vec![FieldSpec::numeric("witnesses")],
    };

    let err = clean(&batch, &[], &placeholders(), &schema).unwrap_err();

    assert!(err.to_string().contains("two"));
}

#[test]
fn test_custom_placeholders() {
    let batch = Batch::new(df! { "collision_type" => ["N/A", "Rear Collision"] }.unwrap());
    let placeholders = vec!["N/A".to_string()];

    let cleaned = clean(&batch, &[], &placeholders, &Schema::empty()).unwrap();

    assert_eq!(
        cleaned
            .frame()
            .column("collision_type")
            .unwrap()
            .null_count(),
        1
    );
}
