//! Field cleaning: whitespace, dropped fields and placeholder tokens

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use super::batch::{is_categorical, string_values, Batch};
use super::schema::{FieldRole, Schema};
use crate::error::{PipelineError, Result};

/// Placeholder the claim exports use for "unknown".
pub const DEFAULT_PLACEHOLDER: &str = "?";

/// Clean a raw batch.
///
/// - Fields named in `drop_fields` are removed (names not present are ignored)
/// - String values are trimmed; placeholders and empty strings become missing
/// - String fields the schema declares numeric are parsed to `f64`
///
/// # Errors
/// `Schema` if no fields remain or a numeric field holds non-numeric text.
pub fn clean(
    batch: &Batch,
    drop_fields: &[String],
    placeholders: &[String],
    schema: &Schema,
) -> Result<Batch> {
    let drop: HashSet<&str> = drop_fields.iter().map(String::as_str).collect();

    let mut columns = Vec::with_capacity(batch.width());
    let mut dropped = 0usize;

    for column in batch.frame().get_columns() {
        let name = column.name().as_str();
        if drop.contains(name) {
            dropped += 1;
            continue;
        }

        if !is_categorical(column) {
            columns.push(column.clone());
            continue;
        }

        let values: Vec<Option<String>> = string_values(column)?
            .into_iter()
            .map(|v| normalize(v, placeholders))
            .collect();

        let cleaned = if schema.role(name) == Some(FieldRole::Numeric) {
            Column::new(column.name().clone(), parse_numeric(name, &values)?)
        } else {
            Column::new(column.name().clone(), values)
        };
        columns.push(cleaned);
    }

    if columns.is_empty() {
        return Err(PipelineError::schema(
            "no fields remain after dropping irrelevant fields",
        ));
    }

    debug!(
        dropped_fields = dropped,
        remaining_fields = columns.len(),
        "cleaned batch"
    );

    batch.with_columns(columns)
}

fn normalize(value: Option<String>, placeholders: &[String]) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || placeholders.iter().any(|p| p == trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_numeric(field: &str, values: &[Option<String>]) -> Result<Vec<Option<f64>>> {
    values
        .iter()
        .map(|v| match v {
            None => Ok(None),
            Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
                PipelineError::schema(format!(
                    "numeric field '{}' contains non-numeric value '{}'",
                    field, text
                ))
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders() -> Vec<String> {
        vec![DEFAULT_PLACEHOLDER.to_string()]
    }

    #[test]
    fn test_normalize_trims_and_blanks() {
        let p = placeholders();
        assert_eq!(normalize(Some("  YES ".into()), &p), Some("YES".to_string()));
        assert_eq!(normalize(Some(" ? ".into()), &p), None);
        assert_eq!(normalize(Some("   ".into()), &p), None);
        assert_eq!(normalize(None, &p), None);
    }

    #[test]
    fn test_parse_numeric_rejects_text() {
        let values = vec![Some("1.5".to_string()), Some("abc".to_string())];
        let err = parse_numeric("witnesses", &values).unwrap_err();
        assert!(err.to_string().contains("witnesses"));
    }
}
