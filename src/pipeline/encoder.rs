//! Categorical encoding
//!
//! Every categorical field becomes numeric codes, either through the fixed
//! yes/no map or through first-appearance ordinal codes. Numeric fields are
//! normalized to `f64` so that later stages see one dtype; infinite values
//! cannot be scaled and become missing.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::debug;

use super::batch::{is_categorical, is_numeric, numeric_values, string_values, Batch};
use super::schema::{EncodingRule, Schema};
use crate::error::{PipelineError, Result};

const AFFIRMATIVE: &[&str] = &["y", "yes"];
const NEGATIVE: &[&str] = &["n", "no"];

/// Code for a yes/no spelling, case-insensitive.
pub fn binary_code(value: &str) -> Option<f64> {
    if AFFIRMATIVE.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        Some(1.0)
    } else if NEGATIVE.iter().any(|n| n.eq_ignore_ascii_case(value)) {
        Some(0.0)
    } else {
        None
    }
}

/// Inverse of [`binary_code`]: `true` for affirmative.
pub fn decode_binary(code: f64) -> Option<bool> {
    if code == 1.0 {
        Some(true)
    } else if code == 0.0 {
        Some(false)
    } else {
        None
    }
}

/// Pick the rule for a field: the schema's rule if declared, otherwise
/// Binary when every observed value is a yes/no spelling.
///
/// # Errors
/// `Schema` when the schema declares Binary but a value is outside the
/// yes/no vocabulary.
pub fn resolve_rule(
    field: &str,
    values: &[Option<String>],
    schema: &Schema,
) -> Result<EncodingRule> {
    let all_binary = values.iter().flatten().all(|v| binary_code(v).is_some());

    match schema.encoding(field) {
        Some(EncodingRule::Binary) if !all_binary => {
            let offending = values
                .iter()
                .flatten()
                .find(|v| binary_code(v).is_none())
                .cloned()
                .unwrap_or_default();
            Err(PipelineError::schema(format!(
                "binary field '{}' contains non yes/no value '{}'",
                field, offending
            )))
        }
        Some(rule) => Ok(rule),
        None if all_binary => Ok(EncodingRule::Binary),
        None => Ok(EncodingRule::ORDINAL),
    }
}

/// Encode one field's values. Missing values stay missing.
pub fn encode_values(values: &[Option<String>], rule: EncodingRule) -> Vec<Option<f64>> {
    match rule {
        EncodingRule::Binary => values
            .iter()
            .map(|v| v.as_deref().and_then(binary_code))
            .collect(),
        EncodingRule::Ordinal { start } => {
            let mut codes: HashMap<&str, f64> = HashMap::new();
            values
                .iter()
                .map(|v| {
                    v.as_deref().map(|value| {
                        let next = (start as usize + codes.len()) as f64;
                        *codes.entry(value).or_insert(next)
                    })
                })
                .collect()
        }
    }
}

/// Replace every categorical field with numeric codes.
///
/// # Errors
/// `Schema` if a binary rule is violated or a field is neither categorical
/// nor numeric.
pub fn encode(batch: &Batch, schema: &Schema) -> Result<Batch> {
    let mut columns = Vec::with_capacity(batch.width());
    let mut encoded = 0usize;

    for column in batch.frame().get_columns() {
        let name = column.name().as_str();
        if is_categorical(column) {
            let values = string_values(column)?;
            let rule = resolve_rule(name, &values, schema)?;
            columns.push(Column::new(
                column.name().clone(),
                encode_values(&values, rule),
            ));
            encoded += 1;
        } else if is_numeric(column) {
            let finite: Vec<Option<f64>> = numeric_values(column)?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            columns.push(Column::new(column.name().clone(), finite));
        } else {
            return Err(PipelineError::schema(format!(
                "field '{}' is still non-numeric ({}) after encoding",
                name,
                column.dtype()
            )));
        }
    }

    debug!(encoded_fields = encoded, "encoded categorical fields");
    batch.with_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_binary_spellings() {
        for yes in ["Y", "y", "YES", "Yes", "yes"] {
            assert_eq!(binary_code(yes), Some(1.0), "{} should be affirmative", yes);
        }
        for no in ["N", "n", "NO", "No", "no"] {
            assert_eq!(binary_code(no), Some(0.0), "{} should be negative", no);
        }
        assert_eq!(binary_code("maybe"), None);
    }

    #[test]
    fn test_ordinal_first_appearance() {
        let values = owned(&[Some("b"), Some("a"), None, Some("b"), Some("c")]);
        let codes = encode_values(&values, EncodingRule::ORDINAL);
        assert_eq!(codes, vec![Some(0.0), Some(1.0), None, Some(0.0), Some(2.0)]);
    }

    #[test]
    fn test_ordinal_with_start() {
        let values = owned(&[Some("100/300"), Some("250/500"), Some("100/300")]);
        let codes = encode_values(&values, EncodingRule::Ordinal { start: 1 });
        assert_eq!(codes, vec![Some(1.0), Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_rule_inferred_from_contents() {
        let schema = Schema::empty();
        let yes_no = owned(&[Some("YES"), Some("no"), None]);
        let other = owned(&[Some("YES"), Some("maybe")]);
        assert_eq!(resolve_rule("f", &yes_no, &schema).unwrap(), EncodingRule::Binary);
        assert_eq!(resolve_rule("f", &other, &schema).unwrap(), EncodingRule::ORDINAL);
    }

    #[test]
    fn test_declared_binary_rejects_other_values() {
        let schema = Schema::claims();
        let values = owned(&[Some("YES"), Some("UNKNOWN")]);
        let err = resolve_rule("property_damage", &values, &schema).unwrap_err();
        assert!(err.to_string().contains("UNKNOWN"));
    }
}
