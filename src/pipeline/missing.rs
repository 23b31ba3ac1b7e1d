//! Missing value detection and imputation

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use tracing::debug;

use super::batch::{is_categorical, numeric_values, string_values, Batch};
use super::statistics::{FillValue, TrainingStatistics};
use crate::error::{PipelineError, Result};

/// Report whether any field has missing values, and which ones.
///
/// NaN in a float field counts as missing.
pub fn detect_missing(batch: &Batch) -> (bool, BTreeSet<String>) {
    let affected: BTreeSet<String> = batch
        .frame()
        .get_columns()
        .iter()
        .filter(|col| has_missing(col))
        .map(|col| col.name().to_string())
        .collect();

    (!affected.is_empty(), affected)
}

fn has_missing(column: &Column) -> bool {
    if column.null_count() > 0 {
        return true;
    }
    column.dtype().is_float()
        && numeric_values(column).map_or(false, |values| values.iter().any(Option::is_none))
}

/// Impute `affected` fields from statistics of the batch itself.
pub fn impute(batch: &Batch, affected: &BTreeSet<String>) -> Result<Batch> {
    impute_with(batch, affected, None)
}

/// Impute `affected` fields: mode for categorical, mean for numeric.
///
/// Training statistics, when given, take precedence per field; batch-local
/// statistics are the fallback.
///
/// # Errors
/// `DataQuality` when a field has no observed value and no trained fill.
pub fn impute_with(
    batch: &Batch,
    affected: &BTreeSet<String>,
    trained: Option<&TrainingStatistics>,
) -> Result<Batch> {
    if affected.is_empty() {
        return Ok(batch.clone());
    }

    let mut columns = Vec::with_capacity(batch.width());
    for column in batch.frame().get_columns() {
        let name = column.name().as_str();
        if !affected.contains(name) {
            columns.push(column.clone());
            continue;
        }

        let trained_fill = trained.and_then(|t| t.fill_value(name));
        let filled = if is_categorical(column) {
            let fill = match trained_fill {
                Some(FillValue::Category(v)) => Some(v.clone()),
                Some(FillValue::Number(_)) => {
                    return Err(PipelineError::schema(format!(
                        "trained fill for categorical field '{}' is numeric",
                        name
                    )))
                }
                None => None,
            };
            fill_categorical(column, fill)?
        } else {
            let fill = match trained_fill {
                Some(FillValue::Number(v)) => Some(*v),
                Some(FillValue::Category(_)) => {
                    return Err(PipelineError::schema(format!(
                        "trained fill for numeric field '{}' is categorical",
                        name
                    )))
                }
                None => None,
            };
            fill_numeric(column, fill)?
        };
        columns.push(filled);
    }

    debug!(fields = affected.len(), "imputed missing values");
    batch.with_columns(columns)
}

fn fill_categorical(column: &Column, fill: Option<String>) -> Result<Column> {
    let values = string_values(column)?;
    let fill = match fill {
        Some(v) => v,
        None => mode(&values).ok_or_else(|| entirely_missing(column))?,
    };

    let filled: Vec<Option<String>> = values
        .into_iter()
        .map(|v| Some(v.unwrap_or_else(|| fill.clone())))
        .collect();
    Ok(Column::new(column.name().clone(), filled))
}

fn fill_numeric(column: &Column, fill: Option<f64>) -> Result<Column> {
    let values = numeric_values(column)?;
    let fill = match fill {
        Some(v) => v,
        None => mean(&values).ok_or_else(|| entirely_missing(column))?,
    };

    let filled: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill)))
        .collect();
    Ok(Column::new(column.name().clone(), filled))
}

fn entirely_missing(column: &Column) -> PipelineError {
    PipelineError::DataQuality {
        field: column.name().to_string(),
        message: "every value is missing, no statistic to impute from".to_string(),
    }
}

/// Most frequent value; ties go to the lexicographically smallest value.
pub(crate) fn mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    // Keys iterate in sorted order, so keeping only strictly larger counts
    // leaves the smallest tied value.
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Mean of the observed finite values.
pub(crate) fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_prefers_smallest_value_on_tie() {
        let values = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("a".to_string()),
            Some("b".to_string()),
        ];
        assert_eq!(mode(&values), Some("a".to_string()));
    }

    #[test]
    fn test_mode_all_missing() {
        let values: Vec<Option<String>> = vec![None, None];
        assert_eq!(mode(&values), None);
    }

    #[test]
    fn test_mean_skips_missing() {
        let values = vec![Some(1.0), None, Some(3.0)];
        assert_eq!(mean(&values), Some(2.0));
        assert_eq!(mean(&[None, None]), None);
    }

    #[test]
    fn test_mean_skips_infinite() {
        let values = vec![Some(2.0), Some(f64::INFINITY), Some(4.0)];
        assert_eq!(mean(&values), Some(3.0));
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let batch = Batch::new(df! { "vehicle_claim" => [1.0f64, f64::NAN] }.unwrap());
        let (any, affected) = detect_missing(&batch);
        assert!(any);
        assert!(affected.contains("vehicle_claim"));
    }
}
