//! Feature standardization

use polars::prelude::*;
use tracing::debug;

use super::batch::{numeric_values, Batch};
use super::missing::mean;
use super::statistics::{ScalingParams, TrainingStatistics};
use crate::error::Result;

/// Relative tolerance under which a standard deviation counts as zero.
/// Absorbs rounding in the mean of a constant column.
const ZERO_STD_TOLERANCE: f64 = 1e-12;

/// Standardize every field with batch-local mean and std.
pub fn scale(batch: &Batch) -> Result<Batch> {
    scale_with(batch, None)
}

/// Standardize every field: `(x - mean) / std`.
///
/// Uses the population standard deviation. A field with zero spread scales
/// to 0 for every row. Training statistics, when given, take precedence per
/// field.
pub fn scale_with(batch: &Batch, trained: Option<&TrainingStatistics>) -> Result<Batch> {
    let mut columns = Vec::with_capacity(batch.width());
    let mut constant = 0usize;

    for column in batch.frame().get_columns() {
        let values = numeric_values(column)?;
        let params = trained
            .and_then(|t| t.scaling(column.name().as_str()))
            .or_else(|| fit(&values));

        let scaled: Vec<Option<f64>> = match params {
            Some(p) if !is_zero_spread(p) => values
                .iter()
                .map(|v| v.map(|x| (x - p.mean) / p.std))
                .collect(),
            _ => {
                constant += 1;
                values.iter().map(|v| v.map(|_| 0.0)).collect()
            }
        };
        columns.push(Column::new(column.name().clone(), scaled));
    }

    debug!(
        fields = columns.len(),
        constant_fields = constant,
        "scaled features"
    );
    batch.with_columns(columns)
}

/// Mean and population std of the observed values.
pub fn fit(values: &[Option<f64>]) -> Option<ScalingParams> {
    let mean = mean(values)?;
    let (sum_sq, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(acc, n), x| (acc + (x - mean).powi(2), n + 1));

    Some(ScalingParams {
        mean,
        std: (sum_sq / count as f64).sqrt(),
    })
}

fn is_zero_spread(params: ScalingParams) -> bool {
    params.std <= ZERO_STD_TOLERANCE * params.mean.abs().max(1.0)
}
