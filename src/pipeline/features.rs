//! Dense feature matrices built from scaled batches

use faer::Mat;

use super::batch::{numeric_values, Batch, RowId};
use crate::error::{PipelineError, Result};

/// Row-major view of a fully numeric batch, still tagged with row ids.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Mat<f64>,
    row_ids: Vec<RowId>,
}

impl FeatureMatrix {
    /// Build from a batch whose fields are all numeric and complete.
    ///
    /// # Errors
    /// `DataQuality` if any value is still missing.
    pub fn from_batch(batch: &Batch) -> Result<Self> {
        let names = batch.field_names();
        let mut values = Mat::<f64>::zeros(batch.height(), names.len());

        for (col_idx, column) in batch.frame().get_columns().iter().enumerate() {
            for (row_idx, value) in numeric_values(column)?.into_iter().enumerate() {
                values[(row_idx, col_idx)] = value.ok_or_else(|| PipelineError::DataQuality {
                    field: names[col_idx].clone(),
                    message: format!(
                        "row {} is still missing a value after imputation",
                        batch.row_ids()[row_idx]
                    ),
                })?;
            }
        }

        Ok(Self {
            names,
            values,
            row_ids: batch.row_ids().to_vec(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    pub fn row_ids(&self) -> &[RowId] {
        &self.row_ids
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Reorder columns to `features`. An empty list keeps the batch order.
    ///
    /// # Errors
    /// `Schema` if a declared feature is absent from the batch.
    pub fn project(&self, features: &[String], artifact: &str) -> Result<Self> {
        if features.is_empty() || features == self.names.as_slice() {
            return Ok(self.clone());
        }

        let indices = features
            .iter()
            .map(|f| {
                self.names.iter().position(|n| n == f).ok_or_else(|| {
                    PipelineError::schema(format!(
                        "{} expects feature '{}' which the batch does not have",
                        artifact, f
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let values = Mat::from_fn(self.nrows(), indices.len(), |i, j| {
            self.values[(i, indices[j])]
        });

        Ok(Self {
            names: features.to_vec(),
            values,
            row_ids: self.row_ids.clone(),
        })
    }

    /// Subset of rows by position.
    pub fn select_rows(&self, positions: &[usize]) -> Self {
        let values = Mat::from_fn(positions.len(), self.ncols(), |i, j| {
            self.values[(positions[i], j)]
        });
        Self {
            names: self.names.clone(),
            values,
            row_ids: positions.iter().map(|&p| self.row_ids[p]).collect(),
        }
    }

    /// # Errors
    /// `ShapeMismatch` if the column count differs from `expected`.
    pub fn ensure_width(&self, expected: usize, artifact: &str) -> Result<()> {
        if self.ncols() != expected {
            return Err(PipelineError::ShapeMismatch {
                artifact: artifact.to_string(),
                expected,
                found: self.ncols(),
            });
        }
        Ok(())
    }
}
