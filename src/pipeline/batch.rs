//! Row-tagged batches
//!
//! A [`Batch`] pairs a DataFrame with the original position of every row.
//! Stages hand each other new batches; the row ids only ever shrink through
//! [`Batch::retain_rows`], which reports what it removed.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Zero-based position of a record in the input file.
pub type RowId = usize;

#[derive(Debug, Clone)]
pub struct Batch {
    frame: DataFrame,
    row_ids: Vec<RowId>,
}

impl Batch {
    /// Tag every row of `frame` with its position.
    pub fn new(frame: DataFrame) -> Self {
        let row_ids = (0..frame.height()).collect();
        Self { frame, row_ids }
    }

    pub fn with_row_ids(frame: DataFrame, row_ids: Vec<RowId>) -> Result<Self> {
        if frame.height() != row_ids.len() {
            return Err(PipelineError::schema(format!(
                "batch has {} rows but {} row ids",
                frame.height(),
                row_ids.len()
            )));
        }
        Ok(Self { frame, row_ids })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn row_ids(&self) -> &[RowId] {
        &self.row_ids
    }

    pub fn height(&self) -> usize {
        self.row_ids.len()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Same rows, new columns. The replacement must keep the row count.
    pub(crate) fn with_columns(&self, columns: Vec<Column>) -> Result<Self> {
        let frame = DataFrame::new(columns)?;
        if frame.width() > 0 && frame.height() != self.height() {
            return Err(PipelineError::schema(format!(
                "stage changed row count from {} to {}",
                self.height(),
                frame.height()
            )));
        }
        Ok(Self {
            frame,
            row_ids: self.row_ids.clone(),
        })
    }

    /// Keep rows whose mask entry is true. Returns the new batch and the ids
    /// of the removed rows in input order.
    pub fn retain_rows(&self, keep: &[bool]) -> Result<(Self, Vec<RowId>)> {
        if keep.len() != self.height() {
            return Err(PipelineError::schema(format!(
                "row mask has {} entries for {} rows",
                keep.len(),
                self.height()
            )));
        }

        let mask = BooleanChunked::from_slice("keep".into(), keep);
        let frame = self.frame.filter(&mask)?;

        let mut row_ids = Vec::with_capacity(frame.height());
        let mut removed = Vec::new();
        for (&id, &kept) in self.row_ids.iter().zip(keep) {
            if kept {
                row_ids.push(id);
            } else {
                removed.push(id);
            }
        }

        Ok((Self { frame, row_ids }, removed))
    }

    /// Row mask that is false wherever any field is missing.
    pub fn complete_rows(&self) -> Vec<bool> {
        let mut keep = vec![true; self.height()];
        for column in self.frame.get_columns() {
            if column.null_count() == 0 {
                continue;
            }
            let series = column.as_materialized_series();
            for (idx, value) in series.iter().enumerate() {
                if value.is_null() {
                    keep[idx] = false;
                }
            }
        }
        keep
    }
}

/// Read a string column as owned optional values.
pub(crate) fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    let ca = column.as_materialized_series().str()?;
    Ok(ca.iter().map(|v| v.map(str::to_string)).collect())
}

/// Read any numeric column as optional `f64`. NaN counts as missing.
pub(crate) fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>> {
    let cast = column.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    Ok(ca
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

pub(crate) fn is_categorical(column: &Column) -> bool {
    matches!(column.dtype(), DataType::String)
}

pub(crate) fn is_numeric(column: &Column) -> bool {
    column.dtype().is_primitive_numeric() || matches!(column.dtype(), DataType::Boolean)
}
