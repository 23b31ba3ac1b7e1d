//! Training-time preprocessing statistics
//!
//! When the grouping artifact carries these, imputation and scaling use them
//! instead of statistics computed from the inference batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Fill value for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Category(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatistics {
    #[serde(default)]
    pub impute: HashMap<String, FillValue>,
    #[serde(default)]
    pub scaling: HashMap<String, ScalingParams>,
}

impl TrainingStatistics {
    pub fn fill_value(&self, field: &str) -> Option<&FillValue> {
        self.impute.get(field)
    }

    pub fn scaling(&self, field: &str) -> Option<ScalingParams> {
        self.scaling.get(field).copied()
    }

    /// Every number must be finite and every std non-negative.
    pub fn validate(&self) -> Result<(), String> {
        for (field, fill) in &self.impute {
            if let FillValue::Number(v) = fill {
                if !v.is_finite() {
                    return Err(format!("fill value for '{}' is not finite", field));
                }
            }
        }
        for (field, params) in &self.scaling {
            if !params.mean.is_finite() || !params.std.is_finite() || params.std < 0.0 {
                return Err(format!("invalid scaling parameters for '{}'", field));
            }
        }
        Ok(())
    }
}
