//! Evaluating per-cluster classifiers over a feature matrix

use faer::Mat;

use super::artifact::{Classifier, DecisionFunction, DecisionTree, TreeNode};
use crate::error::{PipelineError, Result};
use crate::pipeline::features::FeatureMatrix;

impl Classifier {
    /// Binary decision per row of `matrix` (`true` = fraud).
    ///
    /// The matrix is projected onto the classifier's declared features first.
    ///
    /// # Errors
    /// `Schema` if a declared feature is missing, `ShapeMismatch` if the
    /// feature count does not fit the decision function.
    pub fn predict(&self, matrix: &FeatureMatrix, artifact: &str) -> Result<Vec<bool>> {
        let x = matrix.project(&self.features, artifact)?;

        match &self.decision {
            DecisionFunction::Linear {
                coefficients,
                intercept,
                threshold,
            } => {
                x.ensure_width(coefficients.len(), artifact)?;
                Ok(linear_decisions(x.values(), coefficients, *intercept, *threshold))
            }
            DecisionFunction::Tree(tree) => {
                ensure_min_width(&x, tree.required_dimension(), artifact)?;
                Ok((0..x.nrows()).map(|row| tree.decide(&x, row)).collect())
            }
            DecisionFunction::Forest { trees } => {
                ensure_min_width(&x, self.required_dimension(), artifact)?;
                Ok((0..x.nrows())
                    .map(|row| {
                        let votes = trees.iter().filter(|t| t.decide(&x, row)).count();
                        votes * 2 > trees.len()
                    })
                    .collect())
            }
        }
    }
}

impl DecisionTree {
    /// Walk from the root to a leaf for one row.
    pub fn decide(&self, x: &FeatureMatrix, row: usize) -> bool {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { fraud } => return *fraud,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x.get(row, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

fn linear_decisions(
    x: &Mat<f64>,
    coefficients: &[f64],
    intercept: f64,
    threshold: f64,
) -> Vec<bool> {
    let w = Mat::from_fn(coefficients.len(), 1, |i, _| coefficients[i]);
    let scores = x.as_ref() * w.as_ref();
    (0..scores.nrows())
        .map(|i| scores[(i, 0)] + intercept > threshold)
        .collect()
}

fn ensure_min_width(x: &FeatureMatrix, required: usize, artifact: &str) -> Result<()> {
    if x.ncols() < required {
        return Err(PipelineError::ShapeMismatch {
            artifact: artifact.to_string(),
            expected: required,
            found: x.ncols(),
        });
    }
    Ok(())
}
