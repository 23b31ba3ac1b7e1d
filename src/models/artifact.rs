//! Portable model artifacts
//!
//! Artifacts are plain JSON documents. The grouping model is a set of
//! k-means centroids; each per-cluster classifier is a linear decision
//! function, a decision tree, or a majority-vote forest of trees.

use serde::{Deserialize, Serialize};

use crate::pipeline::statistics::TrainingStatistics;

/// Cluster id produced by the grouping model (`0..n_clusters`).
pub type ClusterId = usize;

/// Nearest-centroid grouping model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    /// Feature order the centroids were fitted on. Empty means batch order.
    #[serde(default)]
    pub features: Vec<String>,
    pub centroids: Vec<Vec<f64>>,
    /// Preprocessing statistics captured at training time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<TrainingStatistics>,
}

impl ClusterModel {
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    pub fn dimension(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.centroids.is_empty() {
            return Err("grouping model has no centroids".to_string());
        }
        let dim = self.dimension();
        if dim == 0 {
            return Err("centroids have zero dimensions".to_string());
        }
        for (id, centroid) in self.centroids.iter().enumerate() {
            if centroid.len() != dim {
                return Err(format!(
                    "centroid {} has {} dimensions, expected {}",
                    id,
                    centroid.len(),
                    dim
                ));
            }
            if centroid.iter().any(|v| !v.is_finite()) {
                return Err(format!("centroid {} contains a non-finite value", id));
            }
        }
        if !self.features.is_empty() && self.features.len() != dim {
            return Err(format!(
                "{} feature names declared for {}-dimensional centroids",
                self.features.len(),
                dim
            ));
        }
        if let Some(stats) = &self.statistics {
            stats.validate()?;
        }
        Ok(())
    }
}

/// One node of a binary decision tree. Rows with `x[feature] <= threshold`
/// go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        fraud: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node 0 is the root; children always have larger indices than parents.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Smallest feature count the tree can be evaluated on.
    pub fn required_dimension(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Split { feature, .. } => Some(feature + 1),
                TreeNode::Leaf { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                threshold,
                left,
                right,
                ..
            } = node
            {
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non-finite threshold", idx));
                }
                for child in [left, right] {
                    if *child <= idx || *child >= self.nodes.len() {
                        return Err(format!(
                            "node {} points to invalid child {}",
                            idx, child
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Decision parameters of a per-cluster classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionFunction {
    /// Fraud when `x · coefficients + intercept > threshold`.
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default)]
        threshold: f64,
    },
    Tree(DecisionTree),
    /// Fraud when a strict majority of trees vote fraud.
    Forest { trees: Vec<DecisionTree> },
}

/// Binary classifier serving one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    /// Feature order the classifier was trained on. Empty means batch order.
    #[serde(default)]
    pub features: Vec<String>,
    pub decision: DecisionFunction,
}

impl Classifier {
    /// Exact feature count for linear models, minimum count for trees.
    pub fn required_dimension(&self) -> usize {
        match &self.decision {
            DecisionFunction::Linear { coefficients, .. } => coefficients.len(),
            DecisionFunction::Tree(tree) => tree.required_dimension(),
            DecisionFunction::Forest { trees } => trees
                .iter()
                .map(DecisionTree::required_dimension)
                .max()
                .unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match &self.decision {
            DecisionFunction::Linear {
                coefficients,
                intercept,
                threshold,
            } => {
                if coefficients.is_empty() {
                    return Err("linear model has no coefficients".to_string());
                }
                if coefficients
                    .iter()
                    .chain([intercept, threshold])
                    .any(|v| !v.is_finite())
                {
                    return Err("linear model contains a non-finite parameter".to_string());
                }
                if !self.features.is_empty() && self.features.len() != coefficients.len() {
                    return Err(format!(
                        "{} feature names declared for {} coefficients",
                        self.features.len(),
                        coefficients.len()
                    ));
                }
            }
            DecisionFunction::Tree(tree) => tree.validate()?,
            DecisionFunction::Forest { trees } => {
                if trees.is_empty() {
                    return Err("forest has no trees".to_string());
                }
                for (idx, tree) in trees.iter().enumerate() {
                    tree.validate().map_err(|e| format!("tree {}: {}", idx, e))?;
                }
            }
        }

        let required = self.required_dimension();
        if !self.features.is_empty() && self.features.len() < required {
            return Err(format!(
                "{} feature names declared but the model reads {} features",
                self.features.len(),
                required
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_model_ragged_centroids() {
        let model = ClusterModel {
            features: vec![],
            centroids: vec![vec![0.0, 1.0], vec![1.0]],
            statistics: None,
        };
        assert!(model.validate().unwrap_err().contains("centroid 1"));
    }

    #[test]
    fn test_cluster_model_feature_count() {
        let model = ClusterModel {
            features: vec!["a".to_string()],
            centroids: vec![vec![0.0, 1.0]],
            statistics: None,
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_tree_child_must_follow_parent() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { fraud: true },
            ],
        };
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_classifier_json_forms() {
        let linear: Classifier = serde_json::from_str(
            r#"{"decision": {"kind": "linear", "coefficients": [1.0, -1.0], "intercept": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(linear.required_dimension(), 2);
        linear.validate().unwrap();

        let tree: Classifier = serde_json::from_str(
            r#"{"decision": {"kind": "tree", "nodes": [
                {"split": {"feature": 2, "threshold": 0.0, "left": 1, "right": 2}},
                {"leaf": {"fraud": false}},
                {"leaf": {"fraud": true}}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(tree.required_dimension(), 3);
        tree.validate().unwrap();
    }

    #[test]
    fn test_empty_forest_rejected() {
        let forest = Classifier {
            features: vec![],
            decision: DecisionFunction::Forest { trees: vec![] },
        };
        assert!(forest.validate().is_err());
    }
}
