//! Cluster routing by nearest centroid

use std::collections::BTreeMap;

use tracing::debug;

use super::batch::{Batch, RowId};
use super::features::FeatureMatrix;
use crate::error::Result;
use crate::models::{ClusterId, ClusterModel};

const GROUPING_ARTIFACT: &str = "grouping model";

/// One cluster id per surviving row, in batch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    assignments: Vec<(RowId, ClusterId)>,
}

impl ClusterAssignment {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(RowId, ClusterId)> {
        self.assignments.iter()
    }

    pub fn cluster_of(&self, row_id: RowId) -> Option<ClusterId> {
        self.assignments
            .iter()
            .find(|(id, _)| *id == row_id)
            .map(|(_, cluster)| *cluster)
    }

    /// Cluster ids in order of assignment.
    pub fn clusters(&self) -> Vec<ClusterId> {
        self.assignments.iter().map(|(_, c)| *c).collect()
    }

    /// Matrix row positions grouped by cluster id.
    pub fn partitions(&self) -> BTreeMap<ClusterId, Vec<usize>> {
        let mut partitions: BTreeMap<ClusterId, Vec<usize>> = BTreeMap::new();
        for (position, (_, cluster)) in self.assignments.iter().enumerate() {
            partitions.entry(*cluster).or_default().push(position);
        }
        partitions
    }
}

/// Assign every row of `matrix` to its nearest centroid (Euclidean).
/// Ties go to the lowest cluster id.
///
/// # Errors
/// `Schema` if the model declares a feature the matrix lacks,
/// `ShapeMismatch` if the feature count differs from the centroid dimension.
pub fn assign(matrix: &FeatureMatrix, model: &ClusterModel) -> Result<ClusterAssignment> {
    let x = matrix.project(&model.features, GROUPING_ARTIFACT)?;
    x.ensure_width(model.dimension(), GROUPING_ARTIFACT)?;

    let assignments: Vec<(RowId, ClusterId)> = (0..x.nrows())
        .map(|row| (x.row_ids()[row], nearest_centroid(&x, row, &model.centroids)))
        .collect();

    debug!(
        rows = assignments.len(),
        clusters = model.n_clusters(),
        "assigned clusters"
    );
    Ok(ClusterAssignment { assignments })
}

/// Route a scaled batch directly.
pub fn assign_batch(batch: &Batch, model: &ClusterModel) -> Result<ClusterAssignment> {
    assign(&FeatureMatrix::from_batch(batch)?, model)
}

fn nearest_centroid(x: &FeatureMatrix, row: usize, centroids: &[Vec<f64>]) -> ClusterId {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (id, centroid) in centroids.iter().enumerate() {
        let distance: f64 = centroid
            .iter()
            .enumerate()
            .map(|(col, c)| (x.get(row, col) - c).powi(2))
            .sum();
        if distance < best_distance {
            best = id;
            best_distance = distance;
        }
    }
    best
}
