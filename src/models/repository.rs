//! Model repository: artifact resolution, validation and caching
//!
//! Layout under the models root:
//!
//! ```text
//! <root>/schema.json                      optional field specs
//! <root>/clustering/kmeans.json           grouping model
//! <root>/clustering/cluster_<id>/model.json   classifier for cluster <id>
//! ```
//!
//! Loaded artifacts are immutable and handed out as `Arc`s. The first load of
//! each artifact happens under a mutex so concurrent first requests read the
//! file once; later requests only take the read lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::artifact::{Classifier, ClusterId, ClusterModel};
use crate::error::{PipelineError, Result};
use crate::pipeline::schema::Schema;

pub const CLUSTERING_DIR: &str = "clustering";
pub const CLUSTER_MODEL_FILE: &str = "kmeans.json";
pub const CLASSIFIER_FILE: &str = "model.json";
pub const SCHEMA_FILE: &str = "schema.json";

#[derive(Debug)]
pub struct ModelRepository {
    root: PathBuf,
    cluster_model: RwLock<Option<Arc<ClusterModel>>>,
    classifiers: RwLock<HashMap<ClusterId, Arc<Classifier>>>,
    load_lock: Mutex<()>,
    loads: AtomicUsize,
}

impl ModelRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cluster_model: RwLock::new(None),
            classifiers: RwLock::new(HashMap::new()),
            load_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cluster_model_path(&self) -> PathBuf {
        self.root.join(CLUSTERING_DIR).join(CLUSTER_MODEL_FILE)
    }

    pub fn classifier_path(&self, cluster_id: ClusterId) -> PathBuf {
        self.root
            .join(CLUSTERING_DIR)
            .join(format!("cluster_{}", cluster_id))
            .join(CLASSIFIER_FILE)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(SCHEMA_FILE)
    }

    /// Number of artifact files read from disk so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Grouping model, loaded on first use.
    pub fn load_cluster_model(&self) -> Result<Arc<ClusterModel>> {
        if let Some(model) = self.cluster_model.read().as_ref() {
            return Ok(Arc::clone(model));
        }

        let _guard = self.load_lock.lock();
        if let Some(model) = self.cluster_model.read().as_ref() {
            return Ok(Arc::clone(model));
        }

        let path = self.cluster_model_path();
        let model: ClusterModel = self.read_artifact(&path)?;
        model
            .validate()
            .map_err(|e| PipelineError::corrupt(&path, e))?;
        info!(
            clusters = model.n_clusters(),
            dimension = model.dimension(),
            "loaded grouping model"
        );

        let model = Arc::new(model);
        *self.cluster_model.write() = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Classifier for `cluster_id`, loaded on first use.
    ///
    /// # Errors
    /// `ArtifactNotFound` if the cluster has no classifier file,
    /// `ArtifactCorrupt` if it fails to parse or validate.
    pub fn load_classifier(&self, cluster_id: ClusterId) -> Result<Arc<Classifier>> {
        if let Some(clf) = self.classifiers.read().get(&cluster_id) {
            return Ok(Arc::clone(clf));
        }

        let _guard = self.load_lock.lock();
        if let Some(clf) = self.classifiers.read().get(&cluster_id) {
            return Ok(Arc::clone(clf));
        }

        let path = self.classifier_path(cluster_id);
        let clf: Classifier = self.read_artifact(&path)?;
        clf.validate().map_err(|e| PipelineError::corrupt(&path, e))?;
        debug!(cluster_id, "loaded classifier");

        let clf = Arc::new(clf);
        self.classifiers
            .write()
            .insert(cluster_id, Arc::clone(&clf));
        Ok(clf)
    }

    /// Field specs from `schema.json`, or `None` when the root has none.
    pub fn load_schema(&self) -> Result<Option<Schema>> {
        let path = self.schema_path();
        if !path.exists() {
            return Ok(None);
        }
        Schema::from_json_file(&path).map(Some)
    }

    /// Load the grouping model and a classifier for every cluster it can
    /// produce, so a gap in the lookup table surfaces before any batch runs.
    pub fn preload(&self) -> Result<usize> {
        let model = self.load_cluster_model()?;
        for cluster_id in 0..model.n_clusters() {
            self.load_classifier(cluster_id)?;
        }
        Ok(model.n_clusters())
    }

    fn read_artifact<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        if !path.is_file() {
            return Err(PipelineError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::corrupt(path, e))?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        serde_json::from_str(&text).map_err(|e| PipelineError::corrupt(path, e))
    }
}
