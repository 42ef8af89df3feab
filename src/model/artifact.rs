//! On-disk model manifest and loader.
//!
//! ```json
//! {
//!   "model_id": "flight_price_gbr",
//!   "task": { "type": "regression" },
//!   "feature_names": ["Journey_Month", "Journey_Day", "..."],
//!   "backend": { "kind": "linear", "intercept": 3500.0, "coefficients": [12.0, 4.5] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use super::linear::LinearModel;
use super::onnx::OnnxModel;
use super::tree_ensemble::{TreeEnsembleModel, TreeSpec};
use super::{Task, TrainedModel};
use crate::errors::{DashError, DashResult};
use crate::schema::ExpectedSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_id: String,
    pub task: Task,
    /// Column names the model was fit against, in input order.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub backend: Backend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        base_score: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        trees: Vec<TreeSpec>,
    },
    Onnx {
        /// Relative paths resolve against the manifest's directory.
        file: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
    },
}

fn default_learning_rate() -> f64 {
    1.0
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> DashResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| DashError::io(format!("reading model artifact {}", path.display()), e))?;
        serde_json::from_str(&raw).map_err(|e| {
            DashError::serialization(format!("parsing model artifact {}", path.display()), e)
        })
    }

    /// Validate the artifact and build the runnable model.
    pub fn into_model(self, base_dir: &Path) -> DashResult<Arc<dyn TrainedModel>> {
        let schema = ExpectedSchema::from_artifact(&self.model_id, self.feature_names)?;

        let model: Arc<dyn TrainedModel> = match self.backend {
            Backend::Linear {
                intercept,
                coefficients,
            } => Arc::new(LinearModel::new(
                self.model_id,
                self.task,
                schema,
                intercept,
                coefficients,
            )?),
            Backend::TreeEnsemble {
                base_score,
                learning_rate,
                trees,
            } => Arc::new(TreeEnsembleModel::new(
                self.model_id,
                self.task,
                schema,
                base_score,
                learning_rate,
                trees,
            )?),
            Backend::Onnx { file, sha256 } => {
                let path = if file.is_absolute() {
                    file
                } else {
                    base_dir.join(file)
                };
                if let Some(expected) = sha256.as_deref() {
                    verify_digest(&path, expected)?;
                }
                Arc::new(OnnxModel::load(self.model_id, self.task, schema, &path)?)
            }
        };

        Ok(model)
    }
}

/// Load a model artifact from disk. Any failure is a configuration error.
pub fn load_model(path: &Path) -> DashResult<Arc<dyn TrainedModel>> {
    let artifact = ModelArtifact::from_path(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let model = artifact.into_model(base_dir)?;

    info!(
        path = %path.display(),
        model_id = model.model_id(),
        backend = model.backend(),
        features = model.expected_schema().len(),
        "Loaded model artifact"
    );
    Ok(model)
}

pub(crate) fn hash_file(path: &Path) -> DashResult<String> {
    let data = fs::read(path)
        .map_err(|e| DashError::io(format!("reading {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(format!("{:x}", hasher.finalize()))
}

fn verify_digest(path: &Path, expected: &str) -> DashResult<()> {
    let actual = hash_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(DashError::config(format!(
            "digest mismatch for {}: manifest says {}, file is {}",
            path.display(),
            expected,
            actual
        )));
    }
    Ok(())
}
