//! Trained model artifacts.
//!
//! A model is opaque to the rest of the crate: it reports the columns it was
//! fit against and turns one aligned row into a scalar or a label. Loading
//! goes through [`artifact::ModelArtifact`], which is the only place an
//! [`ExpectedSchema`] is created.

pub mod artifact;
pub mod linear;
pub mod onnx;
pub mod tree_ensemble;

use serde::{Deserialize, Serialize};

use crate::errors::{DashError, DashResult};
use crate::feature_row::FeatureRow;
use crate::schema::ExpectedSchema;

pub use artifact::{load_model, ModelArtifact};
pub use linear::LinearModel;
pub use onnx::OnnxModel;
pub use tree_ensemble::TreeEnsembleModel;

/// What a model predicts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    Regression,
    Classification {
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

fn default_threshold() -> f64 {
    0.5
}

impl Task {
    pub fn is_classification(&self) -> bool {
        matches!(self, Task::Classification { .. })
    }

    /// Turn a raw margin into the task's output; classifiers use a logistic link.
    pub fn from_margin(&self, margin: f64) -> ModelOutput {
        match self {
            Task::Regression => ModelOutput::Value { value: margin },
            Task::Classification { threshold } => {
                let score = sigmoid(margin);
                ModelOutput::Class {
                    positive: score >= *threshold,
                    score: Some(score),
                }
            }
        }
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Raw result of a predict call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelOutput {
    Value { value: f64 },
    Class { positive: bool, score: Option<f64> },
}

/// An opaque trained model with a fixed input contract.
pub trait TrainedModel: Send + Sync {
    fn model_id(&self) -> &str;

    fn backend(&self) -> &'static str;

    fn task(&self) -> Task;

    fn expected_schema(&self) -> &ExpectedSchema;

    fn predict(&self, row: &FeatureRow) -> DashResult<ModelOutput>;
}

/// Reject rows that were not aligned to this model's schema.
pub(crate) fn ensure_aligned(schema: &ExpectedSchema, row: &FeatureRow) -> DashResult<()> {
    if row.matches(schema) {
        return Ok(());
    }

    let first_mismatch = schema
        .iter()
        .zip(row.columns())
        .position(|(expected, got)| expected != got)
        .unwrap_or_else(|| schema.len().min(row.len()));
    Err(DashError::inference(format!(
        "feature row does not match expected schema: {} columns given, {} expected, first difference at position {}",
        row.len(),
        schema.len(),
        first_mismatch
    )))
}

/// Reject values a model cannot consume.
pub(crate) fn ensure_finite(row: &FeatureRow) -> DashResult<()> {
    match row.iter().find(|(_, v)| !v.is_finite()) {
        Some((column, value)) => Err(DashError::inference(format!(
            "column '{column}' holds non-finite value {value}"
        ))),
        None => Ok(()),
    }
}
