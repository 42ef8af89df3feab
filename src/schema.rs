//! The ordered column list a trained model was fit against.

use std::collections::HashSet;

use serde::Serialize;

use crate::errors::{DashError, DashResult};

/// Ordered, duplicate-free input columns of a model.
///
/// Only constructed from a model artifact's own metadata; there is no
/// hand-maintained fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpectedSchema {
    columns: Vec<String>,
}

impl ExpectedSchema {
    /// Build the schema from the feature names stored in an artifact.
    pub fn from_artifact(model_id: &str, names: Option<Vec<String>>) -> DashResult<Self> {
        let columns = names.ok_or_else(|| {
            DashError::schema_unavailable(model_id, "artifact does not list feature_names")
        })?;

        if columns.is_empty() {
            return Err(DashError::schema_unavailable(
                model_id,
                "feature_names is empty",
            ));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if name.trim().is_empty() {
                return Err(DashError::schema_unavailable(
                    model_id,
                    "feature_names contains a blank name",
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(DashError::schema_unavailable(
                    model_id,
                    format!("feature_names lists '{name}' twice"),
                ));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}
