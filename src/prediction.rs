//! Presentation of a model output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{DashError, DashResult};
use crate::feature_row::FeatureRow;
use crate::model::ModelOutput;

pub const SATISFIED: &str = "Satisfied";
pub const NOT_SATISFIED: &str = "Neutral/Unhappy";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    Price {
        value: f64,
        low: f64,
        high: f64,
        rendered: String,
        range_rendered: String,
    },
    Satisfaction {
        satisfied: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
        rendered: String,
    },
}

impl PredictionResult {
    /// A price with a symmetric `band` (0.1 = ±10%) around it.
    pub fn price(output: ModelOutput, band: f64) -> DashResult<Self> {
        let value = match output {
            ModelOutput::Value { value } => value,
            ModelOutput::Class { .. } => {
                return Err(DashError::inference(
                    "price model returned a class label instead of a value",
                ))
            }
        };
        let low = value * (1.0 - band);
        let high = value * (1.0 + band);

        Ok(PredictionResult::Price {
            value,
            low,
            high,
            rendered: format!("Predicted Price: ${value:.2}"),
            range_rendered: format!("Estimated Price Range: ${low:.2} - ${high:.2}"),
        })
    }

    pub fn satisfaction(output: ModelOutput) -> DashResult<Self> {
        let (satisfied, score) = match output {
            ModelOutput::Class { positive, score } => (positive, score),
            ModelOutput::Value { .. } => {
                return Err(DashError::inference(
                    "satisfaction model returned a value instead of a class label",
                ))
            }
        };

        Ok(PredictionResult::Satisfaction {
            satisfied,
            score,
            rendered: if satisfied { SATISFIED } else { NOT_SATISFIED }.to_string(),
        })
    }

    pub fn rendered(&self) -> &str {
        match self {
            PredictionResult::Price { rendered, .. }
            | PredictionResult::Satisfaction { rendered, .. } => rendered,
        }
    }
}

/// Body returned by the predict endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub model_id: String,
    pub result: PredictionResult,
    pub features: FeatureRow,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResponse {
    pub fn new(model_id: &str, result: PredictionResult, features: FeatureRow) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            model_id: model_id.to_string(),
            result,
            features,
            timestamp: Utc::now(),
        }
    }
}
