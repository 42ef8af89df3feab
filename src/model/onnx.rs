//! ONNX graphs executed with tract.
//!
//! The graph takes a single `[1, n_features]` float tensor. Regressors read
//! the first output as the value. Classifiers read the first output as the
//! label and, when present, column 1 of the second output as the positive
//! class probability.

use std::path::Path;

use tract_onnx::prelude::*;

use super::{ensure_aligned, ensure_finite, ModelOutput, Task, TrainedModel};
use crate::errors::{DashError, DashResult};
use crate::feature_row::FeatureRow;
use crate::schema::ExpectedSchema;

type Plan = TypedRunnableModel<TypedModel>;

pub struct OnnxModel {
    model_id: String,
    task: Task,
    schema: ExpectedSchema,
    plan: Plan,
}

impl OnnxModel {
    pub fn load(
        model_id: String,
        task: Task,
        schema: ExpectedSchema,
        path: &Path,
    ) -> DashResult<Self> {
        let width = schema.len();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| {
                m.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)))
            })
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| {
                DashError::config(format!(
                    "loading ONNX graph {} for '{model_id}': {e}",
                    path.display()
                ))
            })?;

        let model = Self {
            model_id,
            task,
            schema,
            plan,
        };

        // A graph whose input width disagrees with the schema must not load.
        let zeros = crate::feature_row::reindex(
            &crate::feature_row::ComputedColumns::new(),
            &model.schema,
        );
        model.run(&zeros).map_err(|e| {
            DashError::config(format!(
                "ONNX graph {} does not accept {width} features for '{}': {e}",
                path.display(),
                model.model_id
            ))
        })?;

        Ok(model)
    }

    fn run(&self, row: &FeatureRow) -> TractResult<TVec<TValue>> {
        let input = Tensor::from_shape(&[1, row.len()], &row.to_f32())?;
        self.plan.run(tvec!(input.into()))
    }
}

fn first_scalar(value: &TValue) -> TractResult<f64> {
    let as_float = value.cast_to::<f32>()?;
    as_float
        .as_slice::<f32>()?
        .first()
        .map(|v| *v as f64)
        .ok_or_else(|| anyhow::anyhow!("model produced an empty output tensor"))
}

fn positive_probability(value: &TValue) -> TractResult<Option<f64>> {
    let as_float = value.cast_to::<f32>()?;
    Ok(as_float.as_slice::<f32>()?.get(1).map(|p| *p as f64))
}

impl TrainedModel for OnnxModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn task(&self) -> Task {
        self.task
    }

    fn expected_schema(&self) -> &ExpectedSchema {
        &self.schema
    }

    fn predict(&self, row: &FeatureRow) -> DashResult<ModelOutput> {
        ensure_aligned(&self.schema, row)?;
        ensure_finite(row)?;

        let outputs = self
            .run(row)
            .map_err(|e| DashError::inference(format!("ONNX run failed: {e}")))?;
        let first = outputs
            .first()
            .ok_or_else(|| DashError::inference("ONNX graph produced no outputs"))?;
        let head = first_scalar(first)
            .map_err(|e| DashError::inference(format!("reading ONNX output: {e}")))?;

        match self.task {
            Task::Regression => Ok(ModelOutput::Value { value: head }),
            Task::Classification { threshold } => {
                let score = match outputs.get(1) {
                    Some(probabilities) => positive_probability(probabilities).map_err(|e| {
                        DashError::inference(format!("reading ONNX probabilities: {e}"))
                    })?,
                    None => None,
                };
                let positive = match score {
                    Some(p) => p >= threshold,
                    None => head >= 0.5,
                };
                Ok(ModelOutput::Class { positive, score })
            }
        }
    }
}
