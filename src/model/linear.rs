use super::{ensure_aligned, ensure_finite, ModelOutput, Task, TrainedModel};
use crate::errors::{DashError, DashResult};
use crate::feature_row::FeatureRow;
use crate::schema::ExpectedSchema;

/// Linear model; classifiers apply a logistic link to the margin.
pub struct LinearModel {
    model_id: String,
    task: Task,
    schema: ExpectedSchema,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(
        model_id: String,
        task: Task,
        schema: ExpectedSchema,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> DashResult<Self> {
        if coefficients.len() != schema.len() {
            return Err(DashError::config(format!(
                "linear model '{model_id}' has {} coefficients for {} features",
                coefficients.len(),
                schema.len()
            )));
        }

        Ok(Self {
            model_id,
            task,
            schema,
            intercept,
            coefficients,
        })
    }

    /// Linear combination: intercept + sum(coefficient_i * feature_i)
    pub fn margin(&self, row: &FeatureRow) -> f64 {
        self.intercept
            + row
                .values()
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }
}

impl TrainedModel for LinearModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn backend(&self) -> &'static str {
        "linear"
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
        Ok(self.task.from_margin(self.margin(row)))
    }
}
