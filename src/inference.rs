//! The inference call: collect input, adapt it, hand the row to the model.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::FeatureAdapter;
use crate::errors::DashResult;
use crate::feature_row::{AlignmentReport, FeatureRow};
use crate::form::FormInput;
use crate::model::{ModelOutput, TrainedModel};
use crate::schema::ExpectedSchema;

/// A feature adapter bound to the model whose schema it targets.
pub struct Predictor<A: FeatureAdapter> {
    adapter: A,
    model: Arc<dyn TrainedModel>,
}

/// Outcome of one inference call.
#[derive(Debug, Clone)]
pub struct Inference {
    pub row: FeatureRow,
    pub output: ModelOutput,
}

impl<A> Predictor<A>
where
    A: FeatureAdapter,
    A::Input: FormInput + Default,
{
    pub fn new(adapter: A, model: Arc<dyn TrainedModel>) -> Self {
        let predictor = Self { adapter, model };
        let alignment = predictor.alignment();
        if !alignment.filled.is_empty() {
            warn!(
                adapter = predictor.adapter.name(),
                model_id = predictor.model.model_id(),
                missing = ?alignment.filled,
                "Model expects columns this adapter never produces; they will always be 0"
            );
        }
        predictor
    }

    /// How the adapter's full column set lines up with the model schema.
    /// Every one-hot group is produced whatever the selection, so the
    /// default input covers all columns the adapter can emit.
    pub fn alignment(&self) -> AlignmentReport {
        AlignmentReport::between(&self.adapter.compute(&A::Input::default()), self.schema())
    }

    pub fn schema(&self) -> &ExpectedSchema {
        self.model.expected_schema()
    }

    pub fn model(&self) -> &dyn TrainedModel {
        self.model.as_ref()
    }

    pub fn predict(&self, input: A::Input) -> DashResult<Inference> {
        let input = input.collect()?;
        let row = self.adapter.adapt(&input, self.schema());
        debug!(
            adapter = self.adapter.name(),
            model_id = self.model.model_id(),
            columns = row.len(),
            "Running inference"
        );

        let output = self.model.predict(&row).inspect_err(|e| {
            warn!(
                adapter = self.adapter.name(),
                model_id = self.model.model_id(),
                error = %e,
                "Prediction attempt abandoned"
            );
        })?;

        Ok(Inference { row, output })
    }
}
