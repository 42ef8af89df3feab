//! Feature adapter: raw form input to a model's exact input row.

use tracing::debug;

use crate::feature_row::{reindex, AlignmentReport, ComputedColumns, FeatureRow};
use crate::schema::ExpectedSchema;

/// Converts one kind of raw input into the columns a model expects.
///
/// `compute` produces every passthrough, one-hot and derived column the
/// adapter knows about. `adapt` then aligns that set to the schema. Both are
/// pure; calling them twice with the same arguments gives the same row.
pub trait FeatureAdapter: Send + Sync {
    type Input;

    fn name(&self) -> &'static str;

    fn compute(&self, input: &Self::Input) -> ComputedColumns;

    fn adapt(&self, input: &Self::Input, schema: &ExpectedSchema) -> FeatureRow {
        let computed = self.compute(input);
        let report = AlignmentReport::between(&computed, schema);
        if !report.is_exact() {
            debug!(
                adapter = self.name(),
                filled = ?report.filled,
                dropped = ?report.dropped,
                "Reindexed computed columns against expected schema"
            );
        }
        reindex(&computed, schema)
    }
}
