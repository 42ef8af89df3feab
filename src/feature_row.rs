//! Computed columns and the schema-aligned row handed to a model.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::form::Category;
use crate::schema::ExpectedSchema;

/// Columns produced by an adapter before alignment, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedColumns {
    values: BTreeMap<String, f64>,
}

impl ComputedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: f64) -> &mut Self {
        self.values.insert(column.into(), value);
        self
    }

    pub fn set_int(&mut self, column: impl Into<String>, value: i64) -> &mut Self {
        self.set(column, value as f64)
    }

    pub fn set_flag(&mut self, column: impl Into<String>, on: bool) -> &mut Self {
        self.set(column, if on { 1.0 } else { 0.0 })
    }

    /// One indicator per possible category value, 1 only for `selected`.
    pub fn one_hot<C: Category>(&mut self, prefix: &str, selected: C) -> &mut Self {
        for candidate in C::ALL {
            self.set_flag(format!("{prefix}{}", candidate.label()), *candidate == selected);
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A single row whose columns are exactly an [`ExpectedSchema`], in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn matches(&self, schema: &ExpectedSchema) -> bool {
        self.columns.as_slice() == schema.columns()
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

// Serialized as a JSON object in schema order.
impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Align computed columns to a schema: zero-fill what is missing, drop
/// what is not required, and take the schema's order.
pub fn reindex(computed: &ComputedColumns, schema: &ExpectedSchema) -> FeatureRow {
    let columns = schema.columns().to_vec();
    let values = schema
        .iter()
        .map(|column| computed.get(column).unwrap_or(0.0))
        .collect();
    FeatureRow { columns, values }
}

/// Which columns reindexing had to invent or discard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    pub filled: Vec<String>,
    pub dropped: Vec<String>,
}

impl AlignmentReport {
    pub fn between(computed: &ComputedColumns, schema: &ExpectedSchema) -> Self {
        let filled = schema
            .iter()
            .filter(|c| !computed.contains(c))
            .map(str::to_string)
            .collect();
        let dropped = computed
            .names()
            .filter(|c| !schema.contains(c))
            .map(str::to_string)
            .collect();
        Self { filled, dropped }
    }

    pub fn is_exact(&self) -> bool {
        self.filled.is_empty() && self.dropped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(cols: &[&str]) -> ExpectedSchema {
        ExpectedSchema::from_artifact("test", Some(cols.iter().map(|c| c.to_string()).collect()))
            .unwrap()
    }

    #[test]
    fn reindex_fills_drops_and_orders() {
        let mut computed = ComputedColumns::new();
        computed.set("b", 2.0).set("extra", 9.0).set("a", 1.0);

        let row = reindex(&computed, &schema(&["a", "missing", "b"]));
        assert_eq!(row.columns(), ["a", "missing", "b"]);
        assert_eq!(row.values(), [1.0, 0.0, 2.0]);
        assert_eq!(row.get("extra"), None);

        let report = AlignmentReport::between(&computed, &schema(&["a", "missing", "b"]));
        assert_eq!(report.filled, vec!["missing"]);
        assert_eq!(report.dropped, vec!["extra"]);
        assert!(!report.is_exact());
    }

    #[test]
    fn serializes_in_schema_order() {
        let mut computed = ComputedColumns::new();
        computed.set("z", 1.0).set("a", 2.0);
        let row = reindex(&computed, &schema(&["z", "a"]));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"z":1.0,"a":2.0}"#);
    }
}
