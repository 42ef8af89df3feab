//! Gradient-boosted regression trees stored as flat node arrays.
//!
//! Each tree uses the same layout as a fitted scikit-learn `tree_`: node `i`
//! splits on `feature[i]` at `threshold[i]` (go left when `x <= threshold`),
//! and is a leaf when `children_left[i] == -1`, in which case `value[i]` is
//! its output. The ensemble margin is
//! `base_score + learning_rate * sum(tree outputs)`.

use serde::{Deserialize, Serialize};

use super::{ensure_aligned, ensure_finite, ModelOutput, Task, TrainedModel};
use crate::errors::{DashError, DashResult};
use crate::feature_row::FeatureRow;
use crate::schema::ExpectedSchema;

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_spec(index: usize, spec: TreeSpec, n_features: usize) -> DashResult<Self> {
        let n = spec.children_left.len();
        let bad = |reason: String| DashError::config(format!("tree {index}: {reason}"));

        if n == 0 {
            return Err(bad("has no nodes".into()));
        }
        if [
            spec.children_right.len(),
            spec.feature.len(),
            spec.threshold.len(),
            spec.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(bad("node arrays differ in length".into()));
        }

        let child = |node: usize, raw: i64| -> DashResult<usize> {
            // Children always come after their parent, which rules out cycles.
            match usize::try_from(raw) {
                Ok(c) if c > node && c < n => Ok(c),
                _ => Err(bad(format!("node {node} has invalid child {raw}"))),
            }
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            if spec.children_left[i] == LEAF {
                nodes.push(Node::Leaf(spec.value[i]));
                continue;
            }
            let feature = usize::try_from(spec.feature[i])
                .ok()
                .filter(|f| *f < n_features)
                .ok_or_else(|| {
                    bad(format!(
                        "node {i} splits on feature {} but the schema has {n_features} columns",
                        spec.feature[i]
                    ))
                })?;
            nodes.push(Node::Split {
                feature,
                threshold: spec.threshold[i],
                left: child(i, spec.children_left[i])?,
                right: child(i, spec.children_right[i])?,
            });
        }

        Ok(Self { nodes })
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match self.nodes[at] {
                Node::Leaf(v) => return v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

pub struct TreeEnsembleModel {
    model_id: String,
    task: Task,
    schema: ExpectedSchema,
    base_score: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
}

impl TreeEnsembleModel {
    pub fn new(
        model_id: String,
        task: Task,
        schema: ExpectedSchema,
        base_score: f64,
        learning_rate: f64,
        trees: Vec<TreeSpec>,
    ) -> DashResult<Self> {
        if trees.is_empty() {
            return Err(DashError::config(format!(
                "tree ensemble '{model_id}' has no trees"
            )));
        }
        let trees = trees
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Tree::from_spec(i, spec, schema.len()))
            .collect::<DashResult<Vec<_>>>()?;

        Ok(Self {
            model_id,
            task,
            schema,
            base_score,
            learning_rate,
            trees,
        })
    }

    pub fn margin(&self, row: &FeatureRow) -> f64 {
        let x = row.values();
        self.base_score
            + self.learning_rate * self.trees.iter().map(|t| t.evaluate(x)).sum::<f64>()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TrainedModel for TreeEnsembleModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn backend(&self) -> &'static str {
        "tree_ensemble"
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
