//! Multiclass gradient boosted tree ensemble.
//!
//! Each boosting iteration holds one regression tree per class. The raw
//! score of class `k` is its baseline plus the leaf values reached in every
//! iteration's `k`-th tree. Probabilities are the softmax of those scores.
//!
//! Trees are stored as flat node lists:
//!
//! ```json
//! {"nodes": [
//!   {"feature": 2, "threshold": 45.0, "left": 1, "right": 2, "missing_go_to_left": true},
//!   {"value": 0.35},
//!   {"value": -0.12}
//! ]}
//! ```
//!
//! A row goes left when `x <= threshold`; NaN follows `missing_go_to_left`,
//! which defaults to left when the key is omitted.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Shape of a classifier, reported on the dashboard's model info tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSummary {
    pub kind: String,
    pub n_iterations: usize,
    pub n_trees: usize,
}

pub trait Classifier: Send + Sync {
    fn n_classes(&self) -> usize;

    /// Raw per-class scores for one prepared row.
    fn decision_function(&self, row: ArrayView1<'_, f64>) -> Array1<f64>;

    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        softmax(&self.decision_function(row))
    }

    fn predict(&self, row: ArrayView1<'_, f64>) -> usize {
        argmax(&self.decision_function(row))
    }

    /// Checks the classifier can consume rows of `n_features` values.
    fn validate(&self, _n_features: usize) -> Result<(), PipelineError> {
        Ok(())
    }

    fn summary(&self) -> ClassifierSummary {
        ClassifierSummary {
            kind: "custom".to_string(),
            n_iterations: 0,
            n_trees: 0,
        }
    }
}

/// Numerically stable softmax.
pub fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s));
    let exp = scores.mapv(|s| (s - max).exp());
    let total = exp.sum();
    exp / total
}

/// Index of the highest score; ties resolve to the lowest index.
pub fn argmax(scores: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "missing_goes_left")]
        missing_go_to_left: bool,
    },
    Leaf {
        value: f64,
    },
}

fn missing_goes_left() -> bool {
    true
}

impl Node {
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Node::Split {
            feature,
            threshold,
            left,
            right,
            missing_go_to_left: missing_goes_left(),
        }
    }

    pub fn leaf(value: f64) -> Self {
        Node::Leaf { value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Children always sit after their parent, which rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {} has non-finite value {}", id, value));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but the schema has {}",
                            id, feature, n_features
                        ));
                    }
                    for child in [left, right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", id, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_go_to_left,
                } => {
                    let x = row[feature];
                    let go_left = if x.is_nan() {
                        missing_go_to_left
                    } else {
                        x <= threshold
                    };
                    id = if go_left { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub baseline: Vec<f64>,
    /// One entry per boosting iteration, each with one tree per class.
    pub trees: Vec<Vec<Tree>>,
}

impl GradientBoostedTrees {
    pub fn new(baseline: Vec<f64>, trees: Vec<Vec<Tree>>) -> Self {
        Self { baseline, trees }
    }
}

impl Classifier for GradientBoostedTrees {
    fn n_classes(&self) -> usize {
        self.baseline.len()
    }

    fn decision_function(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut scores = Array1::from(self.baseline.clone());
        for iteration in &self.trees {
            for (k, tree) in iteration.iter().enumerate() {
                scores[k] += tree.evaluate(row);
            }
        }
        scores
    }

    fn validate(&self, n_features: usize) -> Result<(), PipelineError> {
        let n_classes = self.n_classes();
        if n_classes == 0 {
            return Err(PipelineError::artifact("classifier baseline is empty"));
        }
        if let Some(score) = self.baseline.iter().find(|s| !s.is_finite()) {
            return Err(PipelineError::artifact(format!(
                "classifier baseline has non-finite score {}",
                score
            )));
        }

        for (i, iteration) in self.trees.iter().enumerate() {
            if iteration.len() != n_classes {
                return Err(PipelineError::artifact(format!(
                    "iteration {} has {} trees, expected one per class ({})",
                    i,
                    iteration.len(),
                    n_classes
                )));
            }
            for (k, tree) in iteration.iter().enumerate() {
                tree.validate(n_features).map_err(|msg| {
                    PipelineError::artifact(format!("iteration {} class {}: {}", i, k, msg))
                })?;
            }
        }
        Ok(())
    }

    fn summary(&self) -> ClassifierSummary {
        ClassifierSummary {
            kind: "gradient_boosted_trees".to_string(),
            n_iterations: self.trees.len(),
            n_trees: self.trees.iter().map(Vec::len).sum(),
        }
    }
}
