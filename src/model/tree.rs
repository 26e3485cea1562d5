//! MSE regression tree, the base learner of the forest

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// A node in the regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal node with split condition
    Internal {
        feature_idx: usize,
        threshold: f64,
        /// Left child (feature <= threshold)
        left: Box<TreeNode>,
        /// Right child (feature > threshold)
        right: Box<TreeNode>,
    },
    /// Leaf node predicting the mean target of its samples
    Leaf { value: f64, num_samples: usize },
}

impl TreeNode {
    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            TreeNode::Internal {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if features[*feature_idx] <= *threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
            TreeNode::Leaf { value, .. } => *value,
        }
    }

    /// Count total nodes in the subtree
    pub fn count_nodes(&self) -> usize {
        match self {
            TreeNode::Internal { left, right, .. } => 1 + left.count_nodes() + right.count_nodes(),
            TreeNode::Leaf { .. } => 1,
        }
    }
}

/// Tree growth limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Regression tree splitting on mean-squared-error reduction.
///
/// Tracks the total impurity decrease attributed to each feature while
/// growing, which the forest aggregates into feature importances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    config: TreeConfig,
    input_dim: usize,
    importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(input_dim: usize, config: TreeConfig) -> Self {
        Self {
            root: None,
            config,
            input_dim,
            importances: vec![0.0; input_dim],
        }
    }

    /// Fit the tree to training data.
    pub fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if features.is_empty() || targets.is_empty() {
            return Err(ForecastError::ValidationError(
                "cannot fit tree on empty data".to_string(),
            ));
        }
        if features.len() != targets.len() {
            return Err(ForecastError::ValidationError(format!(
                "feature rows ({}) do not match targets ({})",
                features.len(),
                targets.len()
            )));
        }
        if features[0].len() != self.input_dim {
            return Err(ForecastError::ValidationError(format!(
                "expected {} features, got {}",
                self.input_dim,
                features[0].len()
            )));
        }

        let indices: Vec<usize> = (0..features.len()).collect();
        let mut importances = vec![0.0; self.input_dim];
        let total = features.len();
        self.root = Some(Self::build(
            &self.config,
            features,
            targets,
            &indices,
            0,
            total,
            &mut importances,
        ));
        self.importances = importances;
        Ok(())
    }

    /// Predict a single sample. Errors when the tree was never fitted.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        match &self.root {
            Some(root) => Ok(root.predict(features)),
            None => Err(ForecastError::ModelNotTrained),
        }
    }

    /// Per-feature total impurity decrease accumulated during growth.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    fn build(
        config: &TreeConfig,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        depth: usize,
        total_samples: usize,
        importances: &mut [f64],
    ) -> TreeNode {
        let values: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        let should_stop = depth >= config.max_depth
            || indices.len() < config.min_samples_split
            || Self::is_pure(&values);
        if should_stop {
            return TreeNode::Leaf {
                value: mean,
                num_samples: indices.len(),
            };
        }

        let parent_impurity = Self::mse(&values, mean);
        let best = Self::best_split(config, features, targets, indices, parent_impurity);

        match best {
            Some(split) => {
                // Weighted impurity decrease, normalized by the full
                // training count so importances sum consistently.
                let weight = indices.len() as f64 / total_samples as f64;
                importances[split.feature_idx] += weight * split.gain;

                let left = Box::new(Self::build(
                    config,
                    features,
                    targets,
                    &split.left_indices,
                    depth + 1,
                    total_samples,
                    importances,
                ));
                let right = Box::new(Self::build(
                    config,
                    features,
                    targets,
                    &split.right_indices,
                    depth + 1,
                    total_samples,
                    importances,
                ));

                TreeNode::Internal {
                    feature_idx: split.feature_idx,
                    threshold: split.threshold,
                    left,
                    right,
                }
            }
            None => TreeNode::Leaf {
                value: mean,
                num_samples: indices.len(),
            },
        }
    }

    fn best_split(
        config: &TreeConfig,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        parent_impurity: f64,
    ) -> Option<Split> {
        let input_dim = features[indices[0]].len();
        let n = indices.len() as f64;
        let mut best: Option<Split> = None;

        for feature_idx in 0..input_dim {
            let mut feature_values: Vec<f64> =
                indices.iter().map(|&i| features[i][feature_idx]).collect();
            feature_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            feature_values.dedup();

            // Midpoints between consecutive distinct values
            for pair in feature_values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;

                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| features[i][feature_idx] <= threshold);
                if left_indices.len() < config.min_samples_leaf
                    || right_indices.len() < config.min_samples_leaf
                {
                    continue;
                }

                let left_values: Vec<f64> = left_indices.iter().map(|&i| targets[i]).collect();
                let right_values: Vec<f64> = right_indices.iter().map(|&i| targets[i]).collect();
                let left_mean = left_values.iter().sum::<f64>() / left_values.len() as f64;
                let right_mean = right_values.iter().sum::<f64>() / right_values.len() as f64;

                let weighted = (left_values.len() as f64 / n) * Self::mse(&left_values, left_mean)
                    + (right_values.len() as f64 / n) * Self::mse(&right_values, right_mean);
                let gain = parent_impurity - weighted;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Split {
                        feature_idx,
                        threshold,
                        gain,
                        left_indices,
                        right_indices,
                    });
                }
            }
        }

        best
    }

    fn mse(values: &[f64], mean: f64) -> f64 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
    }

    fn is_pure(values: &[f64]) -> bool {
        let first = values[0];
        values.iter().all(|&v| (v - first).abs() < 1e-10)
    }
}

struct Split {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
    left_indices: Vec<usize>,
    right_indices: Vec<usize>,
}
