//! Bagged ensemble of regression trees

use crate::error::{ForecastError, Result};
use crate::model::tree::{DecisionTree, TreeConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Ensemble shape and seeding
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Base seed; tree `i` bootstraps with `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Random-forest regressor: trees grown on bootstrap resamples, prediction
/// is the mean of the per-tree predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    input_dim: usize,
}

impl RandomForest {
    pub fn new(input_dim: usize, config: ForestConfig) -> Result<Self> {
        if config.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if input_dim == 0 {
            return Err(ForecastError::InvalidParameter(
                "input_dim must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            config,
            trees: Vec::new(),
            input_dim,
        })
    }

    /// Fit the ensemble. Fully deterministic for a given config seed.
    pub fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if features.is_empty() || features.len() != targets.len() {
            return Err(ForecastError::ValidationError(format!(
                "feature rows ({}) do not match targets ({})",
                features.len(),
                targets.len()
            )));
        }

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
        };

        let n = features.len();
        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for t in 0..self.config.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(t as u64));

            // Bootstrap resample, same size as the training set
            let mut sample_features = Vec::with_capacity(n);
            let mut sample_targets = Vec::with_capacity(n);
            for _ in 0..n {
                let idx = rng.gen_range(0..n);
                sample_features.push(features[idx].clone());
                sample_targets.push(targets[idx]);
            }

            let mut tree = DecisionTree::new(self.input_dim, tree_config);
            tree.fit(&sample_features, &sample_targets)?;
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    /// Predict a single sample as the mean over all trees.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }
        if features.len() != self.input_dim {
            return Err(ForecastError::ValidationError(format!(
                "expected {} features, got {}",
                self.input_dim,
                features.len()
            )));
        }

        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict(features))
            .sum::<Result<f64>>()?;
        Ok(sum / self.trees.len() as f64)
    }

    /// Predict a batch of samples.
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    /// Mean per-feature impurity decrease across trees, normalized to sum
    /// to one (all zeros when no split ever used any feature).
    pub fn feature_importances(&self) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }

        let mut totals = vec![0.0; self.input_dim];
        for tree in &self.trees {
            for (total, imp) in totals.iter_mut().zip(tree.importances()) {
                *total += imp;
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for total in &mut totals {
                *total /= sum;
            }
        }
        Ok(totals)
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}
