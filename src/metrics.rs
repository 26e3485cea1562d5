//! Regression metrics and the train/evaluation reports

use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// MAE, MSE and R² for a set of predictions against actuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
}

/// Held-out metrics returned by a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
    pub train_count: usize,
    pub test_count: usize,
}

impl std::fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Training Report:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  R2:    {:.4}", self.r2)?;
        writeln!(f, "  Train: {}", self.train_count)?;
        writeln!(f, "  Test:  {}", self.test_count)?;
        Ok(())
    }
}

/// Metrics from scoring the loaded model against a recent window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
    pub sample_count: usize,
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Evaluation Report:")?;
        writeln!(f, "  MAE:     {:.4}", self.mae)?;
        writeln!(f, "  MSE:     {:.4}", self.mse)?;
        writeln!(f, "  R2:      {:.4}", self.r2)?;
        writeln!(f, "  Samples: {}", self.sample_count)?;
        Ok(())
    }
}

/// Compute MAE, MSE and R² between actual and predicted values.
///
/// R² guards the zero-variance denominator: constant targets score 1.0 when
/// matched exactly and 0.0 otherwise.
pub fn regression_metrics(actual: &[f64], predicted: &[f64]) -> Result<RegressionMetrics> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "actual and predicted values must have the same non-zero length".to_string(),
        ));
    }

    let n = actual.len() as f64;
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Ok(RegressionMetrics { mae, mse, r2 })
}

/// Shuffle rows with a fixed seed and split them into train and test sets.
///
/// `test_ratio` must lie strictly between 0 and 1; the test set gets
/// `round(n * test_ratio)` rows, the rest train.
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    features: &[Vec<f64>],
    targets: &[f64],
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<Vec<f64>>, Vec<f64>, Vec<Vec<f64>>, Vec<f64>)> {
    if features.len() != targets.len() || features.len() < 2 {
        return Err(ForecastError::ValidationError(
            "features and targets must have the same length of at least 2".to_string(),
        ));
    }
    if test_ratio <= 0.0 || test_ratio >= 1.0 {
        return Err(ForecastError::InvalidParameter(
            "test_ratio must be between 0 and 1".to_string(),
        ));
    }

    let mut indices: Vec<usize> = (0..features.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((features.len() as f64) * test_ratio).round() as usize;
    let test_size = test_size.clamp(1, features.len() - 1);
    let (test_idx, train_idx) = indices.split_at(test_size);

    let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        (
            idx.iter().map(|&i| features[i].clone()).collect(),
            idx.iter().map(|&i| targets[i]).collect(),
        )
    };

    let (test_x, test_y) = pick(test_idx);
    let (train_x, train_y) = pick(train_idx);
    Ok((train_x, train_y, test_x, test_y))
}
