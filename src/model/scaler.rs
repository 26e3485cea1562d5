//! Per-column feature standardization

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Standardizes features to zero mean and unit variance, column by column.
///
/// Fitted on the training split only and frozen afterwards; prediction and
/// evaluation reuse the training-time parameters. A constant column scales
/// to zero rather than dividing by zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit column means and standard deviations from the given rows.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        if rows.is_empty() {
            return Err(ForecastError::ValidationError(
                "cannot fit scaler on empty data".to_string(),
            ));
        }
        let dim = rows[0].len();
        if rows.iter().any(|r| r.len() != dim) {
            return Err(ForecastError::ValidationError(
                "inconsistent row dimensions while fitting scaler".to_string(),
            ));
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; dim];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; dim];
        for row in rows {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
        }

        self.means = means;
        self.stds = stds;
        Ok(())
    }

    /// Scale a single row with the fitted parameters.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if self.means.is_empty() {
            return Err(ForecastError::ValidationError(
                "scaler has not been fitted".to_string(),
            ));
        }
        if row.len() != self.means.len() {
            return Err(ForecastError::ValidationError(format!(
                "expected {} features, got {}",
                self.means.len(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (m, s))| if *s > 0.0 { (v - m) / s } else { 0.0 })
            .collect())
    }

    /// Scale a batch of rows with the fitted parameters.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    pub fn is_fitted(&self) -> bool {
        !self.means.is_empty()
    }
}
