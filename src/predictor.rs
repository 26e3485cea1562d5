//! Demand prediction orchestration: training, prediction, evaluation and
//! model introspection

use crate::data::TransactionStore;
use crate::encoder::CategoricalEncoder;
use crate::error::{ForecastError, Result};
use crate::features::{AggregateRow, CalendarFeatures, FeatureBuilder, FEATURE_COUNT, FEATURE_NAMES};
use crate::metrics::{regression_metrics, train_test_split, EvaluationReport, TrainingReport};
use crate::model::{ForestConfig, RandomForest, StandardScaler};
use crate::registry::{ArtifactSet, ModelHandle, ModelMetadata, ModelRegistry};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Version reported before any training has happened.
const UNTRAINED_VERSION: &str = "1.0.0";

/// Windows and thresholds governing the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Transaction history window for feature building
    pub history_days: i64,
    /// A product quiet for this long gets the fallback prediction
    pub recent_days: i64,
    /// Evaluation scores rows within this trailing window
    pub evaluation_days: i64,
    /// Minimum valid aggregate rows required to train
    pub min_training_rows: usize,
    /// Held-out fraction of the training data
    pub test_ratio: f64,
    /// Seed for the reproducible train/test shuffle
    pub split_seed: u64,
    pub forest: ForestConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            history_days: 730,
            recent_days: 90,
            evaluation_days: 30,
            min_training_rows: 50,
            test_ratio: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

/// Next-period demand prediction for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub product_id: u32,
    pub product_name: String,
    /// Clamped to be non-negative
    pub predicted_quantity: f64,
    /// Heuristic horizon decay in [0.1, 0.95], not a calibrated interval
    pub confidence_score: f64,
    pub prediction_date: DateTime<Utc>,
    pub model_version: String,
}

/// Snapshot of the loaded model's identity and shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub version: String,
    pub last_trained: Option<DateTime<Utc>>,
    pub is_trained: bool,
    pub features: Vec<String>,
}

/// Orchestrates the feature builder, encoder, regressor and registry to
/// answer demand questions against a transaction store.
#[derive(Debug)]
pub struct DemandPredictor<S: TransactionStore> {
    store: S,
    registry: ModelRegistry,
    handle: ModelHandle,
    config: PredictorConfig,
}

impl<S: TransactionStore> DemandPredictor<S> {
    /// Build a predictor, attempting to reload persisted artifacts.
    ///
    /// Missing or corrupt artifacts degrade to an unloaded model with a
    /// warning; the first prediction then trains lazily.
    pub fn new(store: S, registry: ModelRegistry) -> Self {
        Self::with_config(store, registry, PredictorConfig::default())
    }

    pub fn with_config(store: S, registry: ModelRegistry, config: PredictorConfig) -> Self {
        let handle = ModelHandle::empty();
        match registry.load() {
            Ok(Some(artifacts)) => {
                log::info!(
                    "loaded model artifacts version {}",
                    artifacts.metadata.version
                );
                handle.publish(Arc::new(artifacts));
            }
            Ok(None) => {
                log::debug!("no persisted model artifacts; starting unloaded");
            }
            Err(e) => {
                log::warn!("failed to load model artifacts, starting unloaded: {e}");
            }
        }

        Self {
            store,
            registry,
            handle,
            config,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.handle.is_loaded()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Train a fresh artifact set on the full history window and publish it.
    ///
    /// Fits a new encoder and scaler; requires at least
    /// `min_training_rows` valid aggregate rows. On success the artifact
    /// set is persisted atomically and swapped in for subsequent
    /// predictions.
    pub fn train(&self) -> Result<TrainingReport> {
        let since = Utc::now() - Duration::days(self.config.history_days);
        let transactions = self.store.fetch_transactions(None, since)?;
        let rows = FeatureBuilder::daily_aggregates(&transactions)?;

        let mut encoder = CategoricalEncoder::new();
        encoder.fit(&transactions);

        let (features, targets) = Self::valid_rows(&rows, &encoder)?;
        if features.len() < self.config.min_training_rows {
            return Err(ForecastError::InsufficientTrainingData {
                count: features.len(),
                required: self.config.min_training_rows,
            });
        }

        let (train_x, train_y, test_x, test_y) = train_test_split(
            &features,
            &targets,
            self.config.test_ratio,
            self.config.split_seed,
        )?;

        let mut scaler = StandardScaler::new();
        scaler.fit(&train_x)?;
        let train_scaled = scaler.transform(&train_x)?;
        let test_scaled = scaler.transform(&test_x)?;

        let mut forest = RandomForest::new(FEATURE_COUNT, self.config.forest)?;
        forest.fit(&train_scaled, &train_y)?;

        let predicted = forest.predict_batch(&test_scaled)?;
        let metrics = regression_metrics(&test_y, &predicted)?;

        let now = Utc::now();
        let metadata = ModelMetadata {
            version: format!("1.0.{}", now.timestamp()),
            last_trained: now,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        };
        let artifacts = ArtifactSet {
            forest,
            scaler,
            encoder,
            metadata,
        };

        self.registry.save(&artifacts)?;
        self.handle.publish(Arc::new(artifacts));

        log::info!(
            "model trained on {} rows ({} held out), MAE {:.4}",
            train_y.len(),
            test_y.len(),
            metrics.mae
        );

        Ok(TrainingReport {
            mae: metrics.mae,
            mse: metrics.mse,
            r2: metrics.r2,
            train_count: train_y.len(),
            test_count: test_y.len(),
        })
    }

    /// Predict unit demand for a product `days_ahead` days from now.
    ///
    /// A product with no transactions in the trailing recent window gets
    /// the fixed fallback `{quantity: 1.0, confidence: 0.3}` instead of an
    /// error. Otherwise, when no model is loaded this trains synchronously
    /// first, so the first call pays the training cost. Pre-warm with
    /// [`train`](Self::train) where that latency matters.
    pub fn predict(&self, product_id: u32, days_ahead: u32) -> Result<Prediction> {
        let product = self
            .store
            .get_product(product_id)?
            .ok_or(ForecastError::ProductNotFound(product_id))?;

        let now = Utc::now();
        let prediction_date = now + Duration::days(days_ahead as i64);

        // Absence of recent signal is not an error condition.
        let recent_since = now - Duration::days(self.config.recent_days);
        let recent = self
            .store
            .fetch_transactions(Some(product_id), recent_since)?;
        if recent.is_empty() {
            let version = self
                .handle
                .snapshot()
                .map(|a| a.metadata.version.clone())
                .unwrap_or_else(|| UNTRAINED_VERSION.to_string());
            return Ok(Prediction {
                product_id,
                product_name: product.name,
                predicted_quantity: 1.0,
                confidence_score: 0.3,
                prediction_date,
                model_version: version,
            });
        }

        let artifacts = match self.handle.snapshot() {
            Some(artifacts) => artifacts,
            None => {
                log::info!("no model loaded, training before first prediction");
                self.train()?;
                self.handle
                    .snapshot()
                    .ok_or(ForecastError::ModelNotTrained)?
            }
        };

        let history_since = now - Duration::days(self.config.history_days);
        let transactions = self
            .store
            .fetch_transactions(Some(product_id), history_since)?;
        let rows = FeatureBuilder::daily_aggregates(&transactions)?;
        let latest = rows.last().ok_or_else(|| {
            ForecastError::InsufficientData(format!("no aggregate rows for product {product_id}"))
        })?;

        // The latest row carries the product's state; the calendar slots
        // are overwritten with the target date's.
        let mut vector = FeatureBuilder::feature_vector(latest, &artifacts.encoder)?;
        let calendar = CalendarFeatures::for_date(prediction_date.date_naive());
        vector[2] = calendar.day_of_week as f64;
        vector[3] = calendar.month as f64;
        vector[4] = calendar.quarter as f64;
        vector[5] = calendar.is_weekend as u8 as f64;

        let scaled = artifacts.scaler.transform_row(&vector)?;
        let raw = artifacts.forest.predict(&scaled)?;

        Ok(Prediction {
            product_id,
            product_name: product.name,
            predicted_quantity: raw.max(0.0),
            confidence_score: Self::confidence(days_ahead),
            prediction_date,
            model_version: artifacts.metadata.version.clone(),
        })
    }

    /// Score the loaded model against the trailing evaluation window using
    /// the frozen scaler and encoder (never refit here).
    pub fn evaluate(&self) -> Result<EvaluationReport> {
        let artifacts = self.handle.snapshot().ok_or(ForecastError::ModelNotTrained)?;

        let now = Utc::now();
        let history_since = now - Duration::days(self.config.history_days);
        let transactions = self.store.fetch_transactions(None, history_since)?;
        let rows = FeatureBuilder::daily_aggregates(&transactions)?;

        let cutoff = (now - Duration::days(self.config.evaluation_days)).date_naive();
        let recent_rows: Vec<&AggregateRow> =
            rows.iter().filter(|row| row.date >= cutoff).collect();
        if recent_rows.is_empty() {
            return Err(ForecastError::NoEvaluationData);
        }

        let mut actual = Vec::with_capacity(recent_rows.len());
        let mut predicted = Vec::with_capacity(recent_rows.len());
        for row in recent_rows {
            let vector = FeatureBuilder::feature_vector(row, &artifacts.encoder)?;
            let scaled = artifacts.scaler.transform_row(&vector)?;
            predicted.push(artifacts.forest.predict(&scaled)?);
            actual.push(row.quantity);
        }

        let metrics = regression_metrics(&actual, &predicted)?;
        Ok(EvaluationReport {
            mae: metrics.mae,
            mse: metrics.mse,
            r2: metrics.r2,
            sample_count: actual.len(),
        })
    }

    /// Per-feature importance scores keyed by the fixed feature-name list.
    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        let artifacts = self.handle.snapshot().ok_or(ForecastError::ModelNotTrained)?;
        let importances = artifacts.forest.feature_importances()?;
        Ok(FEATURE_NAMES
            .iter()
            .map(|s| s.to_string())
            .zip(importances)
            .collect())
    }

    /// Identity and shape of the currently loaded model.
    pub fn model_info(&self) -> ModelInfo {
        match self.handle.snapshot() {
            Some(artifacts) => ModelInfo {
                model_type: "RandomForest".to_string(),
                version: artifacts.metadata.version.clone(),
                last_trained: Some(artifacts.metadata.last_trained),
                is_trained: true,
                features: artifacts.metadata.feature_names.clone(),
            },
            None => ModelInfo {
                model_type: "RandomForest".to_string(),
                version: UNTRAINED_VERSION.to_string(),
                last_trained: None,
                is_trained: false,
                features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Linear horizon decay clamped to [0.1, 0.95]. A heuristic standing in
    /// for a true prediction interval.
    fn confidence(days_ahead: u32) -> f64 {
        (0.8 - 0.05 * days_ahead as f64).clamp(0.1, 0.95)
    }

    /// Feature vectors and targets for rows whose values are all finite.
    fn valid_rows(
        rows: &[AggregateRow],
        encoder: &CategoricalEncoder,
    ) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
        let mut features = Vec::with_capacity(rows.len());
        let mut targets = Vec::with_capacity(rows.len());
        for row in rows {
            let vector = FeatureBuilder::feature_vector(row, encoder)?;
            if vector.iter().all(|v| v.is_finite()) && row.quantity.is_finite() {
                features.push(vector.to_vec());
                targets.push(row.quantity);
            }
        }
        Ok((features, targets))
    }
}
