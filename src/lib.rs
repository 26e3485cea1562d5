//! # Demand Forecast
//!
//! A Rust library for retail demand forecasting and inventory optimization.
//!
//! ## Features
//!
//! - Feature engineering over raw transaction history (daily aggregation,
//!   calendar features, trailing rolling means)
//! - Stable categorical encoding, fit at training time and frozen for
//!   inference
//! - Random-forest demand regressor with a reproducible train/test split
//! - Durable artifact set (regressor + scaler + encoder + metadata)
//!   persisted and reloaded as a unit
//! - Multi-horizon prediction with cold-start fallback behavior
//! - Inventory recommendations (safety stock, reorder urgency, overstock)
//!   derived from 30-day demand estimates
//! - Narrative-report collaborator contract with a deterministic template
//!   fallback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demand_forecast::data::MemoryStore;
//! use demand_forecast::inventory::InventoryOptimizer;
//! use demand_forecast::predictor::DemandPredictor;
//! use demand_forecast::registry::ModelRegistry;
//!
//! # fn main() -> demand_forecast::Result<()> {
//! // Wrap transaction history in a store
//! let store = MemoryStore::new();
//!
//! // Predictor reloads persisted artifacts when present
//! let registry = ModelRegistry::new("model_store");
//! let predictor = DemandPredictor::new(store, registry);
//!
//! // Train explicitly (or let the first prediction cold-start)
//! let report = predictor.train()?;
//! println!("{report}");
//!
//! // Predict demand for product 1, seven days ahead
//! let prediction = predictor.predict(1, 7)?;
//! println!("{:.1} units expected", prediction.predicted_quantity);
//!
//! // Derive stock recommendations from a 30-day forecast
//! let optimizer = InventoryOptimizer::new(&predictor);
//! let recommendation = optimizer.optimize(1)?;
//! println!("status: {:?}", recommendation.status);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod encoder;
pub mod error;
pub mod features;
pub mod inventory;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod registry;
pub mod report;

// Re-export commonly used types
pub use crate::data::{MemoryStore, Product, StoreLoader, Transaction, TransactionStore};
pub use crate::encoder::CategoricalEncoder;
pub use crate::error::{ForecastError, Result};
pub use crate::features::{AggregateRow, FeatureBuilder, FEATURE_NAMES};
pub use crate::inventory::{InventoryOptimizer, StockRecommendation, StockStatus};
pub use crate::metrics::{EvaluationReport, TrainingReport};
pub use crate::predictor::{DemandPredictor, ModelInfo, Prediction, PredictorConfig};
pub use crate::registry::{ArtifactSet, ModelRegistry};
pub use crate::report::{ReportContent, ReportGenerator, ReportKind, TemplateReporter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
