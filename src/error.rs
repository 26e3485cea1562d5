//! Error types for the demand_forecast crate

use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The transaction window produced no rows to build features from
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Too few valid aggregate rows to fit the regressor
    #[error("Insufficient training data: {count} rows available, {required} required")]
    InsufficientTrainingData { count: usize, required: usize },

    /// `encode` was called before `fit` (or before loading a fitted encoder)
    #[error("Encoder has not been fitted")]
    EncoderNotFitted,

    /// An operation requiring a trained model was called while unloaded
    #[error("Model has not been trained")]
    ModelNotTrained,

    /// Unknown product id
    #[error("Product with id {0} not found")]
    ProductNotFound(u32),

    /// The recent window holds no rows to score the model against
    #[error("No recent data available for evaluation")]
    NoEvaluationData,

    /// A persisted artifact exists but cannot be decoded
    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or shape checks
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON serialization of artifacts or report payloads
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
