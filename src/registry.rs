//! Durable artifact set persistence and the live model handle

use crate::encoder::CategoricalEncoder;
use crate::error::{ForecastError, Result};
use crate::model::{RandomForest, StandardScaler};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const FOREST_FILE: &str = "forest.json";
const SCALER_FILE: &str = "scaler.json";
const ENCODERS_FILE: &str = "encoders.json";
const METADATA_FILE: &str = "metadata.json";

/// Version and provenance of a trained artifact set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    pub last_trained: DateTime<Utc>,
    pub feature_names: Vec<String>,
}

/// The regressor, scaler, encoder and metadata bundle.
///
/// Always persisted and reloaded as a unit: a predictor must never observe
/// a forest paired with a scaler or encoder from a different training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub forest: RandomForest,
    pub scaler: StandardScaler,
    pub encoder: CategoricalEncoder,
    pub metadata: ModelMetadata,
}

/// Persists and reloads artifact sets as four named JSON blobs in one
/// directory.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    dir: PathBuf,
}

impl ModelRegistry {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write all four blobs. Each blob goes to a temp file in the registry
    /// directory and is renamed into place, so readers see either the old
    /// or the new file, never a torn one.
    pub fn save(&self, artifacts: &ArtifactSet) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        self.write_blob(FOREST_FILE, &artifacts.forest)?;
        self.write_blob(SCALER_FILE, &artifacts.scaler)?;
        self.write_blob(ENCODERS_FILE, &artifacts.encoder)?;
        self.write_blob(METADATA_FILE, &artifacts.metadata)?;

        log::info!(
            "saved model artifacts version {} to {}",
            artifacts.metadata.version,
            self.dir.display()
        );
        Ok(())
    }

    /// Read the artifact set back.
    ///
    /// Returns `Ok(None)` when any blob is missing (nothing trained yet)
    /// and `Err(ArtifactCorrupt)` when a blob exists but will not decode.
    /// Callers wanting startup resilience treat the latter as "unloaded".
    pub fn load(&self) -> Result<Option<ArtifactSet>> {
        let paths = [
            self.dir.join(FOREST_FILE),
            self.dir.join(SCALER_FILE),
            self.dir.join(ENCODERS_FILE),
            self.dir.join(METADATA_FILE),
        ];
        if paths.iter().any(|p| !p.exists()) {
            return Ok(None);
        }

        let forest: RandomForest = self.read_blob(FOREST_FILE)?;
        let scaler: StandardScaler = self.read_blob(SCALER_FILE)?;
        let encoder: CategoricalEncoder = self.read_blob(ENCODERS_FILE)?;
        let metadata: ModelMetadata = self.read_blob(METADATA_FILE)?;

        Ok(Some(ArtifactSet {
            forest,
            scaler,
            encoder,
            metadata,
        }))
    }

    fn write_blob<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec(value)?;
        let tmp = self.dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, self.dir.join(name))?;
        Ok(())
    }

    fn read_blob<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ForecastError::ArtifactCorrupt(format!("{}: {e}", path.display()))
        })
    }
}

/// Swappable handle to the currently published artifact set.
///
/// Readers take an `Arc` snapshot; a successful training run publishes a
/// whole new set in one swap. Predictions racing a retrain therefore see
/// either the old or the new artifacts in full, never a mix.
#[derive(Debug, Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<ArtifactSet>>>,
}

impl ModelHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Immutable snapshot of the live artifacts, if any.
    pub fn snapshot(&self) -> Option<Arc<ArtifactSet>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Atomically replace the live artifacts.
    pub fn publish(&self, artifacts: Arc<ArtifactSet>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(artifacts);
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }
}
