//! Model artifact loading
//!
//! An artifact is a JSON manifest written by the offline training job:
//!
//! ```json
//! {
//!   "name": "autoencoder-v1",
//!   "feature_version": 1,
//!   "layout_hash": 2864434397,
//!   "input_dim": 11,
//!   "threshold": 0.012,
//!   "normalization": { "min_vals": [...], "max_vals": [...] },
//!   "model": { "format": "dense", "layers": [...] }
//! }
//! ```
//!
//! or `"model": { "format": "onnx", "path": "autoencoder.onnx", "sha256": "..." }`
//! with `path` relative to the manifest.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::dense::{DenseAutoencoder, DenseLayer};
use super::detector::{AnomalyDetector, ThresholdSource};
use super::onnx::OnnxAutoencoder;
use super::Reconstructor;
use crate::config::AnalyzerConfig;
use crate::error::ModelError;
use crate::features::layout::validate_layout;
use crate::features::NormalizationParams;

/// Model weights location / format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum BackendSpec {
    Dense {
        layers: Vec<DenseLayer>,
    },
    Onnx {
        path: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
    },
}

/// Artifact manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub input_dim: usize,
    /// Calibrated at training time
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub normalization: Option<NormalizationParams>,
    pub model: BackendSpec,
}

impl ModelManifest {
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Instantiate the backend; relative ONNX paths resolve against `base_dir`
    fn build_model(&self, base_dir: &Path) -> Result<Box<dyn Reconstructor>, ModelError> {
        let model: Box<dyn Reconstructor> = match &self.model {
            BackendSpec::Dense { layers } => Box::new(DenseAutoencoder::from_layers(layers)?),
            BackendSpec::Onnx { path, sha256 } => {
                let full = if path.is_absolute() { path.clone() } else { base_dir.join(path) };
                if let Some(expected) = sha256 {
                    verify_checksum(&full, expected)?;
                }
                Box::new(OnnxAutoencoder::load(&full, self.input_dim)?)
            }
        };

        if model.input_dim() != self.input_dim {
            return Err(ModelError::Weights(format!(
                "manifest declares input_dim {} but weights take {}",
                self.input_dim,
                model.input_dim()
            )));
        }

        Ok(model)
    }
}

/// Hex SHA-256 of a file
pub fn file_sha256(path: &Path) -> Result<String, ModelError> {
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn verify_checksum(path: &Path, expected: &str) -> Result<(), ModelError> {
    let actual = file_sha256(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ModelError::Checksum {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

impl AnomalyDetector {
    /// Load the configured artifact once at process start
    pub fn load(config: &AnalyzerConfig) -> Result<Self, ModelError> {
        Self::load_from(&config.model_path, config.anomaly_threshold)
    }

    /// Load a manifest; `fallback_threshold` applies when it carries none
    pub fn load_from(path: &Path, fallback_threshold: Option<f32>) -> Result<Self, ModelError> {
        log::info!("Loading model artifact from: {}", path.display());

        let manifest = ModelManifest::from_file(path)?;
        validate_layout(manifest.feature_version, manifest.layout_hash)?;

        let (threshold, source) = match (manifest.threshold, fallback_threshold) {
            (Some(t), _) => (t, ThresholdSource::Artifact),
            (None, Some(t)) => (t, ThresholdSource::Config),
            (None, None) => return Err(ModelError::MissingThreshold),
        };

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let model = manifest.build_model(base_dir)?;
        let normalization = manifest.normalization.clone().unwrap_or_default();

        let detector = AnomalyDetector::new(manifest.name.clone(), model, threshold, source, normalization)?;
        log::info!(
            "Model '{}' loaded ({} backend, threshold {} from {:?})",
            manifest.name,
            detector.info().backend,
            threshold,
            source
        );

        Ok(detector)
    }
}
