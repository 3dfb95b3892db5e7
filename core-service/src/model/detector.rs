//! Anomaly Detector - reconstruction error scoring

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::Reconstructor;
use crate::error::ModelError;
use crate::features::{LayoutInfo, NormalizationParams, FEATURE_COUNT};

/// Where the decision threshold came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdSource {
    /// Calibrated at training time, stored in the artifact
    Artifact,
    /// Configured fallback
    Config,
}

/// Loaded model description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub backend: String,
    pub input_dim: usize,
    pub threshold: f32,
    pub threshold_source: ThresholdSource,
    pub layout: LayoutInfo,
    pub loaded_at: DateTime<Utc>,
}

/// Per-packet anomaly output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnomalyScore {
    pub flags: Vec<bool>,
    /// Mean squared reconstruction error per packet
    pub errors: Vec<f32>,
    pub threshold: f32,
}

impl AnomalyScore {
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn anomaly_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Initialized-once detector handle, shared read-only between requests
pub struct AnomalyDetector {
    model: Box<dyn Reconstructor>,
    threshold: f32,
    normalization: NormalizationParams,
    info: ModelInfo,
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector").field("info", &self.info).finish()
    }
}

impl AnomalyDetector {
    /// Wrap an already-loaded model
    pub fn new(
        name: impl Into<String>,
        model: Box<dyn Reconstructor>,
        threshold: f32,
        threshold_source: ThresholdSource,
        normalization: NormalizationParams,
    ) -> Result<Self, ModelError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ModelError::Weights(format!("invalid threshold {}", threshold)));
        }
        normalization.validate()?;

        let info = ModelInfo {
            name: name.into(),
            backend: model.backend().to_string(),
            input_dim: model.input_dim(),
            threshold,
            threshold_source,
            layout: LayoutInfo::current(),
            loaded_at: Utc::now(),
        };

        if info.input_dim != FEATURE_COUNT {
            log::warn!(
                "Model '{}' expects {} features, feature builder produces {}: analyses will fail",
                info.name,
                info.input_dim,
                FEATURE_COUNT
            );
        }

        Ok(Self { model, threshold, normalization, info })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn input_dim(&self) -> usize {
        self.model.input_dim()
    }

    /// Scaling the model was trained with
    pub fn normalization(&self) -> &NormalizationParams {
        &self.normalization
    }

    /// Fail unless the model consumes vectors of dimension `dim`
    pub fn check_dimension(&self, dim: usize) -> Result<(), ModelError> {
        let expected = self.model.input_dim();
        if expected != dim {
            return Err(ModelError::DimensionMismatch { expected, actual: dim });
        }
        Ok(())
    }

    /// Reconstruction error per row
    pub fn reconstruction_errors(&self, features: ArrayView2<f32>) -> Result<Vec<f32>, ModelError> {
        self.check_dimension(features.ncols())?;
        if features.nrows() == 0 {
            return Ok(Vec::new());
        }

        let reconstructed = self.model.reconstruct(features)?;
        if reconstructed.dim() != features.dim() {
            return Err(ModelError::Inference(format!(
                "reconstruction shape {:?} differs from input {:?}",
                reconstructed.dim(),
                features.dim()
            )));
        }

        Ok(mean_squared_error(features, &reconstructed))
    }

    /// Flag rows whose error exceeds the threshold
    pub fn score(&self, features: ArrayView2<f32>) -> Result<AnomalyScore, ModelError> {
        let errors = self.reconstruction_errors(features)?;
        let flags: Vec<bool> = errors
            .iter()
            .map(|&e| !e.is_finite() || e > self.threshold)
            .collect();

        let score = AnomalyScore { flags, errors, threshold: self.threshold };
        log::debug!(
            "Detector '{}': {}/{} packets anomalous (threshold {})",
            self.info.name,
            score.anomaly_count(),
            score.len(),
            self.threshold
        );

        Ok(score)
    }
}

fn mean_squared_error(input: ArrayView2<f32>, reconstructed: &Array2<f32>) -> Vec<f32> {
    let diff = &input - reconstructed;
    diff.mapv(|d| d * d)
        .mean_axis(Axis(1))
        .map(|m| m.to_vec())
        .unwrap_or_default()
}
