//! Analyzer configuration

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::AnalysisError;
use crate::features::FEATURE_COUNT;

/// Configuration consumed by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Requested K-means cluster count
    pub cluster_count: usize,

    /// Seed for k-means++ initialization
    pub kmeans_seed: u64,

    /// K-means iteration cap
    pub kmeans_max_iter: usize,

    /// Model artifact manifest location
    pub model_path: PathBuf,

    /// Threshold used when the artifact carries no calibrated one
    pub anomaly_threshold: Option<f32>,

    /// Expected feature vector dimension
    pub feature_dim: usize,

    /// Run clustering and detection on parallel workers
    pub parallel: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cluster_count: DEFAULT_CLUSTER_COUNT,
            kmeans_seed: DEFAULT_KMEANS_SEED,
            kmeans_max_iter: DEFAULT_KMEANS_MAX_ITER,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            anomaly_threshold: None,
            feature_dim: FEATURE_COUNT,
            parallel: true,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cluster_count: env_or(ENV_CLUSTER_COUNT, defaults.cluster_count),
            kmeans_seed: env_or(ENV_KMEANS_SEED, defaults.kmeans_seed),
            kmeans_max_iter: env_or(ENV_KMEANS_MAX_ITER, defaults.kmeans_max_iter),
            model_path: std::env::var(ENV_MODEL_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            anomaly_threshold: env_opt(ENV_ANOMALY_THRESHOLD),
            feature_dim: env_or(ENV_FEATURE_DIM, defaults.feature_dim),
            parallel: env_flag(ENV_PARALLEL, defaults.parallel),
        }
    }

    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.cluster_count == 0 {
            return Err(AnalysisError::Config("cluster count must be at least 1".into()));
        }
        if self.kmeans_max_iter == 0 {
            return Err(AnalysisError::Config("k-means iteration cap must be at least 1".into()));
        }
        if self.feature_dim != FEATURE_COUNT {
            return Err(AnalysisError::Config(format!(
                "configured feature dimension {} does not match feature layout ({})",
                self.feature_dim, FEATURE_COUNT
            )));
        }
        if let Some(t) = self.anomaly_threshold {
            if !t.is_finite() || t < 0.0 {
                return Err(AnalysisError::Config(format!("invalid anomaly threshold {}", t)));
            }
        }
        Ok(())
    }
}
