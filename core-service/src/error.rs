//! Error taxonomy
//!
//! Malformed frames never surface here: the decoder recovers them locally by
//! nulling fields. What remains is one fatal error per request, classified as
//! the caller's fault (input) or the service's (configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Unreadable capture container
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture is empty: missing global header")]
    Empty,

    #[error("malformed capture: {0}")]
    Malformed(String),

    #[error("unsupported link type {0}: only Ethernet captures are analyzed")]
    UnsupportedLinkType(i32),
}

/// Missing or incompatible trained model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid model weights: {0}")]
    Weights(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error("model expects input dimension {expected}, feature builder produces {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model trained on feature layout v{model_version} ({model_hash:08x}), current is v{current_version} ({current_hash:08x})")]
    LayoutMismatch {
        model_version: u8,
        model_hash: u32,
        current_version: u8,
        current_hash: u32,
    },

    #[error("no anomaly threshold: artifact has none and none is configured")]
    MissingThreshold,

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failure class surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad capture from the caller
    Input,
    /// Service misconfiguration (model, settings)
    Configuration,
    /// Broken pipeline invariant
    Internal,
}

/// Fatal analysis error
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("stage output length mismatch: {stage} produced {actual}, expected {expected}")]
    LengthMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("worker panicked during {0}")]
    Worker(&'static str),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Capture(_) => ErrorKind::Input,
            AnalysisError::Model(_) | AnalysisError::Config(_) => ErrorKind::Configuration,
            AnalysisError::LengthMismatch { .. } | AnalysisError::Worker(_) => ErrorKind::Internal,
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
